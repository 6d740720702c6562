//! Conversion from flat verse exports to the hierarchical translation format.
//!
//! Input is an object with a `verses` array whose items carry `book_name`,
//! a 1-based `chapter` and the verse `text` (extra fields are ignored).
//! Books keep their first-seen order; chapters that never appear inside a
//! book become empty chapters so chapter indices stay aligned.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::document::{Book, Document};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a verse export: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no verses found in {0}")]
    NoVerses(PathBuf),
    #[error("{book} chapter {chapter} is out of range (limit {MAX_CHAPTER})")]
    ChapterOutOfRange { book: String, chapter: usize },
}

/// Highest chapter number accepted from an export.  Psalms has 150.
pub const MAX_CHAPTER: usize = 1000;

#[derive(Debug, Deserialize)]
struct FlatExport {
    #[serde(default)]
    verses: Vec<FlatVerse>,
}

#[derive(Debug, Deserialize)]
struct FlatVerse {
    book_name: String,
    chapter: usize,
    text: String,
}

/// Summary of a finished conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertStats {
    pub books: usize,
    pub verses: usize,
}

/// Abbreviation used when the export carries none: the first three
/// characters of the lower-cased name without spaces.
fn derive_abbrev(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(3)
        .collect()
}

fn build_document(verses: Vec<FlatVerse>) -> Result<Document, ConvertError> {
    let mut order: Vec<String> = Vec::new();
    let mut chapters: HashMap<String, Vec<Vec<String>>> = HashMap::new();

    for verse in verses {
        if verse.chapter > MAX_CHAPTER {
            return Err(ConvertError::ChapterOutOfRange {
                book: verse.book_name,
                chapter: verse.chapter,
            });
        }
        let chapter_idx = verse.chapter.saturating_sub(1);
        let book = chapters.entry(verse.book_name.clone()).or_insert_with(|| {
            order.push(verse.book_name.clone());
            Vec::new()
        });
        if book.len() <= chapter_idx {
            book.resize_with(chapter_idx + 1, Vec::new);
        }
        book[chapter_idx].push(verse.text);
    }

    let books = order
        .into_iter()
        .map(|name| {
            let mut book = Book::new(name.clone(), chapters.remove(&name).unwrap_or_default());
            book.abbrev = Some(derive_abbrev(&name));
            book
        })
        .collect();
    Ok(Document::new(books))
}

/// Convert the export at `input` and write the translation file to `output`.
pub fn convert_file(input: &Path, output: &Path) -> Result<ConvertStats, ConvertError> {
    let contents = std::fs::read_to_string(input).map_err(|source| ConvertError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let export: FlatExport =
        serde_json::from_str(contents.trim_start_matches('\u{feff}')).map_err(|source| {
            ConvertError::Parse {
                path: input.to_path_buf(),
                source,
            }
        })?;
    if export.verses.is_empty() {
        return Err(ConvertError::NoVerses(input.to_path_buf()));
    }

    let verses = export.verses.len();
    let document = build_document(export.verses)?;
    let books = document.books().len();

    let json = serde_json::to_string(&document).map_err(|source| ConvertError::Parse {
        path: output.to_path_buf(),
        source,
    })?;
    std::fs::write(output, json).map_err(|source| ConvertError::Io {
        path: output.to_path_buf(),
        source,
    })?;

    Ok(ConvertStats { books, verses })
}

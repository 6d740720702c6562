//! Hierarchical document model — books → chapters → verse strings.
//!
//! A translation file is a JSON array of books:
//! `[{ "name": "Genesis", "abbrev": "gn", "chapters": [["In the beginning…", …], …] }, …]`.
//! The document is immutable once loaded; everything the reader displays is
//! derived from it by [`crate::core::flatten`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Failure to turn a translation id into a [`Document`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unknown translation `{0}`")]
    UnknownTranslation(String),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a valid translation file: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One book: a name and its ordered chapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    /// Short lower-case abbreviation (e.g. `"jn"`), when the file carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbrev: Option<String>,
    /// Chapters in order; each chapter is its verses in order.
    #[serde(default)]
    pub chapters: Vec<Vec<String>>,
}

impl Book {
    pub fn new(name: impl Into<String>, chapters: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            abbrev: None,
            chapters,
        }
    }
}

/// An ordered sequence of books.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    books: Vec<Book>,
}

impl Document {
    pub fn new(books: Vec<Book>) -> Self {
        Self { books }
    }

    /// Parse a translation file's contents.  A leading byte-order mark is
    /// tolerated since several published exports carry one.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents.trim_start_matches('\u{feff}'))
    }

    /// Read and parse a translation file from disk.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }

    /// Find a book by exact name, then by abbreviation (case-insensitive).
    pub fn find_book(&self, name_or_abbrev: &str) -> Option<usize> {
        if let Some(idx) = self.books.iter().position(|b| b.name == name_or_abbrev) {
            return Some(idx);
        }
        let wanted = name_or_abbrev.to_lowercase();
        self.books
            .iter()
            .position(|b| b.abbrev.as_deref().is_some_and(|a| a.to_lowercase() == wanted))
    }

    /// Number of verses in the given chapter, `None` when out of range.
    pub fn verse_count(&self, book: usize, chapter: usize) -> Option<usize> {
        self.books.get(book)?.chapters.get(chapter).map(Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_translation_json_with_bom() {
        let json = "\u{feff}[{\"name\":\"John\",\"abbrev\":\"jn\",\"chapters\":[[\"a\",\"b\"],[]]}]";
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.books().len(), 1);
        assert_eq!(doc.book(0).unwrap().abbrev.as_deref(), Some("jn"));
        assert_eq!(doc.verse_count(0, 0), Some(2));
        assert_eq!(doc.verse_count(0, 1), Some(0));
        assert_eq!(doc.verse_count(0, 2), None);
    }

    #[test]
    fn rejects_garbled_files() {
        assert!(Document::from_json("{\"verses\": []}").is_err());
        assert!(Document::from_json("[{\"chapters\": 3}]").is_err());
    }

    #[test]
    fn finds_books_by_name_or_abbreviation() {
        let mut john = Book::new("John", vec![]);
        john.abbrev = Some("jn".into());
        let doc = Document::new(vec![Book::new("Genesis", vec![]), john]);
        assert_eq!(doc.find_book("John"), Some(1));
        assert_eq!(doc.find_book("JN"), Some(1));
        assert_eq!(doc.find_book("Exodus"), None);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Document::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}

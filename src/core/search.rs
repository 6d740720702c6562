//! Quick-jump matcher — free text to ranked book / chapter / verse targets.
//!
//! Accepted forms (case-insensitive):
//! - `"joh"`        → every book whose name contains the fragment
//! - `"John 3"`     → chapter 3 of every matching book that has one
//! - `"John 3:16"`  → that verse, when it exists
//!
//! A trailing number needs no space (`"psalm23"`), and a book's
//! abbreviation matches exactly (`"jn 3"`).

use std::cmp::Ordering;

use super::document::Document;
use super::flatten::FlatDocument;

/// Maximum number of suggestions shown.
pub const MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpTarget {
    /// Resolves to the book's first chapter heading.
    Book { book: usize },
    Chapter { book: usize, chapter: usize },
    Verse {
        book: usize,
        chapter: usize,
        /// 1-based.
        verse: usize,
    },
}

impl JumpTarget {
    /// Flattened index for this target.
    pub fn resolve(self, doc: &FlatDocument) -> Option<usize> {
        match self {
            JumpTarget::Book { book } => doc.heading_index(book, 0),
            JumpTarget::Chapter { book, chapter } => doc.heading_index(book, chapter),
            JumpTarget::Verse {
                book,
                chapter,
                verse,
            } => doc.verse_index(book, chapter, verse),
        }
    }

    fn specificity(self) -> u8 {
        match self {
            JumpTarget::Book { .. } => 0,
            JumpTarget::Chapter { .. } => 1,
            JumpTarget::Verse { .. } => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub target: JumpTarget,
    pub display: String,
}

// ───────────────────────────────────────── query parsing ─────

#[derive(Debug, Clone, PartialEq, Eq)]
struct Query {
    /// Whole query, lower-cased and trimmed.
    full: String,
    /// Book part and 1-based chapter/verse when the query ends in a reference.
    reference: Option<(String, usize, Option<usize>)>,
}

fn parse_query(raw: &str) -> Query {
    let full = raw.trim().to_lowercase();
    let suffix_len = full
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit() || *c == ':')
        .count();
    let split = full.len() - suffix_len;
    let (head, suffix) = full.split_at(split);
    let head = head.trim();

    let reference = if head.is_empty() || !suffix.starts_with(|c: char| c.is_ascii_digit()) {
        None
    } else {
        let (chapter, verse) = match suffix.split_once(':') {
            Some((c, v)) => (c, v.parse::<usize>().ok()),
            None => (suffix, None),
        };
        chapter
            .parse::<usize>()
            .ok()
            .filter(|c| *c > 0)
            .map(|c| (head.to_string(), c, verse.filter(|v| *v > 0)))
    };

    Query { full, reference }
}

// ───────────────────────────────────────── ranking ───────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RankKey {
    exact: bool,
    prefix: bool,
    match_pos: usize,
    name_len: usize,
    book_index: usize,
    specificity: u8,
}

impl RankKey {
    fn cmp_better(self, other: Self) -> Ordering {
        // "Better" should come first in ascending sort.
        other
            .exact
            .cmp(&self.exact)
            .then_with(|| other.prefix.cmp(&self.prefix))
            .then_with(|| self.match_pos.cmp(&other.match_pos))
            .then_with(|| self.name_len.cmp(&other.name_len))
            .then_with(|| self.book_index.cmp(&other.book_index))
            .then_with(|| other.specificity.cmp(&self.specificity))
    }
}

/// Rank the match of `needle` against a book, `None` when it does not match.
fn rank_book(doc: &Document, book_index: usize, needle: &str) -> Option<(usize, bool, bool)> {
    let book = doc.book(book_index)?;
    let name = book.name.to_lowercase();
    if book.abbrev.as_deref().is_some_and(|a| a.to_lowercase() == needle) {
        return Some((0, true, true));
    }
    let pos = name.find(needle)?;
    Some((pos, name == needle, pos == 0))
}

/// Ranked suggestions for `query`, at most `limit`.  An empty query yields
/// nothing; callers show a usage hint instead.
pub fn suggest(doc: &Document, query: &str, limit: usize) -> Vec<Suggestion> {
    let q = parse_query(query);
    if q.full.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(RankKey, Suggestion)> = Vec::new();
    for (book_index, book) in doc.books().iter().enumerate() {
        let name_len = book.name.chars().count();

        if let Some((match_pos, exact, prefix)) = rank_book(doc, book_index, &q.full) {
            let target = JumpTarget::Book { book: book_index };
            ranked.push((
                RankKey {
                    exact,
                    prefix,
                    match_pos,
                    name_len,
                    book_index,
                    specificity: target.specificity(),
                },
                Suggestion {
                    target,
                    display: book.name.clone(),
                },
            ));
        }

        let Some((name, chapter, verse)) = &q.reference else {
            continue;
        };
        let Some((match_pos, exact, prefix)) = rank_book(doc, book_index, name) else {
            continue;
        };
        let Some(verses) = book.chapters.get(chapter - 1) else {
            continue;
        };
        let (target, display) = match verse {
            Some(v) if *v <= verses.len() => (
                JumpTarget::Verse {
                    book: book_index,
                    chapter: chapter - 1,
                    verse: *v,
                },
                format!("{} {}:{}", book.name, chapter, v),
            ),
            Some(_) => continue,
            None => (
                JumpTarget::Chapter {
                    book: book_index,
                    chapter: chapter - 1,
                },
                format!("{} {}", book.name, chapter),
            ),
        };
        ranked.push((
            RankKey {
                exact,
                prefix,
                match_pos,
                name_len,
                book_index,
                specificity: target.specificity(),
            },
            Suggestion { target, display },
        ));
    }

    ranked.sort_by(|(a, _), (b, _)| a.cmp_better(*b));
    ranked.truncate(limit);
    ranked.into_iter().map(|(_, s)| s).collect()
}

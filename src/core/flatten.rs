//! Flattening — turn the book/chapter/verse hierarchy into one addressable
//! sequence of [`Unit`]s.
//!
//! The index into this sequence is the reader's single notion of "where am I".
//! Book and chapter selectors, the location state and the persisted reading
//! position are all projections of it.  [`FlatDocument`] additionally keeps a
//! coordinate map so `(book, chapter[, verse])` resolves back to an index in
//! O(1).

use std::sync::Arc;

use super::document::Document;

// ───────────────────────────────────────── units ─────────────

/// Book/chapter coordinates shared by every unit (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub book_index: usize,
    pub chapter_index: usize,
}

impl Coord {
    /// 1-based chapter number as shown to readers.
    pub fn chapter_number(self) -> usize {
        self.chapter_index + 1
    }
}

/// One addressable element of the flattened document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// Precedes the verses of its chapter.  `text` is the rendered heading,
    /// e.g. `"John 3"`.
    ChapterHeading {
        coord: Coord,
        book_name: Arc<str>,
        text: String,
    },
    Verse {
        coord: Coord,
        /// 1-based.
        verse_number: usize,
        book_name: Arc<str>,
        text: String,
    },
}

impl Unit {
    pub fn coord(&self) -> Coord {
        match self {
            Unit::ChapterHeading { coord, .. } | Unit::Verse { coord, .. } => *coord,
        }
    }

    pub fn book_name(&self) -> &str {
        match self {
            Unit::ChapterHeading { book_name, .. } | Unit::Verse { book_name, .. } => book_name,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Unit::ChapterHeading { text, .. } | Unit::Verse { text, .. } => text,
        }
    }

    pub fn chapter_number(&self) -> usize {
        self.coord().chapter_number()
    }

    /// `None` for headings.
    pub fn verse_number(&self) -> Option<usize> {
        match self {
            Unit::ChapterHeading { .. } => None,
            Unit::Verse { verse_number, .. } => Some(*verse_number),
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, Unit::ChapterHeading { .. })
    }

    /// Human reference: `"John 3"` for a heading, `"John 3:16"` for a verse.
    pub fn reference(&self) -> String {
        match self.verse_number() {
            Some(v) => format!("{} {}:{}", self.book_name(), self.chapter_number(), v),
            None => format!("{} {}", self.book_name(), self.chapter_number()),
        }
    }

    /// `"John 3:16 - For God so loved..."`; headings have nothing to quote.
    pub fn quotation(&self) -> Option<String> {
        match self {
            Unit::ChapterHeading { .. } => None,
            Unit::Verse { text, .. } => Some(format!("{} - {text}", self.reference())),
        }
    }
}

// ───────────────────────────────────────── flatten ───────────

/// Emit, for every book and every chapter in order, one heading followed by
/// one verse unit per verse string.
pub fn flatten(document: &Document) -> Vec<Unit> {
    let mut units = Vec::new();
    for (book_index, book) in document.books().iter().enumerate() {
        let book_name: Arc<str> = Arc::from(book.name.as_str());
        for (chapter_index, chapter) in book.chapters.iter().enumerate() {
            let coord = Coord {
                book_index,
                chapter_index,
            };
            units.push(Unit::ChapterHeading {
                coord,
                book_name: Arc::clone(&book_name),
                text: format!("{} {}", book.name, chapter_index + 1),
            });
            for (verse_idx, verse) in chapter.iter().enumerate() {
                units.push(Unit::Verse {
                    coord,
                    verse_number: verse_idx + 1,
                    book_name: Arc::clone(&book_name),
                    text: verse.clone(),
                });
            }
        }
    }
    units
}

// ───────────────────────────────────────── flat document ─────

/// The flattened sequence plus a coordinate → index map.
#[derive(Debug, Clone, Default)]
pub struct FlatDocument {
    units: Vec<Unit>,
    /// `headings[book][chapter]` = index of that chapter's heading.
    headings: Vec<Vec<usize>>,
}

impl FlatDocument {
    pub fn build(document: &Document) -> Self {
        let units = flatten(document);
        let mut headings: Vec<Vec<usize>> = document
            .books()
            .iter()
            .map(|b| Vec::with_capacity(b.chapters.len()))
            .collect();
        for (idx, unit) in units.iter().enumerate() {
            if unit.is_heading() {
                headings[unit.coord().book_index].push(idx);
            }
        }
        Self { units, headings }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn get(&self, index: usize) -> Option<&Unit> {
        self.units.get(index)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Clamp any integer (stale links, arithmetic overshoot) into
    /// `[0, len - 1]`.  `None` only for an empty document.
    pub fn clamp(&self, index: i64) -> Option<usize> {
        let last = self.units.len().checked_sub(1)?;
        Some(index.clamp(0, last as i64) as usize)
    }

    pub fn book_count(&self) -> usize {
        self.headings.len()
    }

    pub fn chapter_count(&self, book_index: usize) -> usize {
        self.headings.get(book_index).map_or(0, Vec::len)
    }

    pub fn heading_index(&self, book_index: usize, chapter_index: usize) -> Option<usize> {
        self.headings.get(book_index)?.get(chapter_index).copied()
    }

    /// Index of the `verse_number`-th (1-based) verse of a chapter.
    pub fn verse_index(
        &self,
        book_index: usize,
        chapter_index: usize,
        verse_number: usize,
    ) -> Option<usize> {
        let heading = self.heading_index(book_index, chapter_index)?;
        if verse_number == 0 {
            return None;
        }
        let idx = heading + verse_number;
        match self.units.get(idx) {
            Some(Unit::Verse { coord, .. })
                if coord.book_index == book_index && coord.chapter_index == chapter_index =>
            {
                Some(idx)
            }
            _ => None,
        }
    }

    /// Heading of the chapter after the one containing `index`, crossing into
    /// the next book's first chapter.  `None` at the very end.
    pub fn next_chapter_heading(&self, index: usize) -> Option<usize> {
        let coord = self.units.get(index)?.coord();
        if let Some(h) = self.heading_index(coord.book_index, coord.chapter_index + 1) {
            return Some(h);
        }
        (coord.book_index + 1..self.book_count()).find_map(|b| self.heading_index(b, 0))
    }

    /// Heading of the chapter before the one containing `index`, crossing into
    /// the previous book's last chapter.  `None` at the very start.
    pub fn prev_chapter_heading(&self, index: usize) -> Option<usize> {
        let coord = self.units.get(index)?.coord();
        if coord.chapter_index > 0 {
            return self.heading_index(coord.book_index, coord.chapter_index - 1);
        }
        (0..coord.book_index).rev().find_map(|b| {
            let count = self.chapter_count(b);
            count.checked_sub(1).and_then(|last| self.heading_index(b, last))
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::document::Book;

    fn chapters(spec: &[&[&str]]) -> Vec<Vec<String>> {
        spec.iter()
            .map(|c| c.iter().map(|v| v.to_string()).collect())
            .collect()
    }

    #[test]
    fn single_chapter_scenario() {
        let doc = Document::new(vec![Book::new("Test", chapters(&[&["a", "b", "c"]]))]);
        let units = flatten(&doc);
        let rendered: Vec<(bool, &str, Option<usize>)> = units
            .iter()
            .map(|u| (u.is_heading(), u.text(), u.verse_number()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                (true, "Test 1", None),
                (false, "a", Some(1)),
                (false, "b", Some(2)),
                (false, "c", Some(3)),
            ]
        );
    }

    #[test]
    fn verses_quote_with_their_reference() {
        let doc = Document::new(vec![Book::new(
            "John",
            chapters(&[&[], &[], &["a", "For God so loved the world"]]),
        )]);
        let flat = FlatDocument::build(&doc);
        let heading = flat.heading_index(0, 2).unwrap();
        assert_eq!(flat.get(heading).unwrap().quotation(), None);
        assert_eq!(
            flat.get(heading + 2).unwrap().quotation().as_deref(),
            Some("John 3:2 - For God so loved the world")
        );
    }

    #[test]
    fn length_and_ordering_hold_for_uneven_documents() {
        let doc = Document::new(vec![
            Book::new("A", chapters(&[&["1", "2"], &[], &["x"]])),
            Book::new("B", chapters(&[&[], &["y", "z", "w"]])),
            Book::new("C", vec![]),
        ]);
        let units = flatten(&doc);
        // 5 headings + 6 verses
        assert_eq!(units.len(), 11);

        let coords: Vec<Coord> = units.iter().map(Unit::coord).collect();
        assert!(coords.windows(2).all(|w| w[0] <= w[1]));

        let flat = FlatDocument::build(&doc);
        for b in 0..flat.book_count() {
            for c in 0..flat.chapter_count(b) {
                let h = flat.heading_index(b, c).unwrap();
                assert!(flat.get(h).unwrap().is_heading());
                match flat.get(h + 1) {
                    Some(Unit::Verse { verse_number, coord, .. }) => {
                        assert_eq!(*verse_number, 1);
                        assert_eq!(coord.chapter_index, c);
                    }
                    Some(next) => assert!(next.is_heading()),
                    None => {}
                }
            }
        }
    }

    #[test]
    fn empty_document_has_no_units_and_no_clamp() {
        let flat = FlatDocument::build(&Document::default());
        assert!(flat.is_empty());
        assert_eq!(flat.clamp(0), None);
        assert_eq!(flat.next_chapter_heading(0), None);
    }

    #[test]
    fn clamp_covers_negative_and_overshoot() {
        let doc = Document::new(vec![Book::new("Test", chapters(&[&["a", "b", "c"]]))]);
        let flat = FlatDocument::build(&doc);
        assert_eq!(flat.clamp(-7), Some(0));
        assert_eq!(flat.clamp(2), Some(2));
        assert_eq!(flat.clamp(99), Some(3));
    }

    #[test]
    fn verse_lookup_stays_inside_its_chapter() {
        let doc = Document::new(vec![Book::new("A", chapters(&[&["1", "2"], &["3"]]))]);
        let flat = FlatDocument::build(&doc);
        assert_eq!(flat.verse_index(0, 0, 2), Some(2));
        assert_eq!(flat.verse_index(0, 0, 3), None);
        assert_eq!(flat.verse_index(0, 1, 1), Some(4));
        assert_eq!(flat.verse_index(0, 1, 0), None);
    }

    #[test]
    fn chapter_stepping_crosses_books() {
        let doc = Document::new(vec![
            Book::new("A", chapters(&[&["1"], &["2"]])),
            Book::new("B", chapters(&[&["3"]])),
        ]);
        let flat = FlatDocument::build(&doc);
        // A1=0 a=1 A2=2 b=3 B1=4 c=5
        assert_eq!(flat.next_chapter_heading(1), Some(2));
        assert_eq!(flat.next_chapter_heading(3), Some(4));
        assert_eq!(flat.next_chapter_heading(5), None);
        assert_eq!(flat.prev_chapter_heading(5), Some(2));
        assert_eq!(flat.prev_chapter_heading(3), Some(0));
        assert_eq!(flat.prev_chapter_heading(1), None);
    }
}

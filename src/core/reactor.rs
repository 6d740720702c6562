//! Cursor-change reactor — everything derived from the settled cursor.
//!
//! Runs once per settled index change.  It recomputes the accessible
//! announcement, the book/chapter selector projections and the chapter
//! indicator, persists the reading position and replaces the location
//! entry.  None of these outputs feeds back into scrolling.

use chrono::{DateTime, Utc};

use crate::store::KeyValueStore;

use super::context::ReaderContext;
use super::flatten::{FlatDocument, Unit};
use super::location::{AddressBar, Location};
use super::position::ReadingPosition;

/// Read-only projection of the cursor onto the book/chapter pickers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selectors {
    pub book: Option<usize>,
    pub chapter: Option<usize>,
    /// Labels for the chapter picker of the current book.
    pub chapter_options: Vec<String>,
    /// How many times `chapter_options` was rebuilt.
    pub chapter_list_builds: u64,
}

/// Where the reactor writes its side effects.
pub struct ReactorPorts<'a> {
    pub store: &'a mut dyn KeyValueStore,
    pub address: &'a mut AddressBar,
}

#[derive(Debug, Clone, Default)]
pub struct Reactor {
    last: Option<usize>,
    announcement: String,
    indicator: Option<String>,
    selectors: Selectors,
}

/// Screen-reader text for a unit.
pub fn announce(unit: &Unit) -> String {
    unit.quotation().unwrap_or_else(|| {
        format!("{}, Chapter {}", unit.book_name(), unit.chapter_number())
    })
}

impl Reactor {
    pub fn announcement(&self) -> &str {
        &self.announcement
    }

    pub fn indicator(&self) -> Option<&str> {
        self.indicator.as_deref()
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    /// Forget the last index (new document) so the next call always runs.
    /// The selector projection is dropped too since book indices changed
    /// meaning.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// React to the cursor in `ctx`.  Returns `false` without touching any
    /// port when the cursor has not changed since the last run or does not
    /// address a unit.
    pub fn react(
        &mut self,
        ctx: &ReaderContext,
        doc: &FlatDocument,
        translation: &str,
        ports: ReactorPorts<'_>,
        now: DateTime<Utc>,
    ) -> bool {
        let index = ctx.cursor;
        if self.last == Some(index) {
            return false;
        }
        let Some(unit) = doc.get(index) else {
            return false;
        };
        self.last = Some(index);

        self.announcement = announce(unit);
        self.sync_selectors(unit, doc);
        self.indicator = Some(format!("{} {}", unit.book_name(), unit.chapter_number()));

        ReadingPosition::from_unit(translation, index, unit, now).save(ports.store);
        ports
            .address
            .replace(Location::new(translation, index, ctx.prefs.theme));
        true
    }

    fn sync_selectors(&mut self, unit: &Unit, doc: &FlatDocument) {
        let coord = unit.coord();
        if self.selectors.book != Some(coord.book_index) {
            self.selectors.book = Some(coord.book_index);
            self.selectors.chapter_options = (1..=doc.chapter_count(coord.book_index))
                .map(|n| format!("Chapter {n}"))
                .collect();
            self.selectors.chapter_list_builds += 1;
        }
        if self.selectors.chapter != Some(coord.chapter_index) {
            self.selectors.chapter = Some(coord.chapter_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::document::{Book, Document};
    use crate::store::{keys, MemoryStore};

    fn doc() -> FlatDocument {
        let ch = |n: usize| (0..n).map(|i| format!("v{i}")).collect::<Vec<_>>();
        FlatDocument::build(&Document::new(vec![
            Book::new("Genesis", vec![ch(2), ch(1)]),
            Book::new("Exodus", vec![ch(1)]),
        ]))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn announces_headings_and_verses() {
        let d = doc();
        assert_eq!(announce(d.get(0).unwrap()), "Genesis, Chapter 1");
        assert_eq!(announce(d.get(2).unwrap()), "Genesis 1:2 - v1");
    }

    #[test]
    fn same_cursor_twice_writes_once() {
        let d = doc();
        let mut store = MemoryStore::default();
        let mut address = AddressBar::default();
        let mut reactor = Reactor::default();
        let mut ctx = ReaderContext::default();
        ctx.cursor = 2;

        let ports = ReactorPorts {
            store: &mut store,
            address: &mut address,
        };
        assert!(reactor.react(&ctx, &d, "KJV", ports, now()));
        let ports = ReactorPorts {
            store: &mut store,
            address: &mut address,
        };
        assert!(!reactor.react(&ctx, &d, "KJV", ports, now()));

        assert_eq!(store.writes(), 1);
        assert_eq!(address.replacements(), 1);
        assert_eq!(address.current().unwrap().to_string(), "?t=KJV&v=2&theme=light");
        let saved = store.get(keys::LAST_POSITION).unwrap();
        assert!(saved.contains("\"verse\":2"));
    }

    #[test]
    fn chapter_list_rebuilds_only_on_book_change() {
        let d = doc();
        let mut store = MemoryStore::default();
        let mut address = AddressBar::default();
        let mut reactor = Reactor::default();
        let mut ctx = ReaderContext::default();

        for cursor in [0, 1, 3, 4, 5, 6] {
            ctx.cursor = cursor;
            let ports = ReactorPorts {
                store: &mut store,
                address: &mut address,
            };
            reactor.react(&ctx, &d, "KJV", ports, now());
        }
        // Genesis once, Exodus once.
        assert_eq!(reactor.selectors().chapter_list_builds, 2);
        assert_eq!(reactor.selectors().book, Some(1));
        assert_eq!(reactor.selectors().chapter_options, vec!["Chapter 1".to_string()]);
        assert_eq!(reactor.indicator(), Some("Exodus 1"));
    }

    #[test]
    fn out_of_range_cursor_is_ignored() {
        let d = doc();
        let mut store = MemoryStore::default();
        let mut address = AddressBar::default();
        let mut reactor = Reactor::default();
        let mut ctx = ReaderContext::default();
        ctx.cursor = 99;
        let ports = ReactorPorts {
            store: &mut store,
            address: &mut address,
        };
        assert!(!reactor.react(&ctx, &d, "KJV", ports, now()));
        assert_eq!(store.writes(), 0);
    }
}

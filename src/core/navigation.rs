//! Navigation dispatcher — discrete intents become programmatic scrolls.
//!
//! Every jump (keys, pickers, quick-jump, swipe, click, continue-reading)
//! resolves to a target index and goes through [`Dispatcher::go_to`].  The
//! cursor moves immediately; the visual animation catches up while the
//! scroll intent keeps the snap controller out of the way.

use std::time::{Duration, Instant};

use super::context::ReaderContext;
use super::flatten::FlatDocument;
use super::search::JumpTarget;
use super::surface::{self, Surface};

/// Units moved by a page step.
pub const PAGE_STEP: i64 = 5;

/// A discrete navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    /// Relative move (arrow keys, page keys).
    Step(i64),
    Home,
    End,
    NextChapter,
    PrevChapter,
    /// Book picker: the book's first chapter heading.
    Book(usize),
    /// Chapter picker: that chapter's heading.
    Chapter { book: usize, chapter: usize },
    /// Absolute index (click, continue-reading, deep link).
    Index(i64),
    Jump(JumpTarget),
}

impl NavIntent {
    /// Target index for this intent, or `None` when it has no target
    /// (unknown book, already at the last chapter, empty document).
    pub fn resolve(self, cursor: usize, doc: &FlatDocument) -> Option<i64> {
        if doc.is_empty() {
            return None;
        }
        let idx = match self {
            NavIntent::Step(delta) => (cursor as i64).saturating_add(delta),
            NavIntent::Home => 0,
            NavIntent::End => doc.len() as i64 - 1,
            NavIntent::NextChapter => doc.next_chapter_heading(cursor)? as i64,
            NavIntent::PrevChapter => doc.prev_chapter_heading(cursor)? as i64,
            NavIntent::Book(book) => doc.heading_index(book, 0)? as i64,
            NavIntent::Chapter { book, chapter } => doc.heading_index(book, chapter)? as i64,
            NavIntent::Index(i) => i,
            NavIntent::Jump(target) => target.resolve(doc)? as i64,
        };
        Some(idx)
    }
}

/// Outcome of [`Dispatcher::go_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoTo {
    /// The clamped index the cursor now holds.
    pub index: usize,
    /// `false` when the cursor already was at `index`; the reactor must not
    /// run again in that case.
    pub changed: bool,
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    /// How long the scroll intent stays raised after a jump.  Must exceed the
    /// settle window.
    hold: Duration,
}

impl Dispatcher {
    pub fn new(hold: Duration) -> Self {
        Self { hold }
    }

    /// Clamp `index`, raise the scroll intent, scroll the target to the
    /// viewport centre and move the cursor.  `None` only for an empty
    /// document.
    pub fn go_to(
        &self,
        now: Instant,
        ctx: &mut ReaderContext,
        doc: &FlatDocument,
        surface: &mut dyn Surface,
        index: i64,
    ) -> Option<GoTo> {
        let index = doc.clamp(index)?;
        ctx.scroll_intent.engage(now, self.hold);
        if let Some(extent) = surface.measure(index) {
            let offset = surface::centered_offset(extent, surface.viewport().height);
            surface.scroll_to(offset, true);
        }
        let changed = ctx.cursor != index;
        ctx.cursor = index;
        Some(GoTo { index, changed })
    }
}

//! Reading session — one loaded translation plus the scroll-sync engine.
//!
//! The session owns the [`ReaderContext`] and threads it explicitly through
//! the cursor tracker, snap controller, dispatcher and reactor.  It never
//! owns the rendering surface: callers lend it per call, which keeps the
//! whole engine drivable from tests with a fake layout and synthetic
//! instants.
//!
//! Per poll, ordering is: cursor update → reactor → snap.  The cursor is
//! always current before the reactor reads it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::store::KeyValueStore;

use super::context::{Preferences, ReaderContext, ThemeMode};
use super::document::Document;
use super::flatten::FlatDocument;
use super::location::{AddressBar, Location};
use super::navigation::{Dispatcher, GoTo, NavIntent};
use super::reactor::{Reactor, ReactorPorts};
use super::snap::SnapController;
use super::surface::{self, Surface};
use super::timer::Debounce;
use super::tracker::CursorTracker;

/// Timing and distance knobs for the sync engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTuning {
    /// Quiet time before the cursor is recomputed from the scroll position.
    pub update_window: Duration,
    /// Quiet time before snapping is evaluated.  Longer than `update_window`.
    pub settle_window: Duration,
    /// How long a programmatic scroll suppresses snapping.  Longer than
    /// `settle_window`.
    pub programmatic_hold: Duration,
    /// Misalignment (rows) tolerated without a snap.
    pub snap_threshold: f64,
}

impl Default for ScrollTuning {
    fn default() -> Self {
        Self {
            update_window: Duration::from_millis(50),
            settle_window: Duration::from_millis(150),
            programmatic_hold: Duration::from_millis(500),
            snap_threshold: 0.5,
        }
    }
}

/// What a [`ReadingSession::poll`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// The settled cursor moved and the reactor ran.
    pub cursor_changed: bool,
    /// A snap scroll was issued.
    pub snapped: bool,
}

pub struct ReadingSession {
    tuning: ScrollTuning,
    translation: String,
    document: Arc<Document>,
    flat: FlatDocument,
    ctx: ReaderContext,
    tracker: CursorTracker,
    snap: SnapController,
    dispatcher: Dispatcher,
    reactor: Reactor,
    address: AddressBar,
}

impl ReadingSession {
    pub fn new(tuning: ScrollTuning, prefs: Preferences) -> Self {
        Self {
            tuning,
            translation: String::new(),
            document: Arc::new(Document::default()),
            flat: FlatDocument::default(),
            ctx: ReaderContext::new(prefs),
            tracker: CursorTracker::new(Debounce::new(tuning.update_window)),
            snap: SnapController::new(Debounce::new(tuning.settle_window), tuning.snap_threshold),
            dispatcher: Dispatcher::new(tuning.programmatic_hold),
            reactor: Reactor::default(),
            address: AddressBar::default(),
        }
    }

    // ── accessors ─────────────────────────────────────────────

    pub fn translation(&self) -> &str {
        &self.translation
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn flat(&self) -> &FlatDocument {
        &self.flat
    }

    pub fn cursor(&self) -> usize {
        self.ctx.cursor
    }

    pub fn prefs(&self) -> &Preferences {
        &self.ctx.prefs
    }

    pub fn prefs_mut(&mut self) -> &mut Preferences {
        &mut self.ctx.prefs
    }

    pub fn reactor(&self) -> &Reactor {
        &self.reactor
    }

    pub fn address(&self) -> &AddressBar {
        &self.address
    }

    /// `true` while a programmatic scroll suppresses snapping.
    pub fn programmatic_scroll_active(&self, now: Instant) -> bool {
        self.ctx.scroll_intent.is_active(now)
    }

    // ── document lifecycle ────────────────────────────────────

    /// Replace the document.  Timers, scroll intent and reactor memory are
    /// reset; the cursor is clamped into the new document.  The caller lays
    /// the surface out again and then calls [`Self::start_at`].
    pub fn install(&mut self, translation: &str, document: Arc<Document>) {
        self.translation = translation.to_string();
        self.flat = FlatDocument::build(&document);
        self.document = document;
        self.tracker.cancel();
        self.snap.reset();
        self.ctx.scroll_intent.release();
        self.reactor.reset();
        self.ctx.cursor = self.flat.clamp(self.ctx.cursor as i64).unwrap_or(0);
        tracing::info!(
            "installed {translation}: {} books, {} units",
            self.document.books().len(),
            self.flat.len()
        );
    }

    /// Place the cursor at `index` (clamped) without animation and run the
    /// reactor for it.  Used at boot and after a translation switch.
    pub fn start_at(&mut self, surface: &mut dyn Surface, store: &mut dyn KeyValueStore, index: i64) {
        let Some(index) = self.flat.clamp(index) else {
            return;
        };
        self.ctx.cursor = index;
        self.realign(surface);
        self.react(store);
    }

    /// Re-centre the cursor after the layout changed (resize, font size).
    /// Not a navigation: the reactor does not run.
    pub fn realign(&mut self, surface: &mut dyn Surface) {
        if let Some(extent) = surface.measure(self.ctx.cursor) {
            let offset = surface::centered_offset(extent, surface.viewport().height);
            surface.scroll_to(offset, false);
        }
        self.tracker.cancel();
        self.snap.reset();
    }

    // ── scroll engine ─────────────────────────────────────────

    /// A raw scroll event (organic input or an animation frame).
    pub fn on_scroll(&mut self, now: Instant) {
        self.tracker.on_scroll(now);
        self.snap.on_scroll(now);
    }

    /// The surface finished an animation; let the scroll intent lapse once
    /// one more settle window has passed.
    pub fn on_animation_finished(&mut self, now: Instant) {
        self.ctx
            .scroll_intent
            .shorten_to(now + self.tuning.settle_window);
    }

    /// Organic input took over from an animation; snapping resumes with
    /// the next settle window.
    pub fn cancel_programmatic(&mut self) {
        self.ctx.scroll_intent.release();
    }

    /// Earliest instant at which [`Self::poll`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.tracker.deadline(),
            self.snap.deadline(),
            self.ctx.scroll_intent.expiry(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Fire whatever timers are due at `now`.
    pub fn poll(
        &mut self,
        now: Instant,
        surface: &mut dyn Surface,
        store: &mut dyn KeyValueStore,
    ) -> PollOutcome {
        let mut outcome = PollOutcome::default();
        if self.tracker.poll(now, &mut self.ctx, surface).is_some() {
            outcome.cursor_changed = self.react(store);
        }
        outcome.snapped = self.snap.poll(now, &self.ctx, surface).is_some();
        self.ctx.scroll_intent.expire(now);
        outcome
    }

    /// Dispatch a navigation intent.  `None` when the intent has no target.
    pub fn navigate(
        &mut self,
        now: Instant,
        intent: NavIntent,
        surface: &mut dyn Surface,
        store: &mut dyn KeyValueStore,
    ) -> Option<GoTo> {
        let target = intent.resolve(self.ctx.cursor, &self.flat)?;
        self.go_to(now, target, surface, store)
    }

    /// Programmatic jump to `index` (clamped).  The reactor runs only when
    /// the cursor actually moved.
    pub fn go_to(
        &mut self,
        now: Instant,
        index: i64,
        surface: &mut dyn Surface,
        store: &mut dyn KeyValueStore,
    ) -> Option<GoTo> {
        let out = self
            .dispatcher
            .go_to(now, &mut self.ctx, &self.flat, surface, index)?;
        if out.changed {
            self.react(store);
        }
        Some(out)
    }

    // ── preferences that touch the location ───────────────────

    pub fn set_theme(&mut self, theme: ThemeMode, store: &mut dyn KeyValueStore) {
        self.ctx.prefs.set_theme(theme, store);
        if !self.flat.is_empty() {
            self.address
                .replace(Location::new(&self.translation, self.ctx.cursor, theme));
        }
    }

    fn react(&mut self, store: &mut dyn KeyValueStore) -> bool {
        let ports = ReactorPorts {
            store,
            address: &mut self.address,
        };
        self.reactor
            .react(&self.ctx, &self.flat, &self.translation, ports, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::Book;
    use crate::core::surface::fake::FakeSurface;
    use crate::store::{keys, MemoryStore};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// One book, `chapters` chapters of `verses` verses; units are 2 rows
    /// tall in a 10-row viewport.
    fn setup(chapters: usize, verses: usize) -> (ReadingSession, FakeSurface, MemoryStore) {
        let chapter: Vec<String> = (0..verses).map(|v| format!("verse {v}")).collect();
        let doc = Document::new(vec![Book::new("Test", vec![chapter; chapters])]);
        let mut session = ReadingSession::new(ScrollTuning::default(), Preferences::default());
        session.install("KJV", Arc::new(doc));
        let surface = FakeSurface::uniform(session.flat().len(), 2.0, 10.0);
        (session, surface, MemoryStore::default())
    }

    #[test]
    fn organic_scroll_settles_then_snaps() {
        let (mut s, mut surface, mut store) = setup(1, 30);
        s.start_at(&mut surface, &mut store, 0);
        let t0 = Instant::now();

        // Wheel burst ending with centre at 25.7 (unit 12, centre 25).
        for (i, top) in [6.0, 12.0, 18.0, 20.7].into_iter().enumerate() {
            surface.set_scroll_top(top);
            s.on_scroll(t0 + ms(10 * i as u64));
        }
        let last = t0 + ms(30);
        assert_eq!(s.next_deadline(), Some(last + ms(50)));

        let out = s.poll(last + ms(50), &mut surface, &mut store);
        assert!(out.cursor_changed && !out.snapped);
        assert_eq!(s.cursor(), 12);
        assert_eq!(s.reactor().announcement(), "Test 1:12 - verse 11");

        let out = s.poll(last + ms(150), &mut surface, &mut store);
        assert!(out.snapped);
        assert_eq!(surface.scrolls.last(), Some(&(20.0, true)));
    }

    #[test]
    fn programmatic_jump_is_never_snapped_mid_flight() {
        let (mut s, mut surface, mut store) = setup(1, 30);
        s.start_at(&mut surface, &mut store, 0);
        let t0 = Instant::now();

        let out = s.navigate(t0, NavIntent::Step(10), &mut surface, &mut store).unwrap();
        assert_eq!(out.index, 10);
        assert_eq!(s.cursor(), 10, "cursor moves before the animation ends");

        // Animation frames land off-centre; the settle window elapses while
        // the intent is still raised.
        surface.set_scroll_top(13.0);
        s.on_scroll(t0 + ms(20));
        let out = s.poll(t0 + ms(170), &mut surface, &mut store);
        assert_eq!(out, PollOutcome::default());
        assert_eq!(s.cursor(), 10, "intermediate frames do not move the cursor");
        assert_eq!(surface.scrolls.len(), 2, "start_at + jump, no snap");
    }

    #[test]
    fn deferred_update_runs_once_the_intent_lapses() {
        let (mut s, mut surface, mut store) = setup(1, 30);
        s.start_at(&mut surface, &mut store, 0);
        let t0 = Instant::now();
        s.navigate(t0, NavIntent::Index(10), &mut surface, &mut store);

        // User scrolls away during the animation.
        surface.set_scroll_top(30.0); // centre 35 → unit 17
        s.on_scroll(t0 + ms(100));
        s.poll(t0 + ms(150), &mut surface, &mut store);
        assert_eq!(s.cursor(), 10);

        let out = s.poll(t0 + ms(500), &mut surface, &mut store);
        assert!(out.cursor_changed);
        assert_eq!(s.cursor(), 17);
    }

    #[test]
    fn animation_completion_shortens_the_hold() {
        let (mut s, mut surface, mut store) = setup(1, 30);
        let t0 = Instant::now();
        s.navigate(t0, NavIntent::Index(10), &mut surface, &mut store);
        s.on_animation_finished(t0 + ms(100));
        assert!(s.programmatic_scroll_active(t0 + ms(249)));
        assert!(!s.programmatic_scroll_active(t0 + ms(250)));
    }

    #[test]
    fn organic_takeover_releases_the_hold() {
        let (mut s, mut surface, mut store) = setup(1, 30);
        s.start_at(&mut surface, &mut store, 0);
        let t0 = Instant::now();
        s.navigate(t0, NavIntent::Index(10), &mut surface, &mut store);
        assert!(s.programmatic_scroll_active(t0 + ms(100)));

        s.cancel_programmatic();
        surface.set_scroll_top(13.4); // centre 18.4 → unit 9, off-centre
        s.on_scroll(t0 + ms(100));
        assert!(!s.programmatic_scroll_active(t0 + ms(100)));

        let out = s.poll(t0 + ms(150), &mut surface, &mut store);
        assert!(out.cursor_changed);
        assert_eq!(s.cursor(), 9);
        let out = s.poll(t0 + ms(250), &mut surface, &mut store);
        assert!(out.snapped);
        assert_eq!(surface.scrolls.last(), Some(&(14.0, true)));
    }

    #[test]
    fn repeated_jumps_to_the_same_index_write_once() {
        let (mut s, mut surface, mut store) = setup(1, 3);
        s.start_at(&mut surface, &mut store, 0);
        let writes = store.writes();
        let bar = s.address().replacements();
        let t0 = Instant::now();

        let first = s.go_to(t0, 99, &mut surface, &mut store).unwrap();
        assert_eq!(first, GoTo { index: 3, changed: true });
        let second = s.go_to(t0 + ms(10), 99, &mut surface, &mut store).unwrap();
        assert_eq!(second, GoTo { index: 3, changed: false });

        assert_eq!(store.writes(), writes + 1);
        assert_eq!(s.address().replacements(), bar + 1);
        assert!(store.get(keys::LAST_POSITION).unwrap().contains("\"index\":3"));
    }

    #[test]
    fn chapter_navigation_crosses_chapters() {
        let (mut s, mut surface, mut store) = setup(3, 2);
        s.start_at(&mut surface, &mut store, 1);
        let t0 = Instant::now();
        let out = s.navigate(t0, NavIntent::NextChapter, &mut surface, &mut store).unwrap();
        assert_eq!(out.index, 3);
        assert_eq!(s.reactor().selectors().chapter, Some(1));
        assert_eq!(s.navigate(t0, NavIntent::End, &mut surface, &mut store).unwrap().index, 8);
        assert_eq!(s.navigate(t0, NavIntent::NextChapter, &mut surface, &mut store), None);
    }

    #[test]
    fn empty_document_makes_everything_a_no_op() {
        let mut s = ReadingSession::new(ScrollTuning::default(), Preferences::default());
        s.install("KJV", Arc::new(Document::default()));
        let mut surface = FakeSurface::uniform(0, 2.0, 10.0);
        let mut store = MemoryStore::default();
        let t0 = Instant::now();

        s.start_at(&mut surface, &mut store, 5);
        assert_eq!(s.navigate(t0, NavIntent::End, &mut surface, &mut store), None);
        s.on_scroll(t0);
        assert_eq!(s.poll(t0 + ms(200), &mut surface, &mut store), PollOutcome::default());
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn theme_toggle_replaces_the_location() {
        let (mut s, mut surface, mut store) = setup(1, 3);
        s.start_at(&mut surface, &mut store, 2);
        s.set_theme(ThemeMode::Dark, &mut store);
        assert_eq!(
            s.address().current().unwrap().to_string(),
            "?t=KJV&v=2&theme=dark"
        );
    }
}

//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).
//! The methods below keep the reading session, the column surface and the
//! store in step with each other.

use std::sync::Arc;
use std::time::Instant;

use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::context::{ThemeMode, FONT_SIZE_STEP};
use crate::core::document::{Document, LoadError};
use crate::core::navigation::{GoTo, NavIntent};
use crate::core::position::ReadingPosition;
use crate::core::search::{self, Suggestion, MAX_SUGGESTIONS};
use crate::core::session::ReadingSession;
use crate::store::{keys, KeyValueStore};
use crate::ui::column::{self, ColumnLayout};
use crate::ui::layout::AppLayout;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Reader,
    Settings,
    Help,
    QuickJump,
    BookPicker,
    ChapterPicker,
    ContinuePrompt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading { translation: String },
    Ready,
    Failed { message: String },
}

/// Quick-jump modal contents.
#[derive(Debug, Default)]
pub struct JumpState {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
    pub selected: usize,
}

/// Selection and scroll of a list popup.
#[derive(Debug, Default)]
pub struct PickerState {
    pub selected: usize,
    pub offset: usize,
}

impl PickerState {
    pub fn select(&mut self, index: usize, len: usize) {
        self.selected = index.min(len.saturating_sub(1));
    }

    pub fn move_by(&mut self, delta: i64, len: usize) {
        let next = (self.selected as i64 + delta).clamp(0, len.saturating_sub(1) as i64);
        self.selected = next as usize;
    }

    /// Keep the selection visible within `height` rows.
    pub fn clamp_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected - height + 1;
        }
    }
}

/// Top-level application state.
pub struct AppState {
    pub config: AppConfig,
    /// Document, cursor and the scroll-sync engine.
    pub session: ReadingSession,
    /// The rendering surface the session measures.
    pub column: ColumnLayout,
    pub store: Box<dyn KeyValueStore>,
    pub load_status: LoadStatus,
    /// Set by handlers; the main loop hands it to the loader.
    pub requested_translation: Option<String>,
    /// Index to open once the requested translation is installed.
    pub pending_start: Option<i64>,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional one-shot message shown in the bottom bar.
    pub status_message: Option<String>,
    pub active_view: ActiveView,
    pub settings_selected: usize,
    pub jump: JumpState,
    pub picker: PickerState,
    /// Saved position offered once the first document is shown.
    pub continue_offer: Option<ReadingPosition>,
    pub terminal_area: Rect,
    /// Where a left-button press started, for click vs. swipe.
    pub drag_origin: Option<(u16, u16)>,
    /// Ring the terminal bell on the next frame.
    pub bell_pending: bool,
    /// Spinner counter.
    pub tick: u64,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        session: ReadingSession,
        store: Box<dyn KeyValueStore>,
        terminal_area: Rect,
    ) -> Self {
        Self {
            config,
            session,
            column: ColumnLayout::default(),
            store,
            load_status: LoadStatus::Ready,
            requested_translation: None,
            pending_start: None,
            should_quit: false,
            status_message: None,
            active_view: ActiveView::default(),
            settings_selected: 0,
            jump: JumpState::default(),
            picker: PickerState::default(),
            continue_offer: None,
            terminal_area,
            drag_origin: None,
            bell_pending: false,
            tick: 0,
        }
    }

    pub fn layout(&self) -> AppLayout {
        AppLayout::from_area(self.terminal_area, self.session.prefs().focus_mode)
    }

    pub fn column_area(&self) -> Rect {
        let layout = self.layout();
        let available = layout.reading_area.width.saturating_sub(2);
        layout.column_area(column::column_width(self.session.prefs().font_size, available))
    }

    pub fn is_ready(&self) -> bool {
        self.load_status == LoadStatus::Ready
    }

    // ── layout ─────────────────────────────────────────────────

    /// Re-wrap the column for the current area and font size and re-centre
    /// the cursor.
    pub fn relayout(&mut self) {
        let area = self.column_area();
        self.column
            .relayout(self.session.flat().units(), area.width, area.height);
        self.session.realign(&mut self.column);
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal_area = Rect::new(0, 0, width, height);
        self.relayout();
    }

    // ── documents ──────────────────────────────────────────────

    /// Ask for translation `id`.  The current index is kept unless a start
    /// index is already pending.
    pub fn request_translation(&mut self, id: &str) {
        if self.is_ready() && self.session.translation() == id {
            return;
        }
        if self.pending_start.is_none() && !self.session.flat().is_empty() {
            self.pending_start = Some(self.session.cursor() as i64);
        }
        self.requested_translation = Some(id.to_string());
    }

    pub fn loading(&mut self, id: &str) {
        self.load_status = LoadStatus::Loading {
            translation: id.to_string(),
        };
    }

    pub fn install(&mut self, id: &str, document: Arc<Document>) {
        self.session.install(id, document);
        self.store.set(keys::TRANSLATION, id);
        self.load_status = LoadStatus::Ready;
        let area = self.column_area();
        self.column
            .relayout(self.session.flat().units(), area.width, area.height);
        let start = self
            .pending_start
            .take()
            .unwrap_or(self.session.cursor() as i64);
        self.session
            .start_at(&mut self.column, self.store.as_mut(), start);
        if self.continue_offer.is_some() && self.active_view == ActiveView::Reader {
            self.active_view = ActiveView::ContinuePrompt;
        }
    }

    pub fn load_failed(&mut self, id: &str, err: &LoadError) {
        tracing::warn!("loading {id} failed: {err}");
        self.pending_start = None;
        self.load_status = LoadStatus::Failed {
            message: format!("Failed to load {id}: {err}"),
        };
    }

    // ── scroll engine glue ─────────────────────────────────────

    pub fn navigate(&mut self, intent: NavIntent, now: Instant) -> Option<GoTo> {
        if !self.is_ready() {
            return None;
        }
        let out = self
            .session
            .navigate(now, intent, &mut self.column, self.store.as_mut())?;
        if out.changed && self.session.prefs().audio {
            self.bell_pending = true;
        }
        Some(out)
    }

    /// Organic wheel scroll.  A wheel during an animation cancels it, so
    /// the programmatic hold goes with it.
    pub fn wheel(&mut self, rows: f64, now: Instant) {
        let interrupted = self.column.is_animating();
        let moved = self.column.scroll_by(rows);
        if interrupted {
            self.session.cancel_programmatic();
        }
        if moved || interrupted {
            self.session.on_scroll(now);
        }
    }

    /// Advance the scroll animation one frame.
    pub fn animation_frame(&mut self, now: Instant) {
        let frame = self.column.tick();
        if frame.moved {
            self.session.on_scroll(now);
        }
        if frame.finished {
            self.session.on_animation_finished(now);
        }
    }

    /// Fire due timers.
    pub fn poll(&mut self, now: Instant) {
        let outcome = self
            .session
            .poll(now, &mut self.column, self.store.as_mut());
        if outcome.cursor_changed && self.session.prefs().audio {
            self.bell_pending = true;
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.session.next_deadline()
    }

    /// Centre the unit under viewport row `row` of the column area.
    pub fn click(&mut self, column: u16, row: u16, now: Instant) {
        let area = self.column_area();
        if row < area.y || row >= area.bottom() || column < area.x || column >= area.right() {
            return;
        }
        if let Some(index) = self.column.unit_at_row(row - area.y) {
            self.navigate(NavIntent::Index(index as i64), now);
        }
    }

    /// Put the cursor verse on the system clipboard as `"Book ch:v - text"`.
    pub fn copy_verse(&mut self) {
        let unit = self.session.flat().get(self.session.cursor());
        let Some((reference, text)) = unit.and_then(|u| Some((u.reference(), u.quotation()?)))
        else {
            self.status_message = Some("Nothing to copy on a chapter heading".into());
            return;
        };
        let copied = arboard::Clipboard::new().and_then(|mut c| c.set_text(text));
        self.status_message = Some(match copied {
            Ok(()) => {
                tracing::debug!("copied {reference} to clipboard");
                format!("Copied {reference}")
            }
            Err(err) => {
                tracing::warn!("clipboard copy failed: {err}");
                format!("Clipboard unavailable: {err}")
            }
        });
    }

    // ── preferences ────────────────────────────────────────────

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.session.set_theme(theme, self.store.as_mut());
    }

    pub fn toggle_theme(&mut self) {
        let next = self.session.prefs().theme.toggled();
        self.set_theme(next);
    }

    pub fn adjust_font_size(&mut self, steps: i16) {
        let size = self
            .session
            .prefs_mut()
            .adjust_font_size(steps * FONT_SIZE_STEP, self.store.as_mut());
        self.status_message = Some(format!("Text size {size}%"));
        self.relayout();
    }

    pub fn set_serif(&mut self, serif: bool) {
        self.session.prefs_mut().set_serif(serif, self.store.as_mut());
    }

    pub fn set_audio(&mut self, audio: bool) {
        self.session.prefs_mut().set_audio(audio, self.store.as_mut());
    }

    pub fn set_focus_mode(&mut self, focus: bool) {
        if self.session.prefs().focus_mode == focus {
            return;
        }
        self.session.prefs_mut().focus_mode = focus;
        self.relayout();
    }

    // ── popups ─────────────────────────────────────────────────

    pub fn open_quick_jump(&mut self) {
        self.jump = JumpState::default();
        self.active_view = ActiveView::QuickJump;
    }

    pub fn refresh_suggestions(&mut self) {
        self.jump.suggestions =
            search::suggest(self.session.document(), &self.jump.query, MAX_SUGGESTIONS);
        self.jump.selected = 0;
    }

    pub fn open_book_picker(&mut self) {
        let len = self.session.document().books().len();
        let current = self.session.reactor().selectors().book.unwrap_or(0);
        self.picker = PickerState::default();
        self.picker.select(current, len);
        self.active_view = ActiveView::BookPicker;
    }

    pub fn open_chapter_picker(&mut self) {
        let selectors = self.session.reactor().selectors();
        let len = selectors.chapter_options.len();
        let current = selectors.chapter.unwrap_or(0);
        self.picker = PickerState::default();
        self.picker.select(current, len);
        self.active_view = ActiveView::ChapterPicker;
    }

    /// Accept the continue-reading offer.
    pub fn accept_continue(&mut self, now: Instant) {
        self.active_view = ActiveView::Reader;
        let Some(position) = self.continue_offer.take() else {
            return;
        };
        if position.translation == self.session.translation() {
            self.navigate(NavIntent::Index(position.index as i64), now);
        } else {
            self.pending_start = Some(position.index as i64);
            self.request_translation(&position.translation);
        }
    }

    /// Decline the offer and forget the saved position.
    pub fn decline_continue(&mut self) {
        self.active_view = ActiveView::Reader;
        if self.continue_offer.take().is_some() {
            ReadingPosition::forget(self.store.as_mut());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::context::Preferences;
    use crate::core::document::Book;
    use crate::core::surface::Surface;
    use crate::store::MemoryStore;

    pub(crate) fn ready_state(chapters: usize, verses: usize) -> AppState {
        state_with_text(chapters, verses, |v| format!("verse {v}"))
    }

    fn state_with_text(chapters: usize, verses: usize, text: impl Fn(usize) -> String) -> AppState {
        let chapter: Vec<String> = (0..verses).map(text).collect();
        let doc = Document::new(vec![
            Book::new("Genesis", vec![chapter.clone(); chapters]),
            Book::new("Exodus", vec![chapter; chapters]),
        ]);
        let config = AppConfig::default();
        let session = ReadingSession::new(config.tuning(), Preferences::default());
        let mut state = AppState::new(
            config,
            session,
            Box::new(MemoryStore::default()),
            Rect::new(0, 0, 100, 30),
        );
        state.install("KJV", Arc::new(doc));
        state
    }

    #[test]
    fn install_lays_out_and_starts_at_pending_index() {
        let mut state = ready_state(2, 5);
        assert_eq!(state.session.cursor(), 0);
        assert_eq!(state.column.unit_count(), state.session.flat().len());

        state.pending_start = Some(7);
        let doc = Arc::new(state.session.document().clone());
        state.install("WEB", doc);
        assert_eq!(state.session.cursor(), 7);
        assert_eq!(state.store.get(keys::TRANSLATION).as_deref(), Some("WEB"));
    }

    #[test]
    fn translation_switch_keeps_the_index() {
        let mut state = ready_state(2, 5);
        state.navigate(NavIntent::Index(9), Instant::now());
        state.request_translation("BBE");
        assert_eq!(state.requested_translation.as_deref(), Some("BBE"));
        assert_eq!(state.pending_start, Some(9));

        state.requested_translation = None;
        state.pending_start = None;
        state.request_translation("KJV");
        assert_eq!(state.requested_translation, None, "already showing KJV");
    }

    #[test]
    fn font_size_changes_relayout_and_keep_cursor_centred() {
        let mut state = ready_state(3, 20);
        state.navigate(NavIntent::Index(30), Instant::now());
        let before = state.column.width();
        state.adjust_font_size(3);
        assert!(state.column.width() < before);
        assert_eq!(state.session.prefs().font_size, 130);
        let nearest = crate::core::surface::nearest_unit(&state.column).unwrap();
        assert_eq!(nearest.index, 30);
    }

    #[test]
    fn continue_prompt_accept_and_decline() {
        let mut state = ready_state(2, 5);
        let offer = ReadingPosition {
            translation: "KJV".into(),
            book_name: "Exodus".into(),
            chapter: 1,
            verse: Some(2),
            index: 14,
            timestamp: 0,
        };
        offer.save(state.store.as_mut());
        state.continue_offer = Some(offer.clone());
        state.accept_continue(Instant::now());
        assert_eq!(state.session.cursor(), 14);
        assert_eq!(state.active_view, ActiveView::Reader);

        state.continue_offer = Some(offer);
        state.decline_continue();
        assert_eq!(state.store.get(keys::LAST_POSITION), None);
    }

    #[test]
    fn audio_tick_rings_on_settled_cursor_change() {
        let mut state = ready_state(2, 30);
        state.set_audio(true);
        let t0 = Instant::now();
        state.wheel(12.0, t0);
        state.poll(t0 + state.config.tuning().update_window);
        assert!(state.bell_pending);
    }

    #[test]
    fn wheel_during_a_jump_still_snaps() {
        let mut state = state_with_text(1, 40, |v| format!("verse {v} {}", "and it was so ".repeat(10)));
        let t0 = Instant::now();
        state.navigate(NavIntent::Index(10), t0);
        assert!(state.column.is_animating());
        for frame in 1..=3u64 {
            state.animation_frame(t0 + Duration::from_millis(16 * frame));
        }

        let wheel_at = t0 + Duration::from_millis(200);
        state.wheel(1.0, wheel_at);
        assert!(!state.column.is_animating());

        let mut now = wheel_at;
        while now < wheel_at + Duration::from_secs(3) {
            now += Duration::from_millis(10);
            if state.column.is_animating() {
                state.animation_frame(now);
            }
            state.poll(now);
        }
        let nearest = crate::core::surface::nearest_unit(&state.column).unwrap();
        assert!(nearest.distance <= 0.5, "left {} rows off unit {}", nearest.distance, nearest.index);
        assert_eq!(state.session.cursor(), nearest.index);
    }

    #[test]
    fn failed_load_blocks_navigation_and_allows_retry() {
        let mut state = ready_state(2, 5);
        state.navigate(NavIntent::Index(4), Instant::now());
        state.load_failed("WEB", &LoadError::UnknownTranslation("WEB".into()));

        assert_eq!(
            state.load_status,
            LoadStatus::Failed {
                message: "Failed to load WEB: unknown translation `WEB`".into()
            }
        );
        assert!(!state.is_ready());
        assert_eq!(state.pending_start, None);
        assert_eq!(state.navigate(NavIntent::Step(1), Instant::now()), None);
        assert_eq!(state.session.cursor(), 4);

        // Even the translation still in memory can be requested again.
        state.request_translation("KJV");
        assert_eq!(state.requested_translation.as_deref(), Some("KJV"));
        assert_eq!(state.pending_start, Some(4));
    }

    #[test]
    fn copying_a_heading_only_reports() {
        let mut state = ready_state(2, 5);
        assert!(state.session.flat().get(0).unwrap().is_heading());
        state.copy_verse();
        assert_eq!(
            state.status_message.as_deref(),
            Some("Nothing to copy on a chapter heading")
        );
    }
}

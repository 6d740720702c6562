//! Input handling — maps key/mouse events to state mutations.
//!
//! Every discrete movement becomes a [`NavIntent`] and goes through
//! [`AppState::navigate`]; only the wheel scrolls the column directly.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::config::Action;
use crate::core::navigation::{NavIntent, PAGE_STEP};
use crate::ui::popup::PICKER_ROWS;

use super::settings::SETTINGS_ITEMS;
use super::state::{ActiveView, AppState};

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent, now: Instant) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }
    state.status_message = None;

    match state.active_view {
        ActiveView::Reader => handle_reader_key(state, key, now),
        ActiveView::Settings => handle_settings_key(state, key),
        ActiveView::Help => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('i')
            ) {
                state.active_view = ActiveView::Reader;
            }
        }
        ActiveView::QuickJump => handle_jump_key(state, key, now),
        ActiveView::BookPicker | ActiveView::ChapterPicker => handle_picker_key(state, key, now),
        ActiveView::ContinuePrompt => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => state.accept_continue(now),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => state.decline_continue(),
            _ => {}
        },
    }
}

// ── Reader (configurable bindings) ──────────────────────────────

fn handle_reader_key(state: &mut AppState, key: KeyEvent, now: Instant) {
    if key.code == KeyCode::Esc {
        state.set_focus_mode(false);
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    // Without a document only the chrome actions make sense.
    let needs_document = !matches!(
        action,
        Action::Quit | Action::OpenSettings | Action::OpenHelp | Action::ToggleTheme
    );
    if needs_document && !state.is_ready() {
        return;
    }

    let intent = match action {
        Action::StepUp => Some(NavIntent::Step(-1)),
        Action::StepDown => Some(NavIntent::Step(1)),
        Action::PageUp => Some(NavIntent::Step(-PAGE_STEP)),
        Action::PageDown => Some(NavIntent::Step(PAGE_STEP)),
        Action::Home => Some(NavIntent::Home),
        Action::End => Some(NavIntent::End),
        Action::PrevChapter => Some(NavIntent::PrevChapter),
        Action::NextChapter => Some(NavIntent::NextChapter),
        Action::QuickJump => {
            state.open_quick_jump();
            None
        }
        Action::PickBook => {
            state.open_book_picker();
            None
        }
        Action::PickChapter => {
            state.open_chapter_picker();
            None
        }
        Action::CopyVerse => {
            state.copy_verse();
            None
        }
        Action::ToggleTheme => {
            state.toggle_theme();
            None
        }
        Action::FontLarger => {
            state.adjust_font_size(1);
            None
        }
        Action::FontSmaller => {
            state.adjust_font_size(-1);
            None
        }
        Action::ToggleSerif => {
            let serif = !state.session.prefs().serif;
            state.set_serif(serif);
            None
        }
        Action::ToggleAudio => {
            let audio = !state.session.prefs().audio;
            state.set_audio(audio);
            state.status_message = Some(format!("Audio tick {}", if audio { "on" } else { "off" }));
            None
        }
        Action::ToggleFocus => {
            let focus = !state.session.prefs().focus_mode;
            state.set_focus_mode(focus);
            None
        }
        Action::OpenSettings => {
            state.active_view = ActiveView::Settings;
            state.settings_selected = 0;
            None
        }
        Action::OpenHelp => {
            state.active_view = ActiveView::Help;
            None
        }
        Action::Quit => {
            state.should_quit = true;
            None
        }
    };

    if let Some(intent) = intent {
        state.navigate(intent, now);
    }
}

// ── Settings popup ──────────────────────────────────────────────

fn handle_settings_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            state.active_view = ActiveView::Reader;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.settings_selected = state.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.settings_selected < SETTINGS_ITEMS.len() - 1 {
                state.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            if let Some(item) = SETTINGS_ITEMS.get(state.settings_selected) {
                item.activate(state);
            }
        }
        _ => {}
    }
}

// ── Quick jump ──────────────────────────────────────────────────

fn handle_jump_key(state: &mut AppState, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => state.active_view = ActiveView::Reader,
        KeyCode::Enter => {
            let Some(suggestion) = state.jump.suggestions.get(state.jump.selected) else {
                return;
            };
            let target = suggestion.target;
            state.active_view = ActiveView::Reader;
            state.navigate(NavIntent::Jump(target), now);
        }
        KeyCode::Up => state.jump.selected = state.jump.selected.saturating_sub(1),
        KeyCode::Down => {
            if state.jump.selected + 1 < state.jump.suggestions.len() {
                state.jump.selected += 1;
            }
        }
        KeyCode::Backspace => {
            state.jump.query.pop();
            state.refresh_suggestions();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.jump.query.push(c);
            state.refresh_suggestions();
        }
        _ => {}
    }
}

// ── Book / chapter pickers ──────────────────────────────────────

fn picker_len(state: &AppState) -> usize {
    match state.active_view {
        ActiveView::BookPicker => state.session.document().books().len(),
        ActiveView::ChapterPicker => state.session.reactor().selectors().chapter_options.len(),
        _ => 0,
    }
}

fn handle_picker_key(state: &mut AppState, key: KeyEvent, now: Instant) {
    let len = picker_len(state);
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => state.active_view = ActiveView::Reader,
        KeyCode::Up | KeyCode::Char('k') => state.picker.move_by(-1, len),
        KeyCode::Down | KeyCode::Char('j') => state.picker.move_by(1, len),
        KeyCode::PageUp => state.picker.move_by(-(PICKER_ROWS as i64), len),
        KeyCode::PageDown => state.picker.move_by(PICKER_ROWS as i64, len),
        KeyCode::Home => state.picker.select(0, len),
        KeyCode::End => state.picker.select(len.saturating_sub(1), len),
        KeyCode::Enter => {
            if len == 0 {
                state.active_view = ActiveView::Reader;
                return;
            }
            let selected = state.picker.selected;
            let intent = if state.active_view == ActiveView::BookPicker {
                NavIntent::Book(selected)
            } else {
                let Some(book) = state.session.reactor().selectors().book else {
                    state.active_view = ActiveView::Reader;
                    return;
                };
                NavIntent::Chapter {
                    book,
                    chapter: selected,
                }
            };
            state.active_view = ActiveView::Reader;
            state.navigate(intent, now);
            return;
        }
        _ => {}
    }
    state.picker.clamp_scroll(PICKER_ROWS);
}

// ── Mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent, now: Instant) {
    if state.active_view != ActiveView::Reader || !state.is_ready() {
        return;
    }
    let rows = state.config.wheel_rows as f64;

    match mouse.kind {
        MouseEventKind::ScrollDown => state.wheel(rows, now),
        MouseEventKind::ScrollUp => state.wheel(-rows, now),
        MouseEventKind::Down(MouseButton::Left) => {
            state.drag_origin = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let Some((x0, y0)) = state.drag_origin.take() else {
                return;
            };
            let dx = mouse.column as i32 - x0 as i32;
            if dx.unsigned_abs() >= state.config.swipe_columns as u32 {
                // Dragging the page left reveals what comes next.
                let intent = if dx < 0 {
                    NavIntent::NextChapter
                } else {
                    NavIntent::PrevChapter
                };
                state.navigate(intent, now);
            } else if mouse.row == y0 {
                state.click(mouse.column, mouse.row, now);
            }
        }
        _ => {}
    }
}

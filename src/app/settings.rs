//! Settings menu model (data only).
//!
//! Keeping these definitions outside the input handler lets both the handler
//! and the popup renderer consume the same source of truth.

use super::loader;
use super::state::AppState;
use crate::core::context::{ThemeMode, FONT_SIZE_MAX, FONT_SIZE_MIN, FONT_SIZE_STEP};

/// A single item in the settings menu.
pub enum SettingsItem {
    /// Boolean toggle — reads/writes via accessors on `AppState`.
    Toggle {
        label: &'static str,
        get: fn(&AppState) -> bool,
        set: fn(&mut AppState, bool),
    },
    /// Cycles through a finite set of values.
    Cycle {
        label: &'static str,
        value: fn(&AppState) -> String,
        cycle: fn(&mut AppState),
    },
}

impl SettingsItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Toggle { label, .. } | Self::Cycle { label, .. } => label,
        }
    }

    /// Flip or advance the item.
    pub fn activate(&self, state: &mut AppState) {
        match self {
            Self::Toggle { get, set, .. } => {
                let current = get(state);
                set(state, !current);
            }
            Self::Cycle { cycle, .. } => cycle(state),
        }
    }
}

/// All items shown in the settings popup, in display order.
pub static SETTINGS_ITEMS: &[SettingsItem] = &[
    SettingsItem::Cycle {
        label: "Translation",
        value: |s| s.session.translation().to_string(),
        cycle: |s| {
            let next = loader::next_after(s.session.translation());
            s.status_message = Some(format!("Translation: {}", next.name));
            s.request_translation(next.id);
        },
    },
    SettingsItem::Toggle {
        label: "Dark Theme",
        get: |s| s.session.prefs().theme == ThemeMode::Dark,
        set: |s, v| s.set_theme(if v { ThemeMode::Dark } else { ThemeMode::Light }),
    },
    SettingsItem::Cycle {
        label: "Text Size",
        value: |s| format!("{}%", s.session.prefs().font_size),
        cycle: |s| {
            if s.session.prefs().font_size >= FONT_SIZE_MAX {
                let steps = (FONT_SIZE_MAX - FONT_SIZE_MIN) / FONT_SIZE_STEP as u16;
                s.adjust_font_size(-(steps as i16));
            } else {
                s.adjust_font_size(1);
            }
        },
    },
    SettingsItem::Toggle {
        label: "Serif Text",
        get: |s| s.session.prefs().serif,
        set: |s, v| s.set_serif(v),
    },
    SettingsItem::Toggle {
        label: "Audio Tick",
        get: |s| s.session.prefs().audio,
        set: |s, v| s.set_audio(v),
    },
    SettingsItem::Toggle {
        label: "Focus Mode",
        get: |s| s.session.prefs().focus_mode,
        set: |s, v| s.set_focus_mode(v),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::tests::ready_state;
    use crate::store::keys;

    fn item(label: &str) -> &'static SettingsItem {
        SETTINGS_ITEMS
            .iter()
            .find(|i| i.label() == label)
            .unwrap()
    }

    #[test]
    fn toggles_persist_preferences() {
        let mut state = ready_state(1, 3);
        item("Dark Theme").activate(&mut state);
        assert_eq!(state.session.prefs().theme, ThemeMode::Dark);
        assert_eq!(state.store.get(keys::THEME).as_deref(), Some("dark"));

        item("Serif Text").activate(&mut state);
        assert_eq!(state.store.get(keys::SERIF_FONT).as_deref(), Some("true"));
    }

    #[test]
    fn text_size_wraps_back_to_minimum() {
        let mut state = ready_state(1, 3);
        let size = item("Text Size");
        let mut seen = Vec::new();
        for _ in 0..6 {
            size.activate(&mut state);
            seen.push(state.session.prefs().font_size);
        }
        assert_eq!(seen, vec![110, 120, 130, 140, 150, 70]);
    }

    #[test]
    fn translation_cycles_through_catalog() {
        let mut state = ready_state(1, 3);
        item("Translation").activate(&mut state);
        assert_eq!(state.requested_translation.as_deref(), Some("WEB"));
    }
}

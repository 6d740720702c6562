//! The explicit reader context passed to every engine component.
//!
//! Cursor, scroll intent and preference flags live here instead of in
//! closures or globals, so each component can be driven in isolation.

use std::fmt;

use crate::store::{keys, KeyValueStore};

use super::timer::Hold;

// ───────────────────────────────────────── preferences ───────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const FONT_SIZE_MIN: u16 = 70;
pub const FONT_SIZE_MAX: u16 = 150;
pub const FONT_SIZE_STEP: i16 = 10;
pub const FONT_SIZE_DEFAULT: u16 = 100;

/// Appearance and feedback preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub theme: ThemeMode,
    /// Percentage, `FONT_SIZE_MIN..=FONT_SIZE_MAX`.
    pub font_size: u16,
    pub serif: bool,
    pub audio: bool,
    /// Hides header and status chrome.  Not persisted.
    pub focus_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: ThemeMode::default(),
            font_size: FONT_SIZE_DEFAULT,
            serif: false,
            audio: false,
            focus_mode: false,
        }
    }
}

impl Preferences {
    /// Read persisted preferences; anything missing or malformed falls back
    /// to its default.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();
        Self {
            theme: store
                .get(keys::THEME)
                .and_then(|s| ThemeMode::parse(&s))
                .unwrap_or(defaults.theme),
            font_size: store
                .get(keys::FONT_SIZE)
                .and_then(|s| s.trim().parse::<u16>().ok())
                .filter(|v| *v > 0)
                .map(|v| v.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX))
                .unwrap_or(defaults.font_size),
            serif: store.get(keys::SERIF_FONT).as_deref() == Some("true"),
            audio: store.get(keys::AUDIO_ENABLED).as_deref() == Some("true"),
            focus_mode: false,
        }
    }

    pub fn set_theme(&mut self, theme: ThemeMode, store: &mut dyn KeyValueStore) {
        self.theme = theme;
        store.set(keys::THEME, theme.as_str());
    }

    /// Step the font size, clamped.  Returns the new size.
    pub fn adjust_font_size(&mut self, delta: i16, store: &mut dyn KeyValueStore) -> u16 {
        let next = (self.font_size as i16 + delta).clamp(FONT_SIZE_MIN as i16, FONT_SIZE_MAX as i16);
        self.font_size = next as u16;
        store.set(keys::FONT_SIZE, &self.font_size.to_string());
        self.font_size
    }

    pub fn set_serif(&mut self, serif: bool, store: &mut dyn KeyValueStore) {
        self.serif = serif;
        store.set(keys::SERIF_FONT, if serif { "true" } else { "false" });
    }

    pub fn set_audio(&mut self, audio: bool, store: &mut dyn KeyValueStore) {
        self.audio = audio;
        store.set(keys::AUDIO_ENABLED, if audio { "true" } else { "false" });
    }
}

// ───────────────────────────────────────── context ───────────

/// Shared mutable reader state.  Only the event-processing context touches it.
#[derive(Debug, Clone, Default)]
pub struct ReaderContext {
    /// Index into the flattened document.  Always `< len` once a non-empty
    /// document is loaded; `0` otherwise.
    pub cursor: usize,
    /// Raised while a programmatic scroll animation is in flight.
    pub scroll_intent: Hold,
    pub prefs: Preferences,
}

impl ReaderContext {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            cursor: 0,
            scroll_intent: Hold::default(),
            prefs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn malformed_preferences_fall_back_to_defaults() {
        let mut store = MemoryStore::default();
        store.set(keys::THEME, "purple");
        store.set(keys::FONT_SIZE, "huge");
        store.set(keys::SERIF_FONT, "yes");
        assert_eq!(Preferences::load(&store), Preferences::default());
    }

    #[test]
    fn font_size_is_clamped_on_load_and_adjust() {
        let mut store = MemoryStore::default();
        store.set(keys::FONT_SIZE, "400");
        let mut prefs = Preferences::load(&store);
        assert_eq!(prefs.font_size, FONT_SIZE_MAX);
        assert_eq!(prefs.adjust_font_size(FONT_SIZE_STEP, &mut store), FONT_SIZE_MAX);
        for _ in 0..20 {
            prefs.adjust_font_size(-FONT_SIZE_STEP, &mut store);
        }
        assert_eq!(prefs.font_size, FONT_SIZE_MIN);
        assert_eq!(store.get(keys::FONT_SIZE).as_deref(), Some("70"));
    }

    #[test]
    fn toggles_persist() {
        let mut store = MemoryStore::default();
        let mut prefs = Preferences::default();
        prefs.set_theme(ThemeMode::Dark, &mut store);
        prefs.set_serif(true, &mut store);
        prefs.set_audio(true, &mut store);
        let reloaded = Preferences::load(&store);
        assert_eq!(reloaded.theme, ThemeMode::Dark);
        assert!(reloaded.serif);
        assert!(reloaded.audio);
    }
}

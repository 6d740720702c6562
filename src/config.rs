//! User configuration — keybindings and scroll tunables.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/tiny-scroll/config.toml` (default
//! `~/.config/tiny-scroll/config.toml`).  Unknown keys are ignored and bad
//! values fall back to their defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::session::ScrollTuning;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the reader view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    StepUp,
    StepDown,
    PageUp,
    PageDown,
    Home,
    End,
    PrevChapter,
    NextChapter,
    QuickJump,
    PickBook,
    PickChapter,
    CopyVerse,
    ToggleTheme,
    FontLarger,
    FontSmaller,
    ToggleSerif,
    ToggleAudio,
    ToggleFocus,
    OpenSettings,
    OpenHelp,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the help popup).
    pub const ALL: &[Action] = &[
        Action::StepUp,
        Action::StepDown,
        Action::PageUp,
        Action::PageDown,
        Action::Home,
        Action::End,
        Action::PrevChapter,
        Action::NextChapter,
        Action::QuickJump,
        Action::PickBook,
        Action::PickChapter,
        Action::CopyVerse,
        Action::ToggleTheme,
        Action::FontLarger,
        Action::FontSmaller,
        Action::ToggleSerif,
        Action::ToggleAudio,
        Action::ToggleFocus,
        Action::OpenSettings,
        Action::OpenHelp,
        Action::Quit,
    ];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::StepUp => "Previous verse",
            Action::StepDown => "Next verse",
            Action::PageUp => "Back 5 verses",
            Action::PageDown => "Forward 5 verses",
            Action::Home => "First verse",
            Action::End => "Last verse",
            Action::PrevChapter => "Previous chapter",
            Action::NextChapter => "Next chapter",
            Action::QuickJump => "Quick jump",
            Action::PickBook => "Choose book",
            Action::PickChapter => "Choose chapter",
            Action::CopyVerse => "Copy verse",
            Action::ToggleTheme => "Light / dark theme",
            Action::FontLarger => "Larger text",
            Action::FontSmaller => "Smaller text",
            Action::ToggleSerif => "Serif style",
            Action::ToggleAudio => "Audio tick",
            Action::ToggleFocus => "Focus mode",
            Action::OpenSettings => "Settings",
            Action::OpenHelp => "Help",
            Action::Quit => "Quit",
        }
    }

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::StepUp => "step_up",
            Action::StepDown => "step_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::Home => "home",
            Action::End => "end",
            Action::PrevChapter => "prev_chapter",
            Action::NextChapter => "next_chapter",
            Action::QuickJump => "quick_jump",
            Action::PickBook => "pick_book",
            Action::PickChapter => "pick_chapter",
            Action::CopyVerse => "copy_verse",
            Action::ToggleTheme => "toggle_theme",
            Action::FontLarger => "font_larger",
            Action::FontSmaller => "font_smaller",
            Action::ToggleSerif => "toggle_serif",
            Action::ToggleAudio => "toggle_audio",
            Action::ToggleFocus => "toggle_focus",
            Action::OpenSettings => "open_settings",
            Action::OpenHelp => "open_help",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding — key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT are
    /// compared.  For printable characters SHIFT is already part of the
    /// character (`+`, `?`) and is ignored.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = match event.code {
            KeyCode::Char(_) => KeyModifiers::CONTROL | KeyModifiers::ALT,
            _ => KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT,
        };
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// User-friendly display string (e.g. `"Ctrl+c"`, `"↑"`, `"q"`).
    pub fn display(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            KeyCode::Backspace => "Bksp".into(),
            KeyCode::Delete => "Del".into(),
            other => key_name(other),
        });
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"PageUp"`, `"q"`, `"Space"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        // A bare "+" is the plus key, not a modifier separator.
        let (mods, key_part) = match s.strip_suffix("++") {
            Some(prefix) => (prefix, "+"),
            None if s == "+" => ("", "+"),
            None => match s.rsplit_once('+') {
                Some((m, k)) => (m, k),
                None => ("", s),
            },
        };

        for part in mods.split('+').filter(|p| !p.is_empty()) {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" | "bksp" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            s if s.starts_with('f') && s.len() > 1 => {
                let n: u8 = s[1..].parse().ok()?;
                KeyCode::F(n)
            }
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

fn modifier_prefix(modifiers: KeyModifiers) -> String {
    let mut s = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        s.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        s.push_str("Alt+");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        s.push_str("Shift+");
    }
    s
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".into(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration — keybindings and scroll tunables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Quiet time before the cursor follows the scroll position.
    pub update_window_ms: u64,
    /// Quiet time before a snap is evaluated.
    pub settle_window_ms: u64,
    /// How long a programmatic scroll suppresses snapping.  Always longer
    /// than `settle_window_ms`.
    pub programmatic_scroll_ms: u64,
    /// Misalignment (rows) tolerated without a snap.
    pub snap_threshold: f64,
    /// Rows moved per mouse-wheel notch.
    pub wheel_rows: u16,
    /// Minimum horizontal drag that counts as a chapter swipe.
    pub swipe_columns: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            update_window_ms: 50,
            settle_window_ms: 150,
            programmatic_scroll_ms: 500,
            snap_threshold: 0.5,
            wheel_rows: 3,
            swipe_columns: 12,
        }
    }
}

impl AppConfig {
    /// Hard-coded defaults.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let ctrl = KeyModifiers::CONTROL;
        let bind = KeyBind::new;
        let mut m = HashMap::new();

        m.insert(Action::StepUp, vec![bind(Up, n), bind(Char('k'), n)]);
        m.insert(Action::StepDown, vec![bind(Down, n), bind(Char('j'), n)]);
        m.insert(Action::PageUp, vec![bind(PageUp, n)]);
        m.insert(Action::PageDown, vec![bind(PageDown, n)]);
        m.insert(Action::Home, vec![bind(Home, n)]);
        m.insert(Action::End, vec![bind(End, n)]);
        m.insert(Action::PrevChapter, vec![bind(Char('['), n), bind(Left, n)]);
        m.insert(Action::NextChapter, vec![bind(Char(']'), n), bind(Right, n)]);
        m.insert(Action::QuickJump, vec![bind(Char('/'), n)]);
        m.insert(Action::PickBook, vec![bind(Char('b'), n)]);
        m.insert(Action::PickChapter, vec![bind(Char('c'), n)]);
        m.insert(Action::CopyVerse, vec![bind(Char('y'), n)]);
        m.insert(Action::ToggleTheme, vec![bind(Char('t'), n)]);
        m.insert(Action::FontLarger, vec![bind(Char('+'), n), bind(Char('='), n)]);
        m.insert(Action::FontSmaller, vec![bind(Char('-'), n)]);
        m.insert(Action::ToggleSerif, vec![bind(Char('s'), n)]);
        m.insert(Action::ToggleAudio, vec![bind(Char('a'), n)]);
        m.insert(Action::ToggleFocus, vec![bind(Char('f'), n), bind(Char(' '), n)]);
        m.insert(Action::OpenSettings, vec![bind(Char('?'), n)]);
        m.insert(Action::OpenHelp, vec![bind(Char('i'), n)]);
        m.insert(Action::Quit, vec![bind(Char('q'), n), bind(Char('c'), ctrl)]);

        m
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Format the binding list for a given action (e.g. `"↑/k"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    /// Short display of the first binding only (for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}: jump | {}/{}: chapter | {}: focus | {}: settings | {}: help",
            self.short_binding(Action::QuickJump),
            self.short_binding(Action::PrevChapter),
            self.short_binding(Action::NextChapter),
            self.short_binding(Action::ToggleFocus),
            self.short_binding(Action::OpenSettings),
            self.short_binding(Action::OpenHelp),
        )
    }

    /// Timing knobs for the reading session.
    pub fn tuning(&self) -> ScrollTuning {
        ScrollTuning {
            update_window: Duration::from_millis(self.update_window_ms),
            settle_window: Duration::from_millis(self.settle_window_ms),
            programmatic_hold: Duration::from_millis(self.programmatic_scroll_ms),
            snap_threshold: self.snap_threshold,
        }
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(err) => {
                if path.exists() {
                    tracing::warn!("cannot read {}: {err}; using defaults", path.display());
                }
                Self::default()
            }
        }
    }

    fn parse(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            // Scroll tunables.
            match key {
                "update_window_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.update_window_ms = v.clamp(10, 1000);
                    }
                    continue;
                }
                "settle_window_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.settle_window_ms = v.clamp(20, 2000);
                    }
                    continue;
                }
                "programmatic_scroll_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.programmatic_scroll_ms = v.clamp(50, 5000);
                    }
                    continue;
                }
                "snap_threshold" => {
                    if let Ok(v) = value.parse::<f64>() {
                        if v.is_finite() {
                            config.snap_threshold = v.clamp(0.0, 10.0);
                        }
                    }
                    continue;
                }
                "wheel_rows" => {
                    if let Ok(v) = value.parse::<u16>() {
                        config.wheel_rows = v.clamp(1, 20);
                    }
                    continue;
                }
                "swipe_columns" => {
                    if let Ok(v) = value.parse::<u16>() {
                        config.swipe_columns = v.clamp(2, 80);
                    }
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                continue;
            };

            let mut parsed = Vec::new();
            for part in value.split(',') {
                let part = part.trim().trim_matches('"');
                if let Some(bind) = KeyBind::parse(part) {
                    parsed.push(bind);
                }
            }
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        // The programmatic hold must outlive the settle window or a snap
        // could fire against an animation still in flight.
        if config.programmatic_scroll_ms <= config.settle_window_ms {
            tracing::warn!(
                "programmatic_scroll_ms ({}) must exceed settle_window_ms ({}); adjusting",
                config.programmatic_scroll_ms,
                config.settle_window_ms
            );
            config.programmatic_scroll_ms = config.settle_window_ms * 2;
        }
        if config.update_window_ms >= config.settle_window_ms {
            config.update_window_ms = config.settle_window_ms / 3;
        }

        config
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/tiny-scroll/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join(env!("CARGO_PKG_NAME")).join("config.toml")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn defaults_match_reader_keys() {
        let c = AppConfig::default();
        let none = KeyModifiers::NONE;
        assert_eq!(c.match_key(key(KeyCode::Down, none)), Some(Action::StepDown));
        assert_eq!(c.match_key(key(KeyCode::PageUp, none)), Some(Action::PageUp));
        assert_eq!(c.match_key(key(KeyCode::Char(' '), none)), Some(Action::ToggleFocus));
        assert_eq!(c.match_key(key(KeyCode::Char('c'), none)), Some(Action::PickChapter));
        assert_eq!(
            c.match_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        // Terminals report `+` and `?` with SHIFT held.
        assert_eq!(
            c.match_key(key(KeyCode::Char('+'), KeyModifiers::SHIFT)),
            Some(Action::FontLarger)
        );
        assert_eq!(
            c.match_key(key(KeyCode::Char('?'), KeyModifiers::SHIFT)),
            Some(Action::OpenSettings)
        );
    }

    #[test]
    fn parses_bindings_and_tunables() {
        let c = AppConfig::parse(
            "# comment\n\
             step_down = n, Ctrl+Down\n\
             font_larger = +\n\
             settle_window_ms = 200\n\
             programmatic_scroll_ms = 600\n\
             snap_threshold = 1.5\n\
             wheel_rows = abc\n\
             nonsense = 1\n",
        );
        assert_eq!(
            c.bindings[&Action::StepDown],
            vec![
                KeyBind::new(KeyCode::Char('n'), KeyModifiers::NONE),
                KeyBind::new(KeyCode::Down, KeyModifiers::CONTROL),
            ]
        );
        assert_eq!(
            c.bindings[&Action::FontLarger],
            vec![KeyBind::new(KeyCode::Char('+'), KeyModifiers::NONE)]
        );
        let t = c.tuning();
        assert_eq!(t.settle_window, Duration::from_millis(200));
        assert_eq!(t.programmatic_hold, Duration::from_millis(600));
        assert_eq!(t.snap_threshold, 1.5);
        assert_eq!(c.wheel_rows, 3);
    }

    #[test]
    fn hold_is_forced_above_settle_window() {
        let c = AppConfig::parse("settle_window_ms = 400\nprogrammatic_scroll_ms = 300\n");
        assert!(c.programmatic_scroll_ms > c.settle_window_ms);
        assert!(c.update_window_ms < c.settle_window_ms);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let c = AppConfig::load_from(&dir.path().join("nope.toml"));
        assert_eq!(c.tuning(), ScrollTuning::default());
    }

    #[test]
    fn display_strings() {
        let c = AppConfig::default();
        assert_eq!(c.display_bindings(Action::StepUp), "↑/k");
        assert_eq!(c.display_bindings(Action::Quit), "q/Ctrl+c");
        assert_eq!(c.display_bindings(Action::ToggleFocus), "f/Space");
    }
}

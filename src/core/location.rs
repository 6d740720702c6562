//! Addressable location state — `?t=<translation>&v=<index>&theme=<mode>`.
//!
//! Parsed once at boot (from `--location`) and replaced, never pushed, on
//! every settled cursor change and theme toggle.

use std::fmt;

use super::context::ThemeMode;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub translation: Option<String>,
    /// Raw flattened index; callers clamp against the loaded document.
    pub index: Option<i64>,
    pub theme: Option<ThemeMode>,
}

impl Location {
    pub fn new(translation: &str, index: usize, theme: ThemeMode) -> Self {
        Self {
            translation: Some(translation.to_string()),
            index: Some(index as i64),
            theme: Some(theme),
        }
    }

    /// Lenient parse: unknown keys are ignored, malformed values dropped.
    /// Accepts a leading `?` and a full `path?query` form.
    pub fn parse(input: &str) -> Self {
        let query = input.split_once('?').map_or(input, |(_, q)| q);
        let mut loc = Self::default();
        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = decode(value);
            match key {
                "t" if !value.is_empty() => loc.translation = Some(value),
                "v" => loc.index = value.trim().parse::<i64>().ok(),
                "theme" => loc.theme = ThemeMode::parse(&value),
                _ => {}
            }
        }
        loc
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(t) = &self.translation {
            parts.push(format!("t={}", encode(t)));
        }
        if let Some(v) = self.index {
            parts.push(format!("v={v}"));
        }
        if let Some(theme) = self.theme {
            parts.push(format!("theme={theme}"));
        }
        write!(f, "?{}", parts.join("&"))
    }
}

/// Form-style decode; a malformed escape keeps the raw text.
fn decode(s: &str) -> String {
    let spaced = s.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

// ───────────────────────────────────────── address bar ───────

/// Single-entry location history that only supports replacement.
#[derive(Debug, Clone, Default)]
pub struct AddressBar {
    current: Option<Location>,
    replacements: u64,
}

impl AddressBar {
    /// Replace the current entry.  Returns `false` (and counts nothing) when
    /// the location is unchanged.
    pub fn replace(&mut self, location: Location) -> bool {
        if self.current.as_ref() == Some(&location) {
            return false;
        }
        self.current = Some(location);
        self.replacements += 1;
        true
    }

    pub fn current(&self) -> Option<&Location> {
        self.current.as_ref()
    }

    /// Monotonic count of effective replacements; lets the UI notice changes.
    pub fn replacements(&self) -> u64 {
        self.replacements
    }
}

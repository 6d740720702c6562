//! Startup resolution — which translation, index and theme to open with.
//!
//! Location parameters win over stored values, stored values over defaults.
//! Anything invalid is treated as absent.

use chrono::{DateTime, Utc};

use crate::core::context::ThemeMode;
use crate::core::location::Location;
use crate::core::position::{continue_offer, ReadingPosition};
use crate::store::{keys, KeyValueStore};

use super::loader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boot {
    /// Canonical catalog id.
    pub translation: &'static str,
    /// Raw start index; clamped once the document is known.  `None` → 0.
    pub index: Option<i64>,
    pub theme: ThemeMode,
    /// Saved position worth offering, read before anything overwrites it.
    pub offer: Option<ReadingPosition>,
}

pub fn resolve(location: &Location, store: &dyn KeyValueStore, now: DateTime<Utc>) -> Boot {
    let translation = location
        .translation
        .as_deref()
        .and_then(loader::find)
        .or_else(|| store.get(keys::TRANSLATION).as_deref().and_then(loader::find))
        .map_or(loader::DEFAULT_TRANSLATION, |t| t.id);

    let theme = location
        .theme
        .or_else(|| store.get(keys::THEME).as_deref().and_then(ThemeMode::parse))
        .unwrap_or_default();

    let index = location.index;
    let start = index.unwrap_or(0);
    // Opening exactly where the saved position points needs no prompt.
    let offer = continue_offer(store, now)
        .filter(|p| p.translation != translation || p.index as i64 != start);

    tracing::info!(
        "boot: translation={translation} index={index:?} theme={theme} offer={}",
        offer.as_ref().map_or("none".to_string(), ReadingPosition::label)
    );
    Boot {
        translation,
        index,
        theme,
        offer,
    }
}

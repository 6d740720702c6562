//! Persisted reading position and the "continue reading" offer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{keys, KeyValueStore};

use super::flatten::Unit;

/// How long a saved position stays worth offering.
pub const CONTINUE_WINDOW_DAYS: i64 = 7;

/// Stored under [`keys::LAST_POSITION`] as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPosition {
    pub translation: String,
    pub book_name: String,
    pub chapter: usize,
    /// `None` when the position is a chapter heading.
    pub verse: Option<usize>,
    pub index: usize,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ReadingPosition {
    pub fn from_unit(translation: &str, index: usize, unit: &Unit, at: DateTime<Utc>) -> Self {
        Self {
            translation: translation.to_string(),
            book_name: unit.book_name().to_string(),
            chapter: unit.chapter_number(),
            verse: unit.verse_number(),
            index,
            timestamp: at.timestamp_millis(),
        }
    }

    /// Read the stored position.  Corrupt JSON is treated as absent.
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        let raw = store.get(keys::LAST_POSITION)?;
        match serde_json::from_str(&raw) {
            Ok(pos) => Some(pos),
            Err(err) => {
                tracing::debug!("ignoring unreadable reading position: {err}");
                None
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => store.set(keys::LAST_POSITION, &json),
            Err(err) => tracing::warn!("cannot encode reading position: {err}"),
        }
    }

    pub fn forget(store: &mut dyn KeyValueStore) {
        store.remove(keys::LAST_POSITION);
    }

    /// Younger than [`CONTINUE_WINDOW_DAYS`] at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let age_ms = now.timestamp_millis().saturating_sub(self.timestamp);
        age_ms < Duration::days(CONTINUE_WINDOW_DAYS).num_milliseconds()
    }

    /// `"John 3:16"`, or `"John 3"` for a heading.
    pub fn label(&self) -> String {
        match self.verse {
            Some(v) => format!("{} {}:{}", self.book_name, self.chapter, v),
            None => format!("{} {}", self.book_name, self.chapter),
        }
    }
}

/// The stored position, if it is recent enough to offer.
pub fn continue_offer(store: &dyn KeyValueStore, now: DateTime<Utc>) -> Option<ReadingPosition> {
    ReadingPosition::load(store).filter(|p| p.is_fresh(now))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::store::MemoryStore;

    fn position(timestamp: i64) -> ReadingPosition {
        ReadingPosition {
            translation: "KJV".into(),
            book_name: "John".into(),
            chapter: 3,
            verse: Some(16),
            index: 26_150,
            timestamp,
        }
    }

    #[test]
    fn positions_older_than_a_week_are_not_offered() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let mut store = MemoryStore::default();

        position((now - Duration::days(8)).timestamp_millis()).save(&mut store);
        assert_eq!(continue_offer(&store, now), None);

        let recent = position((now - Duration::days(6)).timestamp_millis());
        recent.save(&mut store);
        assert_eq!(continue_offer(&store, now), Some(recent));
    }

    #[test]
    fn stored_json_uses_the_documented_field_names() {
        let json = serde_json::to_value(position(1)).unwrap();
        assert_eq!(json["bookName"], "John");
        assert_eq!(json["verse"], 16);
        assert_eq!(json["timestamp"], 1);
    }

    #[test]
    fn corrupt_position_is_ignored() {
        let mut store = MemoryStore::default();
        store.set(keys::LAST_POSITION, "{\"translation\": 3");
        assert_eq!(ReadingPosition::load(&store), None);
    }

    #[test]
    fn heading_positions_have_no_verse() {
        let p = ReadingPosition {
            verse: None,
            ..position(0)
        };
        assert_eq!(p.label(), "John 3");
        assert_eq!(position(0).label(), "John 3:16");
    }
}

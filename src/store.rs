//! Key-value persistence for preferences and the last reading position.
//!
//! The reader only needs `get`/`set`/`remove` over strings.  [`FileStore`]
//! keeps everything in one JSON object at
//! `$XDG_DATA_HOME/tiny-scroll/state.json` (default
//! `~/.local/share/tiny-scroll/state.json`) and writes through on every
//! change.  Write failures are logged, never surfaced.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub mod keys {
    pub const TRANSLATION: &str = "translation";
    pub const THEME: &str = "theme";
    pub const FONT_SIZE: &str = "fontSize";
    pub const SERIF_FONT: &str = "useSerifFont";
    pub const AUDIO_ENABLED: &str = "audioEnabled";
    pub const LAST_POSITION: &str = "lastReadingPosition";
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

// ───────────────────────────────────────── memory ────────────

/// Volatile store; also the fallback when no data directory is usable.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    /// Number of `set`/`remove` calls seen so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.writes += 1;
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.writes += 1;
        self.entries.remove(key);
    }
}

// ───────────────────────────────────────── file ──────────────

/// JSON-file backed store with write-through.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`.  A missing or corrupt file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!("discarding corrupt state file {}: {err}", path.display());
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    /// Open the store at its default location.
    pub fn open_default() -> Self {
        Self::open(default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }

    fn flush_logged(&self) {
        if let Err(err) = self.flush() {
            tracing::warn!("cannot write {}: {err:#}", self.path.display());
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return;
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.flush_logged();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush_logged();
        }
    }
}

/// `$XDG_DATA_HOME/tiny-scroll/state.json`.
fn default_path() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".local").join("share")
        });
    data_dir.join(env!("CARGO_PKG_NAME")).join("state.json")
}

//! Translation catalog and background loading.
//!
//! Parsing a full translation takes long enough to stall a frame, so loads
//! run on the blocking pool and report back over a channel.  Every request
//! carries a generation; results for superseded requests are dropped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::document::{Document, LoadError};

/// One known translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationInfo {
    pub id: &'static str,
    pub file: &'static str,
    pub name: &'static str,
}

pub const TRANSLATIONS: &[TranslationInfo] = &[
    TranslationInfo {
        id: "KJV",
        file: "kjv.json",
        name: "King James Version",
    },
    TranslationInfo {
        id: "WEB",
        file: "web.json",
        name: "World English Bible",
    },
    TranslationInfo {
        id: "ASV",
        file: "asv.json",
        name: "American Standard Version",
    },
    TranslationInfo {
        id: "BBE",
        file: "bbe.json",
        name: "Bible in Basic English",
    },
];

pub const DEFAULT_TRANSLATION: &str = "KJV";

/// Catalog lookup, case-insensitive.
pub fn find(id: &str) -> Option<&'static TranslationInfo> {
    TRANSLATIONS.iter().find(|t| t.id.eq_ignore_ascii_case(id.trim()))
}

/// The translation after `id` in catalog order, wrapping around.
pub fn next_after(id: &str) -> &'static TranslationInfo {
    let idx = TRANSLATIONS
        .iter()
        .position(|t| t.id.eq_ignore_ascii_case(id))
        .map_or(0, |i| (i + 1) % TRANSLATIONS.len());
    &TRANSLATIONS[idx]
}

/// Synchronously load translation `id` from `data_dir`.
pub fn load_translation(data_dir: &Path, id: &str) -> Result<Document, LoadError> {
    let info = find(id).ok_or_else(|| LoadError::UnknownTranslation(id.to_string()))?;
    Document::load(&data_dir.join(info.file))
}

pub struct LoadUpdate {
    generation: u64,
    id: String,
    result: Result<Arc<Document>, LoadError>,
}

/// Issues loads, caches finished documents for the session and filters
/// stale results.
pub struct Loader {
    data_dir: PathBuf,
    tx: mpsc::UnboundedSender<LoadUpdate>,
    generation: u64,
    cache: HashMap<&'static str, Arc<Document>>,
}

impl Loader {
    pub fn new(data_dir: PathBuf, tx: mpsc::UnboundedSender<LoadUpdate>) -> Self {
        Self {
            data_dir,
            tx,
            generation: 0,
            cache: HashMap::new(),
        }
    }

    /// Request translation `id`.  A cached document is returned at once;
    /// otherwise a background load starts and `None` is returned.  Unknown
    /// ids fail immediately.
    pub fn request(&mut self, id: &str) -> Result<Option<Arc<Document>>, LoadError> {
        let info = find(id).ok_or_else(|| LoadError::UnknownTranslation(id.to_string()))?;
        self.generation = self.generation.wrapping_add(1);
        if let Some(doc) = self.cache.get(info.id) {
            tracing::debug!("translation {} served from cache", info.id);
            return Ok(Some(Arc::clone(doc)));
        }

        let generation = self.generation;
        let data_dir = self.data_dir.clone();
        let tx = self.tx.clone();
        let id = info.id.to_string();
        tokio::task::spawn_blocking(move || {
            let started = std::time::Instant::now();
            let result = load_translation(&data_dir, &id).map(Arc::new);
            tracing::info!("loaded {id} in {:.2?} (ok: {})", started.elapsed(), result.is_ok());
            let _ = tx.send(LoadUpdate {
                generation,
                id,
                result,
            });
        });
        Ok(None)
    }

    /// Accept a finished load.  Returns `None` for superseded requests.
    pub fn accept(&mut self, update: LoadUpdate) -> Option<(String, Result<Arc<Document>, LoadError>)> {
        let LoadUpdate {
            generation,
            id,
            result,
        } = update;
        if let (Ok(doc), Some(info)) = (&result, find(&id)) {
            self.cache.insert(info.id, Arc::clone(doc));
        }
        if generation != self.generation {
            tracing::debug!("dropping stale load of {id}");
            return None;
        }
        Some((id, result))
    }
}

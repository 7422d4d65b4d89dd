//! Load-once cache of parsed source tables.
//!
//! A source file is read and parsed on first access and then shared through
//! an [`Arc`] for the rest of the process. Entries are never invalidated;
//! each request builds its own filtered view over the shared table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};

use viewer_core::error::Result;
use viewer_core::models::ObservationSet;
use viewer_data::reader::load_observations;

// ── SourceCache ───────────────────────────────────────────────────────────────

/// Parsed tables keyed by canonical file path.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use viewer_runtime::data_manager::SourceCache;
///
/// let set = SourceCache::global()
///     .get_or_load(Path::new("youtube_live_data_long.csv"))
///     .unwrap();
/// println!("channels: {:?}", set.channels());
/// ```
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: RwLock<HashMap<PathBuf, Arc<ObservationSet>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance.
    pub fn global() -> &'static SourceCache {
        static GLOBAL: OnceLock<SourceCache> = OnceLock::new();
        GLOBAL.get_or_init(SourceCache::new)
    }

    /// Return the cached table for `path`, loading it on first access.
    ///
    /// Load failures are returned as-is and leave no entry behind, so a later
    /// call retries.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<ObservationSet>> {
        self.get_or_load_with(path, load_observations)
    }

    /// Same as [`get_or_load`](Self::get_or_load) with a custom loader.
    pub fn get_or_load_with<F>(&self, path: &Path, load: F) -> Result<Arc<ObservationSet>>
    where
        F: FnOnce(&Path) -> Result<ObservationSet>,
    {
        let key = cache_key(path);

        if let Some(hit) = self.read_entries().get(&key) {
            tracing::debug!(path = %key.display(), "source cache hit");
            return Ok(Arc::clone(hit));
        }

        // Holding the write lock across the load keeps concurrent first
        // callers from parsing the same file twice.
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(hit) = entries.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let set = Arc::new(load(path)?);
        tracing::debug!(
            path = %key.display(),
            observations = set.len(),
            "source cache populated"
        );
        entries.insert(key, Arc::clone(&set));
        Ok(set)
    }

    /// `true` when `path` has already been loaded.
    pub fn contains(&self, path: &Path) -> bool {
        self.read_entries().contains_key(&cache_key(path))
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, HashMap<PathBuf, Arc<ObservationSet>>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Canonical path when the file exists, the path as given otherwise.
fn cache_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Process-wide read-through cache of flat-file collections.
//!
//! # Responsibility
//! - Serve repeated reads of one collection file without re-decoding it.
//!
//! # Invariants
//! - Keyed by the collection's file path; created lazily on first access.
//! - Writers call [`invalidate`] synchronously after every successful write.
//! - Writes made by another process are not observed until invalidation.

use log::debug;
use once_cell::sync::Lazy;
use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

type Snapshot = Arc<dyn Any + Send + Sync>;

static SNAPSHOTS: Lazy<Mutex<HashMap<PathBuf, Snapshot>>> = Lazy::new(Default::default);

fn snapshots() -> MutexGuard<'static, HashMap<PathBuf, Snapshot>> {
    // A panic while holding the lock leaves the map itself consistent.
    SNAPSHOTS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Returns the cached collection for `path`, loading it on a miss.
///
/// The loader runs without the cache lock held; a failed load caches nothing.
pub fn read_through<T, E>(
    path: &Path,
    load: impl FnOnce() -> Result<Vec<T>, E>,
) -> Result<Vec<T>, E>
where
    T: Clone + Send + Sync + 'static,
{
    let cached = snapshots().get(path).cloned();
    if let Some(records) = cached
        .as_ref()
        .and_then(|snapshot| snapshot.downcast_ref::<Vec<T>>())
    {
        debug!(
            "event=snapshot_cache module=repo status=hit records={}",
            records.len()
        );
        return Ok(records.clone());
    }

    let records = load()?;
    debug!(
        "event=snapshot_cache module=repo status=miss records={}",
        records.len()
    );
    snapshots().insert(path.to_path_buf(), Arc::new(records.clone()));
    Ok(records)
}

/// Drops the cached collection for `path`.
pub fn invalidate(path: &Path) {
    snapshots().remove(path);
}

/// Whether a collection for `path` is currently cached.
pub fn is_cached(path: &Path) -> bool {
    snapshots().contains_key(path)
}

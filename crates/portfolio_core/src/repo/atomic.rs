//! Atomic file replacement for whole-collection rewrites.

use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes `data` to a temp file beside `path`, then renames it over `path`.
///
/// Readers observe either the previous content or the new content, never a
/// partially written file.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

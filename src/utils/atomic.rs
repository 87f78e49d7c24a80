//! Atomic file writes
//!
//! The metrics history is written to a `.tmp` sibling, synced, then renamed
//! over the final path, so a crash mid-write leaves either the old file or
//! the new one and never a truncated document.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Atomically write a file using a writer function
///
/// # Example
///
/// ```ignore
/// atomic_write_with("state/metrics-history.json", |writer| {
///     serde_json::to_writer(writer, &history).map_err(Into::into)
/// })?;
/// ```
pub fn atomic_write_with<P, F>(path: P, write_fn: F) -> io::Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let path = path.as_ref();
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(&temp_path)?);
    write_fn(&mut writer)?;
    writer.flush()?;

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;

    Ok(())
}

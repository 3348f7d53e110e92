//! Idempotent ZIP extraction.
//!
//! A target directory that already holds at least one entry counts as
//! extracted. This is what lets an interrupted build be rerun cheaply, but it
//! is not an integrity check: a directory left half-populated by a killed
//! process is treated as complete. Delete the directory to force a fresh
//! extraction.

use edgar_core::{EdgarError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use zip::ZipArchive;

/// Result of [`extract_if_empty`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// The target directory was already populated; nothing was written.
    Skipped,
    /// The archive was unpacked.
    Extracted {
        /// Number of files written.
        entries: usize,
    },
}

/// Returns true if `dir` exists and has at least one entry.
fn is_populated(dir: &Path) -> Result<bool> {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => Ok(entries.next().is_some()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(EdgarError::filesystem(dir, e)),
    }
}

/// Unpacks `archive` into `target` unless `target` already has entries.
///
/// Entry names are kept as file names. Entries whose names would resolve
/// outside `target` abort the extraction.
///
/// # Errors
/// Returns [`EdgarError::Archive`] if the archive cannot be read and
/// [`EdgarError::Filesystem`] if files cannot be written.
#[instrument(skip_all, fields(archive = %archive.display(), target = %target.display()))]
pub fn extract_if_empty(archive: &Path, target: &Path) -> Result<ExtractOutcome> {
    if is_populated(target)? {
        debug!("Target already populated, skipping extraction");
        return Ok(ExtractOutcome::Skipped);
    }

    std::fs::create_dir_all(target).map_err(|e| EdgarError::filesystem(target, e))?;

    let file = File::open(archive).map_err(|e| EdgarError::filesystem(archive, e))?;
    let mut zip = ZipArchive::new(BufReader::new(file))
        .map_err(|e| EdgarError::Archive(format!("{}: {}", archive.display(), e)))?;

    let mut entries = 0usize;
    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| EdgarError::Archive(format!("{}: {}", archive.display(), e)))?;

        let Some(relative) = entry.enclosed_name() else {
            return Err(EdgarError::Archive(format!(
                "{}: entry escapes target directory: {}",
                archive.display(),
                entry.name()
            )));
        };
        let out = target.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out).map_err(|e| EdgarError::filesystem(&out, e))?;
            continue;
        }

        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent).map_err(|e| EdgarError::filesystem(parent, e))?;
        }
        let mut writer = File::create(&out).map_err(|e| EdgarError::filesystem(&out, e))?;
        std::io::copy(&mut entry, &mut writer).map_err(|e| EdgarError::filesystem(&out, e))?;
        entries += 1;
    }

    info!(entries, "Archive extracted");
    Ok(ExtractOutcome::Extracted { entries })
}

/// Runs [`extract_if_empty`] on the blocking thread pool.
///
/// # Errors
/// Same as [`extract_if_empty`], plus [`EdgarError::Other`] if the blocking
/// task fails to complete.
pub async fn extract_if_empty_async(
    archive: impl Into<PathBuf>,
    target: impl Into<PathBuf>,
) -> Result<ExtractOutcome> {
    let archive = archive.into();
    let target = target.into();
    tokio::task::spawn_blocking(move || extract_if_empty(&archive, &target))
        .await
        .map_err(|e| EdgarError::Other(format!("Extraction task failed: {}", e)))?
}

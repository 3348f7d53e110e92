//! Build summary record and its persistence.
//!
//! A [`BuildSummary`] is written to `summary.json` at the end of every
//! successful build. Before the next build starts, the previous summary is
//! moved into `summaries/` under a name derived from its own
//! `build_timestamp`, so the directory accumulates one file per past build.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EdgarError, Result};
use crate::persist::{read_json, write_json};

/// Timestamp format used in rotated summary file names.
const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.6f";

/// Per-dataset statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Number of entries in the extraction directory.
    pub files: usize,
    /// Total bytes of the extracted files.
    #[serde(default)]
    pub size: u64,
    /// Size of the downloaded archive in bytes.
    pub zip_size: u64,
}

/// Statistics of the index scan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Records that contributed to the indices.
    pub records: usize,
    /// Records skipped because they could not be read or parsed.
    pub skipped: usize,
    /// Ticker entries in the merged index.
    pub tickers: usize,
    /// Company-name entries in the merged index.
    pub companies: usize,
}

/// Record describing one completed build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildSummary {
    /// Local time the build started.
    pub build_timestamp: NaiveDateTime,
    /// Local time the build finished.
    #[serde(default)]
    pub completed_timestamp: Option<NaiveDateTime>,
    /// Bytes of every file under the mirror root.
    pub total_size: u64,
    /// Company facts dataset.
    pub company_facts: DatasetSummary,
    /// Submissions dataset.
    pub submissions: DatasetSummary,
    /// Index scan statistics.
    #[serde(default)]
    pub index: IndexStats,
}

impl BuildSummary {
    /// File name this summary gets once rotated into `summaries/`.
    ///
    /// Colons are replaced so the name is valid on every platform.
    #[must_use]
    pub fn archived_file_name(&self) -> String {
        format!(
            "summary_{}.json",
            self.build_timestamp.format(FILE_TIMESTAMP_FORMAT)
        )
    }

    /// Loads a summary from disk.
    ///
    /// # Errors
    /// Returns an error if the file is missing or not a valid summary.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Persists this summary as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns [`EdgarError::Filesystem`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Moves the summary at `current` into `history_dir`, if there is one.
    ///
    /// Returns the new path of the rotated file, or `None` when no summary
    /// existed.
    ///
    /// # Errors
    /// Returns an error if the existing summary cannot be parsed or moved.
    pub fn rotate(current: &Path, history_dir: &Path) -> Result<Option<PathBuf>> {
        if !current.is_file() {
            return Ok(None);
        }

        let previous = Self::load(current)?;
        std::fs::create_dir_all(history_dir)
            .map_err(|e| EdgarError::filesystem(history_dir, e))?;

        let target = history_dir.join(previous.archived_file_name());
        std::fs::rename(current, &target).map_err(|e| EdgarError::filesystem(current, e))?;
        Ok(Some(target))
    }
}

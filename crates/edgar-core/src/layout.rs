//! On-disk layout of the mirror.
//!
//! Everything lives under a single root directory:
//!
//! ```text
//! <root>/
//!   company_facts.zip      company_facts/CIK##########.json
//!   submissions.zip        submissions/CIK##########.json
//!   ticker.json            company.json
//!   summary.json           summaries/summary_<timestamp>.json
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{EdgarError, Result};

/// One of the two bulk datasets mirrored from EDGAR.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    /// XBRL company facts (`companyfacts.zip`).
    CompanyFacts,
    /// Entity submission metadata (`submissions.zip`).
    Submissions,
}

impl Dataset {
    /// Both datasets, in build order.
    pub const ALL: [Self; 2] = [Self::CompanyFacts, Self::Submissions];

    /// Directory and archive stem used on disk.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CompanyFacts => "company_facts",
            Self::Submissions => "submissions",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paths of the mirror relative to its root directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Creates a layout rooted at `root`. Nothing is touched on disk.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the mirror.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Downloaded archive for a dataset.
    #[must_use]
    pub fn archive(&self, dataset: Dataset) -> PathBuf {
        self.root.join(format!("{}.zip", dataset.as_str()))
    }

    /// Extraction directory for a dataset.
    #[must_use]
    pub fn extract_dir(&self, dataset: Dataset) -> PathBuf {
        self.root.join(dataset.as_str())
    }

    /// Directory holding rotated build summaries.
    #[must_use]
    pub fn summaries_dir(&self) -> PathBuf {
        self.root.join("summaries")
    }

    /// Current build summary.
    #[must_use]
    pub fn summary_file(&self) -> PathBuf {
        self.root.join("summary.json")
    }

    /// Persisted ticker index.
    #[must_use]
    pub fn ticker_index(&self) -> PathBuf {
        self.root.join("ticker.json")
    }

    /// Persisted company-name index.
    #[must_use]
    pub fn company_index(&self) -> PathBuf {
        self.root.join("company.json")
    }

    /// Creates the root and every managed subdirectory if missing.
    ///
    /// # Errors
    /// Returns [`EdgarError::Filesystem`] if a directory cannot be created.
    pub fn ensure_dirs(&self) -> Result<()> {
        let dirs = [
            self.root.clone(),
            self.extract_dir(Dataset::CompanyFacts),
            self.extract_dir(Dataset::Submissions),
            self.summaries_dir(),
        ];
        for dir in dirs {
            std::fs::create_dir_all(&dir).map_err(|e| EdgarError::filesystem(&dir, e))?;
        }
        Ok(())
    }
}

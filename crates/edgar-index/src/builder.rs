//! Chunked parallel scan and merge.
//!
//! The record files are split into contiguous chunks, one per worker. Each
//! worker parses its chunk on the blocking thread pool and returns a
//! [`PartialIndex`] it owns outright; nothing is shared while scanning. Once
//! every worker has joined, the partials are merged on the calling task in
//! chunk order.
//!
//! Paths are sorted before chunking, so when two records claim the same
//! ticker or name, the one from the lexicographically last path wins. The
//! outcome is therefore identical for any worker count.

use edgar_core::{Cik, DEFAULT_WORKERS, EdgarError, Result};
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::record::{DisplayNameField, EntityRecord};

/// Index fragment produced by one worker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartialIndex {
    /// Position of the chunk this fragment was built from.
    pub chunk: usize,
    /// Ticker → CIK entries seen in the chunk.
    pub tickers: BTreeMap<String, Cik>,
    /// Display name → CIK entries seen in the chunk.
    pub companies: BTreeMap<String, Cik>,
    /// Records parsed successfully.
    pub records: usize,
    /// Records skipped.
    pub skipped: usize,
}

impl PartialIndex {
    fn insert(&mut self, record: EntityRecord) {
        for ticker in record.tickers {
            self.tickers.insert(ticker, record.cik.clone());
        }
        self.companies.insert(record.name, record.cik);
        self.records += 1;
    }
}

/// Merged result of a full scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexBuild {
    /// Ticker → CIK.
    pub tickers: BTreeMap<String, Cik>,
    /// Display name → CIK.
    pub companies: BTreeMap<String, Cik>,
    /// Records that contributed.
    pub records: usize,
    /// Records skipped because they could not be read or parsed.
    pub skipped: usize,
}

impl IndexBuild {
    /// Folds a partial into this build. Entries of `partial` win.
    pub fn absorb(&mut self, partial: PartialIndex) {
        self.tickers.extend(partial.tickers);
        self.companies.extend(partial.companies);
        self.records += partial.records;
        self.skipped += partial.skipped;
    }
}

/// Splits `len` items into at most `workers` contiguous ranges.
///
/// Every range has `len / workers` items except the last, which absorbs the
/// remainder. With fewer items than workers a single range covers them all.
///
/// # Example
/// ```
/// use edgar_index::chunk_ranges;
///
/// assert_eq!(chunk_ranges(10, 3), vec![0..3, 3..6, 6..10]);
/// assert_eq!(chunk_ranges(2, 8), vec![0..2]);
/// ```
#[must_use]
pub fn chunk_ranges(len: usize, workers: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let workers = workers.max(1);
    let chunk_len = len / workers;
    if chunk_len == 0 {
        return vec![0..len];
    }

    (0..workers)
        .map(|i| {
            let start = i * chunk_len;
            let end = if i == workers - 1 { len } else { start + chunk_len };
            start..end
        })
        .collect()
}

/// Lists the `*.json` files directly inside `dir`, sorted by path.
///
/// # Errors
/// Returns [`EdgarError::Filesystem`] if the directory cannot be read.
pub fn collect_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| EdgarError::filesystem(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| EdgarError::filesystem(dir, e))?.path();
        if path.extension().is_some_and(|ext| ext == "json") && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Builds ticker and company-name indices from entity record files.
#[derive(Clone, Debug)]
pub struct IndexBuilder {
    field: DisplayNameField,
    workers: usize,
}

impl IndexBuilder {
    /// Create a builder reading display names from `field`.
    #[must_use]
    pub const fn new(field: DisplayNameField) -> Self {
        Self {
            field,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Set the number of parallel workers. Zero is treated as one.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Number of parallel workers.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Parses every file in `paths` and returns the merged indices.
    ///
    /// Unreadable or malformed files are skipped and counted in
    /// [`IndexBuild::skipped`].
    ///
    /// # Errors
    /// Returns [`EdgarError::Other`] if a worker task panics.
    #[instrument(skip_all, fields(files = paths.len(), workers = self.workers, field = %self.field))]
    pub async fn build(&self, mut paths: Vec<PathBuf>) -> Result<IndexBuild> {
        paths.sort();
        let paths: Arc<[PathBuf]> = paths.into();

        let mut workers = JoinSet::new();
        for (chunk, range) in chunk_ranges(paths.len(), self.workers).into_iter().enumerate() {
            let paths = Arc::clone(&paths);
            let field = self.field;
            workers.spawn_blocking(move || scan_chunk(chunk, &paths[range], field));
        }

        let mut partials = Vec::with_capacity(self.workers);
        while let Some(joined) = workers.join_next().await {
            let partial =
                joined.map_err(|e| EdgarError::Other(format!("Index worker failed: {}", e)))?;
            debug!(
                chunk = partial.chunk,
                records = partial.records,
                skipped = partial.skipped,
                "Index worker finished"
            );
            partials.push(partial);
        }

        partials.sort_by_key(|p| p.chunk);
        let mut build = IndexBuild::default();
        for partial in partials {
            build.absorb(partial);
        }

        if build.skipped > 0 {
            warn!(skipped = build.skipped, "Skipped unreadable records");
        }
        info!(
            records = build.records,
            tickers = build.tickers.len(),
            companies = build.companies.len(),
            "Index scan complete"
        );
        Ok(build)
    }
}

/// Parses one chunk of record files.
///
/// Runs synchronously; [`IndexBuilder::build`] calls it from blocking tasks.
#[must_use]
pub fn scan_chunk(chunk: usize, paths: &[PathBuf], field: DisplayNameField) -> PartialIndex {
    let mut partial = PartialIndex {
        chunk,
        ..Default::default()
    };

    for path in paths {
        match EntityRecord::read(path, field) {
            Ok(record) => partial.insert(record),
            Err(e) => {
                debug!(error = %e, "Skipping record");
                partial.skipped += 1;
            }
        }
    }

    partial
}

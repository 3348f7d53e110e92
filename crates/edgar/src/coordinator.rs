//! Build orchestration and lookups over a mirror directory.

use chrono::Local;
use edgar_archive::{ArchiveSource, HttpArchiveSource, extract_if_empty_async};
use edgar_core::{
    BuildSummary, Cik, DataLayout, Dataset, DatasetSummary, EdgarConfig, EdgarError, IndexStats,
    Result,
};
use edgar_index::{DisplayNameField, IndexBuilder, LookupStore, collect_json_files};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::facts::EntityFacts;

/// A local mirror of the EDGAR bulk datasets.
///
/// Owns the lookup store for the lifetime of the value. Builds take
/// `&mut self`, so lookups cannot observe a half-merged store.
///
/// # Example
///
/// ```rust,ignore
/// use edgar::{EdgarConfig, EdgarMirror};
///
/// let mut mirror = EdgarMirror::open(
///     EdgarConfig::new("/data/edgar").with_user_agent("MyApp/1.0 (me@example.com)"),
/// )?;
/// let summary = mirror.build().await?;
/// let cik = mirror.lookup_identifier(Some("AAPL"), None);
/// ```
#[derive(Debug)]
pub struct EdgarMirror {
    config: EdgarConfig,
    layout: DataLayout,
    source: Arc<dyn ArchiveSource>,
    store: LookupStore,
}

impl EdgarMirror {
    /// Opens the mirror at `config.root`, downloading over HTTP.
    ///
    /// Creates the directory layout if it does not exist yet and loads any
    /// persisted indices.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, or the directories
    /// or a persisted index cannot be read.
    pub fn open(config: EdgarConfig) -> Result<Self> {
        config.validate()?;
        let source = HttpArchiveSource::new(&config.user_agent)?;
        Self::with_source(config, Arc::new(source))
    }

    /// Opens the mirror with a custom archive source.
    ///
    /// A corrupt `ticker.json` or `company.json` is logged and read as empty,
    /// so the next build can replace it.
    ///
    /// # Errors
    /// Same as [`EdgarMirror::open`].
    pub fn with_source(config: EdgarConfig, source: Arc<dyn ArchiveSource>) -> Result<Self> {
        config.validate()?;
        let layout = config.layout();
        layout.ensure_dirs()?;
        let store = LookupStore::open_or_empty(&layout)?;

        debug!(
            root = %layout.root().display(),
            source = source.name(),
            "Mirror opened"
        );
        Ok(Self {
            config,
            layout,
            source,
            store,
        })
    }

    /// Configuration the mirror was opened with.
    #[must_use]
    pub const fn config(&self) -> &EdgarConfig {
        &self.config
    }

    /// On-disk layout.
    #[must_use]
    pub const fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Current lookup store.
    #[must_use]
    pub const fn store(&self) -> &LookupStore {
        &self.store
    }

    /// Resolves a ticker or company name to a CIK. The ticker is tried first.
    #[must_use]
    pub fn lookup_identifier(&self, ticker: Option<&str>, company: Option<&str>) -> Option<&Cik> {
        self.store.lookup_identifier(ticker, company)
    }

    /// Resolves a free-form query: a ticker, then a company name, then a raw
    /// CIK.
    ///
    /// # Errors
    /// Returns [`EdgarError::NotFound`] if nothing matches.
    pub fn resolve(&self, query: &str) -> Result<Cik> {
        if let Some(cik) = self.store.lookup_identifier(Some(query), Some(query)) {
            return Ok(cik.clone());
        }
        Cik::new(query).map_err(|_| {
            EdgarError::NotFound(format!("No ticker, company or CIK matches {:?}", query))
        })
    }

    /// Reads the facts document of one entity.
    ///
    /// An explicit `identifier` wins; otherwise the ticker and then the
    /// company name are resolved through the store.
    ///
    /// # Errors
    /// Returns [`EdgarError::InvalidParameter`] for a malformed identifier,
    /// [`EdgarError::NotFound`] if nothing resolves or the entity has no
    /// facts file, and [`EdgarError::Parse`] if the file is not valid JSON.
    pub fn entity_facts(
        &self,
        identifier: Option<&str>,
        ticker: Option<&str>,
        company: Option<&str>,
    ) -> Result<EntityFacts> {
        let cik = match identifier {
            Some(raw) => Cik::new(raw)?,
            None => self
                .store
                .lookup_identifier(ticker, company)
                .cloned()
                .ok_or_else(|| {
                    EdgarError::NotFound(
                        "No valid cik, ticker, or company name supplied".to_string(),
                    )
                })?,
        };

        let path = self.facts_path(&cik);
        if !path.is_file() {
            return Err(EdgarError::NotFound(format!(
                "No facts file for CIK {}: {}",
                cik,
                path.display()
            )));
        }
        EntityFacts::read(&path)
    }

    /// Location of an entity's facts document.
    #[must_use]
    pub fn facts_path(&self, cik: &Cik) -> PathBuf {
        self.layout
            .extract_dir(Dataset::CompanyFacts)
            .join(cik.file_name())
    }

    /// Summary of the last successful build, if any.
    ///
    /// # Errors
    /// Returns [`EdgarError::Parse`] if `summary.json` exists but is invalid.
    pub fn current_summary(&self) -> Result<Option<BuildSummary>> {
        let path = self.layout.summary_file();
        if !path.is_file() {
            return Ok(None);
        }
        BuildSummary::load(&path).map(Some)
    }

    /// Rotated summaries of earlier builds, oldest first.
    ///
    /// # Errors
    /// Returns [`EdgarError::Filesystem`] if `summaries/` cannot be listed.
    pub fn history(&self) -> Result<Vec<PathBuf>> {
        let dir = self.layout.summaries_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        collect_json_files(&dir)
    }

    /// Downloads both archives, extracts them, rebuilds the indices and
    /// writes a new summary.
    ///
    /// A single attempt is made for each archive. On failure the persisted
    /// indices and `summary.json` are left as they were.
    ///
    /// # Errors
    /// Propagates the first error of any step.
    pub async fn build(&mut self) -> Result<BuildSummary> {
        self.run(true).await
    }

    /// Rebuilds from archives already on disk, without fetching.
    ///
    /// # Errors
    /// Propagates the first error of any step.
    pub async fn build_local(&mut self) -> Result<BuildSummary> {
        self.run(false).await
    }

    #[instrument(skip(self), fields(root = %self.layout.root().display(), source = self.source.name()))]
    async fn run(&mut self, fetch: bool) -> Result<BuildSummary> {
        let build_timestamp = Local::now().naive_local();
        self.layout.ensure_dirs()?;

        // The previous summary is rotated only once the new one is ready, but
        // it must parse before any work starts.
        let summary_file = self.layout.summary_file();
        if summary_file.is_file() {
            let previous = BuildSummary::load(&summary_file)?;
            debug!(previous = %previous.build_timestamp, "Found previous summary");
        }

        for dataset in Dataset::ALL {
            let archive = self.layout.archive(dataset);
            if fetch {
                let url = self.config.url(dataset);
                info!(%dataset, url, "Fetching archive");
                self.source.fetch(url, &archive).await?;
            }
            let outcome =
                extract_if_empty_async(&archive, self.layout.extract_dir(dataset)).await?;
            debug!(%dataset, ?outcome, "Extraction finished");
        }

        let submissions = self.layout.extract_dir(Dataset::Submissions);
        let paths = blocking(move || collect_json_files(&submissions)).await?;
        let build = IndexBuilder::new(DisplayNameField::Name)
            .with_workers(self.config.workers)
            .build(paths)
            .await?;
        let (records, skipped) = (build.records, build.skipped);

        let mut store = self.store.clone();
        store.merge(build);
        store.save()?;
        self.store = store;

        let layout = self.layout.clone();
        let (company_facts, submissions, total_size) = blocking(move || {
            Ok((
                dataset_summary(&layout, Dataset::CompanyFacts)?,
                dataset_summary(&layout, Dataset::Submissions)?,
                disk_usage(layout.root())?,
            ))
        })
        .await?;

        let summary = BuildSummary {
            build_timestamp,
            completed_timestamp: Some(Local::now().naive_local()),
            total_size,
            company_facts,
            submissions,
            index: IndexStats {
                records,
                skipped,
                tickers: self.store.tickers().len(),
                companies: self.store.companies().len(),
            },
        };

        if let Some(rotated) = BuildSummary::rotate(&summary_file, &self.layout.summaries_dir())? {
            info!(path = %rotated.display(), "Rotated previous summary");
        }
        summary.save(&summary_file)?;

        info!(records, skipped, total_size, "Build complete");
        Ok(summary)
    }
}

/// Runs filesystem work on the blocking thread pool.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| EdgarError::Other(format!("Blocking task failed: {}", e)))?
}

fn dataset_summary(layout: &DataLayout, dataset: Dataset) -> Result<DatasetSummary> {
    let dir = layout.extract_dir(dataset);
    let files = std::fs::read_dir(&dir)
        .map_err(|e| EdgarError::filesystem(&dir, e))?
        .count();

    let archive = layout.archive(dataset);
    let zip_size = match std::fs::metadata(&archive) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
        Err(e) => return Err(EdgarError::filesystem(&archive, e)),
    };

    Ok(DatasetSummary {
        files,
        size: disk_usage(&dir)?,
        zip_size,
    })
}

/// Total bytes of the regular files under `path`.
fn disk_usage(path: &Path) -> Result<u64> {
    let mut total = 0;
    for entry in WalkDir::new(path) {
        let entry = entry.map_err(|e| EdgarError::filesystem(path, e))?;
        if entry.file_type().is_file() {
            let meta = entry
                .metadata()
                .map_err(|e| EdgarError::filesystem(entry.path(), e))?;
            total += meta.len();
        }
    }
    Ok(total)
}

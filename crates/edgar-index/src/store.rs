//! Persisted lookup maps.

use edgar_core::persist::{StagedJson, read_json};
use edgar_core::{Cik, DataLayout, EdgarError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::builder::IndexBuild;

/// Ticker and company-name indices of a mirror.
///
/// The maps are read from disk when the store is opened and written back only
/// by [`LookupStore::save`]. A store must not be saved by two processes at
/// once.
#[derive(Clone, Debug)]
pub struct LookupStore {
    ticker_path: PathBuf,
    company_path: PathBuf,
    tickers: BTreeMap<String, Cik>,
    companies: BTreeMap<String, Cik>,
}

/// Loads one index file, treating a missing file as empty.
///
/// With `recover`, an unparsable file is also treated as empty.
fn load_map(path: &Path, recover: bool) -> Result<BTreeMap<String, Cik>> {
    if !path.is_file() {
        debug!(path = %path.display(), "No index file, starting empty");
        return Ok(BTreeMap::new());
    }
    match read_json(path) {
        Err(EdgarError::Parse(message)) if recover => {
            warn!(
                path = %path.display(),
                %message,
                "Index file is corrupt, starting empty until the next save"
            );
            Ok(BTreeMap::new())
        }
        loaded => loaded,
    }
}

impl LookupStore {
    /// Opens the store of the mirror described by `layout`.
    ///
    /// # Errors
    /// Returns an error if an existing index file cannot be read or parsed.
    pub fn open(layout: &DataLayout) -> Result<Self> {
        Self::load(layout, false)
    }

    /// Opens the store like [`LookupStore::open`], but starts a corrupt
    /// index file empty instead of failing. The file is replaced by the next
    /// [`LookupStore::save`].
    ///
    /// # Errors
    /// Returns [`EdgarError::Filesystem`] if an index file cannot be read.
    pub fn open_or_empty(layout: &DataLayout) -> Result<Self> {
        Self::load(layout, true)
    }

    #[instrument(skip(layout), fields(root = %layout.root().display()))]
    fn load(layout: &DataLayout, recover: bool) -> Result<Self> {
        let ticker_path = layout.ticker_index();
        let company_path = layout.company_index();
        let tickers = load_map(&ticker_path, recover)?;
        let companies = load_map(&company_path, recover)?;

        debug!(
            tickers = tickers.len(),
            companies = companies.len(),
            "Lookup store loaded"
        );
        Ok(Self {
            ticker_path,
            company_path,
            tickers,
            companies,
        })
    }

    /// Creates an empty store that will save into `layout`.
    #[must_use]
    pub fn empty(layout: &DataLayout) -> Self {
        Self {
            ticker_path: layout.ticker_index(),
            company_path: layout.company_index(),
            tickers: BTreeMap::new(),
            companies: BTreeMap::new(),
        }
    }

    /// Resolves an identifier, trying the ticker before the company name.
    #[must_use]
    pub fn lookup_identifier(&self, ticker: Option<&str>, company: Option<&str>) -> Option<&Cik> {
        ticker
            .and_then(|t| self.tickers.get(t))
            .or_else(|| company.and_then(|c| self.companies.get(c)))
    }

    /// CIK registered for a ticker.
    #[must_use]
    pub fn ticker(&self, ticker: &str) -> Option<&Cik> {
        self.tickers.get(ticker)
    }

    /// CIK registered for a company name.
    #[must_use]
    pub fn company(&self, name: &str) -> Option<&Cik> {
        self.companies.get(name)
    }

    /// Ticker → CIK map.
    #[must_use]
    pub const fn tickers(&self) -> &BTreeMap<String, Cik> {
        &self.tickers
    }

    /// Company name → CIK map.
    #[must_use]
    pub const fn companies(&self) -> &BTreeMap<String, Cik> {
        &self.companies
    }

    /// Returns true if both maps are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty() && self.companies.is_empty()
    }

    /// Merges a fresh build into the store. Entries of `build` win.
    pub fn merge(&mut self, build: IndexBuild) {
        self.tickers.extend(build.tickers);
        self.companies.extend(build.companies);
        info!(
            tickers = self.tickers.len(),
            companies = self.companies.len(),
            "Merged build into lookup store"
        );
    }

    /// Writes both maps as pretty-printed JSON, replacing the previous files.
    ///
    /// Both files are staged before either is moved into place, so a failed
    /// write leaves the previous pair untouched.
    ///
    /// # Errors
    /// Returns [`EdgarError::Filesystem`] if a file cannot be written.
    pub fn save(&self) -> Result<()> {
        let tickers = StagedJson::write(&self.ticker_path, &self.tickers)?;
        let companies = StagedJson::write(&self.company_path, &self.companies)?;
        tickers.commit()?;
        companies.commit()?;
        debug!("Lookup store saved");
        Ok(())
    }
}

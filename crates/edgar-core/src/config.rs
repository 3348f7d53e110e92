//! Build configuration.

use std::path::PathBuf;

use crate::error::{EdgarError, Result};
use crate::layout::{DataLayout, Dataset};

/// Bulk XBRL company facts archive.
pub const COMPANY_FACTS_URL: &str =
    "https://www.sec.gov/Archives/edgar/daily-index/xbrl/companyfacts.zip";

/// Bulk entity submissions archive.
pub const SUBMISSIONS_URL: &str =
    "https://www.sec.gov/Archives/edgar/daily-index/bulkdata/submissions.zip";

/// Default number of index workers.
pub const DEFAULT_WORKERS: usize = 8;

/// Default user agent. SEC rejects requests without an identifying agent.
pub const DEFAULT_USER_AGENT: &str =
    concat!("edgar-mirror/", env!("CARGO_PKG_VERSION"), " (contact@example.com)");

/// Configuration for building and reading a mirror.
///
/// # Example
/// ```
/// use edgar_core::EdgarConfig;
///
/// let config = EdgarConfig::new("/var/lib/edgar")
///     .with_user_agent("MyApp/1.0 (contact@example.com)")
///     .with_workers(16);
/// assert_eq!(config.workers, 16);
/// ```
#[derive(Clone, Debug)]
pub struct EdgarConfig {
    /// Root directory of the mirror.
    pub root: PathBuf,
    /// User agent sent with every archive request.
    pub user_agent: String,
    /// Location of the company facts archive.
    pub company_facts_url: String,
    /// Location of the submissions archive.
    pub submissions_url: String,
    /// Number of parallel index workers.
    pub workers: usize,
}

impl EdgarConfig {
    /// Creates a configuration with default endpoints rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            company_facts_url: COMPANY_FACTS_URL.to_string(),
            submissions_url: SUBMISSIONS_URL.to_string(),
            workers: DEFAULT_WORKERS,
        }
    }

    /// Sets the user agent.
    ///
    /// SEC asks for the form "AppName/Version (contact@email.com)".
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the number of index workers.
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Overrides the company facts archive location.
    #[must_use]
    pub fn with_company_facts_url(mut self, url: impl Into<String>) -> Self {
        self.company_facts_url = url.into();
        self
    }

    /// Overrides the submissions archive location.
    #[must_use]
    pub fn with_submissions_url(mut self, url: impl Into<String>) -> Self {
        self.submissions_url = url.into();
        self
    }

    /// Archive location for a dataset.
    #[must_use]
    pub fn url(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::CompanyFacts => &self.company_facts_url,
            Dataset::Submissions => &self.submissions_url,
        }
    }

    /// On-disk layout derived from [`EdgarConfig::root`].
    #[must_use]
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(self.root.clone())
    }

    /// Checks the configuration before a build.
    ///
    /// # Errors
    /// Returns [`EdgarError::InvalidParameter`] for a zero worker count or a
    /// blank user agent.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(EdgarError::InvalidParameter(
                "Worker count must be at least 1".to_string(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(EdgarError::InvalidParameter(
                "User agent must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

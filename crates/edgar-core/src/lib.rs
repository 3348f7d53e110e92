#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/edgar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for the SEC EDGAR bulk mirror.
//!
//! - [`Cik`](cik::Cik) - Normalized 10-digit Central Index Key
//! - [`EdgarError`](error::EdgarError) - Error taxonomy shared by every crate
//! - [`DataLayout`](layout::DataLayout) - Paths of the mirror under its root directory
//! - [`EdgarConfig`](config::EdgarConfig) - Endpoints, user agent and worker count
//! - [`BuildSummary`](summary::BuildSummary) - Record persisted after every build

/// Central Index Key type.
pub mod cik;
/// Build configuration.
pub mod config;
/// Error types for mirror operations.
pub mod error;
/// On-disk layout of the mirror.
pub mod layout;
/// JSON persistence helpers.
pub mod persist;
/// Build summary record and its persistence.
pub mod summary;

// Re-export commonly used items at crate root
pub use cik::Cik;
pub use config::{
    COMPANY_FACTS_URL, DEFAULT_USER_AGENT, DEFAULT_WORKERS, EdgarConfig, SUBMISSIONS_URL,
};
pub use error::{EdgarError, Result};
pub use layout::{DataLayout, Dataset};
pub use summary::{BuildSummary, DatasetSummary, IndexStats};

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/edgar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Streaming download and idempotent extraction of EDGAR bulk archives.
//!
//! # Example
//!
//! ```no_run
//! use edgar_archive::{ArchiveSource, HttpArchiveSource, extract_if_empty_async};
//! use edgar_core::COMPANY_FACTS_URL;
//! use std::path::Path;
//!
//! # async fn example() -> edgar_core::Result<()> {
//! let source = HttpArchiveSource::new("MyApp/1.0 (contact@example.com)")?;
//! let archive = Path::new("/data/edgar/company_facts.zip");
//!
//! let bytes = source.fetch(COMPANY_FACTS_URL, archive).await?;
//! println!("Downloaded {} bytes", bytes);
//!
//! extract_if_empty_async(archive, Path::new("/data/edgar/company_facts")).await?;
//! # Ok(())
//! # }
//! ```

/// Idempotent ZIP extraction.
pub mod extract;
/// Archive sources and progress reporting.
pub mod fetch;

pub use extract::{ExtractOutcome, extract_if_empty, extract_if_empty_async};
pub use fetch::{
    ArchiveSource, CHUNK_SIZE, HttpArchiveSource, LocalArchiveSource, LogProgress,
    ProgressObserver,
};

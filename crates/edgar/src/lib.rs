#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/edgar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Local mirror of the SEC EDGAR bulk datasets.
//!
//! This crate ties the workspace together: it re-exports the core types, the
//! archive and index crates, and provides [`EdgarMirror`], which runs builds
//! and serves lookups over a mirror directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use edgar::{EdgarConfig, EdgarMirror};
//!
//! #[tokio::main]
//! async fn main() -> edgar::Result<()> {
//!     let config = EdgarConfig::new("/data/edgar")
//!         .with_user_agent("MyApp/1.0 (contact@example.com)");
//!     let mut mirror = EdgarMirror::open(config)?;
//!
//!     let summary = mirror.build().await?;
//!     println!("Indexed {} records", summary.index.records);
//!
//!     let facts = mirror.entity_facts(None, Some("AAPL"), None)?;
//!     if let Some(field) = facts.get("Revenues") {
//!         for obs in field.observations() {
//!             println!("{:?} {:?} {}", obs.fiscal_year, obs.fiscal_period, obs.value);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Core types
pub use edgar_core::*;

// Archive handling
pub use edgar_archive::{
    ArchiveSource, ExtractOutcome, HttpArchiveSource, LocalArchiveSource, LogProgress,
    ProgressObserver, extract_if_empty,
};

// Indexing
pub use edgar_index::{DisplayNameField, EntityRecord, IndexBuild, IndexBuilder, LookupStore};

mod coordinator;
pub use coordinator::EdgarMirror;

/// Reading entity facts documents.
pub mod facts;
pub use facts::{EntityFacts, Field, Observation};

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/edgar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Parallel ticker and company-name indexing of EDGAR entity records.
//!
//! # Example
//!
//! ```no_run
//! use edgar_core::DataLayout;
//! use edgar_index::{DisplayNameField, IndexBuilder, LookupStore, collect_json_files};
//!
//! # async fn example() -> edgar_core::Result<()> {
//! let layout = DataLayout::new("/data/edgar");
//! let files = collect_json_files(&layout.root().join("submissions"))?;
//!
//! let build = IndexBuilder::new(DisplayNameField::Name)
//!     .with_workers(8)
//!     .build(files)
//!     .await?;
//!
//! let mut store = LookupStore::open(&layout)?;
//! store.merge(build);
//! store.save()?;
//!
//! println!("AAPL -> {:?}", store.lookup_identifier(Some("AAPL"), None));
//! # Ok(())
//! # }
//! ```

/// Chunked parallel scan and merge.
pub mod builder;
/// Per-entity record parsing.
pub mod record;
/// Persisted lookup maps.
pub mod store;

pub use builder::{
    IndexBuild, IndexBuilder, PartialIndex, chunk_ranges, collect_json_files, scan_chunk,
};
pub use record::{DisplayNameField, EntityRecord, RecordError};
pub use store::LookupStore;

//! Access to a D-PLACE data repository on disk.
//!
//! # Features
//!
//! - **Repository**: index files, lazily loaded datasets and phylogenies,
//!   merged society and variable views, filtered data iteration
//! - **CSV dialects**: strict reader for dataset tables, lenient reader for
//!   index tables, atomic writer
//! - **Bibliography**: BibTeX reader and writer keyed by citation key
//! - **Trees**: Newick parsing, pruning and serialization, Nexus TREES blocks
//!
//! # Example
//!
//! ```ignore
//! use dplace_ingest::{DataFilter, Repository};
//!
//! let repos = Repository::new("dplace-data");
//! for dataset in repos.datasets()? {
//!     println!("{dataset}: {} societies", dataset.societies()?.len());
//! }
//! let selection = repos.iter_data(DataFilter::new().datasets(["EA"]))?;
//! let coded = selection.iter().filter(|d| !d.is_missing()).count();
//! ```

pub mod bib;
pub mod csv;
mod dataset;
mod error;
pub mod files;
pub mod paths;
mod phylogeny;
mod repository;
pub mod tree;

// === Error Types ===
pub use error::{IngestError, Result};

// === Repository ===
pub use dataset::Dataset;
pub use phylogeny::Phylogeny;
pub use repository::{DataFilter, DataSelection, Repository};

// === Collaborators ===
pub use bib::{BibEntry, BibFile};
pub use tree::{NexusFile, NexusTree, Tree};

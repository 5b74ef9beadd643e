//! Conversion of a D-PLACE repository into a CLDF-style StructureDataset.
//!
//! # Features
//!
//! - **Conversion**: datasets, societies, relations, variables, codes and
//!   data as foreign-keyed rows, with sanitized ids and lazily collected
//!   sources
//! - **Dataset directories**: a single raw dataset directory converted on
//!   its own
//! - **Package**: CSV tables, `sources.bib`, metadata document, license
//! - **Validation**: primary keys, foreign keys and citations of a written
//!   package
//!
//! # Example
//!
//! ```ignore
//! use dplace_output::{ConversionOptions, convert_repository, validate_package, write_package};
//!
//! let conversion = convert_repository(&repos, None, ConversionOptions::default())?;
//! write_package(&conversion, out_dir, Some(&repos.path("LICENSE.txt")))?;
//! assert!(validate_package(out_dir)?.is_empty());
//! ```

pub mod convert;
pub mod schema;
pub mod tables;
pub mod validate;
pub mod writer;

pub use convert::{
    Conversion, ConversionOptions, code_ord, convert_dataset_dir, convert_repository, valid_id,
};
pub use schema::Metadata;
pub use validate::{Violation, validate_package};
pub use writer::write_package;

//! Typed records of the D-PLACE comparative dataset.
//!
//! Every record is built from one CSV row keyed by header name
//! ([`Record::from_row`]) and serialized back in a fixed column order
//! ([`Record::to_row`]). Field converters validate ids, Glottocodes and
//! coordinates at construction time; a failing converter makes the whole
//! record fail with a [`ValidationError`].

pub mod data;
pub mod error;
pub mod fields;
pub mod record;
pub mod reference;
pub mod society;
pub mod source;
pub mod variable;

pub use data::Data;
pub use error::{Result, ValidationError};
pub use fields::Row;
pub use record::{Record, row};
pub use reference::Reference;
pub use society::{HrafReference, RelatedSocieties, RelatedSociety, Society};
pub use source::{DatasetInfo, DatasetKind, PhylogenyInfo, SourceInfo, Taxon};
pub use variable::{Code, NA, Variable, VariableType};

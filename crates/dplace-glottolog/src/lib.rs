//! Glottolog-derived data of a D-PLACE repository.
//!
//! Reads the languoid classification of a Glottolog clone and rewrites
//! `csv/glottolog.csv`, one `glottolog_<family>` phylogeny per family with
//! languages in use, the `glottolog_global` phylogeny and their rows in
//! `phylogenies/index.csv`. Also annotates bibliography entries with the
//! languoids of the societies they were used for.

pub mod ini;
pub mod languoid;
pub mod lgcode;
pub mod trees;
pub mod update;

pub use languoid::{Languoid, Level, load_languoids};
pub use lgcode::annotate_sources;
pub use trees::{Classification, build_trees};
pub use update::{Release, UpdateSummary, update};

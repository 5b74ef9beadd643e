//! Fixed locations inside a repository checkout.

use std::path::PathBuf;

/// Environment variable naming the repository root.
pub const REPOS_ENV_VAR: &str = "DPLACE_REPOS";
pub const DEFAULT_REPOS_DIR: &str = "dplace-data";

pub const DATASETS_DIR: &str = "datasets";
pub const DATASETS_INDEX: &str = "datasets/index.csv";
pub const SOURCES_BIB: &str = "datasets/sources.bib";
pub const PHYLOGENIES_DIR: &str = "phylogenies";
pub const PHYLOGENIES_INDEX: &str = "phylogenies/index.csv";
pub const GLOTTOLOG_CSV: &str = "csv/glottolog.csv";
pub const TDWG_REGIONS: &str = "geo/level2.json";
pub const SOCIETIES_TDWG: &str = "geo/societies_tdwg.json";
pub const LICENSE: &str = "LICENSE.txt";
pub const SOURCES_MD: &str = "SOURCES.md";

// Per-dataset tables.
pub const SOCIETIES_CSV: &str = "societies.csv";
pub const DATA_CSV: &str = "data.csv";
pub const VARIABLES_CSV: &str = "variables.csv";
pub const CODES_CSV: &str = "codes.csv";
pub const SOCIETIES_MAPPING_CSV: &str = "societies_mapping.csv";
pub const README_MD: &str = "README.md";

// Per-phylogeny files.
pub const SUMMARY_TREES: &str = "summary.trees";
pub const TAXA_CSV: &str = "taxa.csv";

/// Repository root from `DPLACE_REPOS`, else `./dplace-data`.
pub fn default_repos_root() -> PathBuf {
    if let Ok(root) = std::env::var(REPOS_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(DEFAULT_REPOS_DIR)
}

use std::path::{Path, PathBuf};

use anyhow::Result;
use dplace_glottolog::{Release, UpdateSummary, annotate_sources, update};
use dplace_ingest::{Repository, paths};

/// Refresh the Glottolog-derived files from a Glottolog clone.
pub fn run_glottolog(repos: &Repository, glottolog: &Path, version: &str) -> Result<UpdateSummary> {
    update(repos, glottolog, &Release::new(version))
}

/// Annotate cited bibliography entries and rewrite `sources.bib`.
pub fn run_glottologbib(repos: &Repository) -> Result<PathBuf> {
    let (sources, annotated) = annotate_sources(repos)?;
    let path = repos.path(paths::SOURCES_BIB);
    sources.save(&path)?;
    tracing::info!(path = %path.display(), annotated, "wrote bibliography");
    Ok(path)
}

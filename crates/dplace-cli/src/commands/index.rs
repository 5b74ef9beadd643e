use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dplace_ingest::files::write_atomic;
use dplace_ingest::{Repository, paths};
use dplace_model::SourceInfo;

/// Per-family Glottolog trees are left out, the global one is listed.
fn is_listed(phylogeny_id: &str) -> bool {
    !phylogeny_id.starts_with("glottolog_") || phylogeny_id == "glottolog_global"
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn render_section<'a>(
    out: &mut String,
    title: &str,
    dir: &str,
    sources: impl Iterator<Item = &'a SourceInfo>,
) {
    let _ = write!(out, "\n## {title}\n\n");
    out.push_str("| Name | Reference |\n");
    out.push_str("| --- | --- |\n");
    for source in sources {
        let _ = writeln!(
            out,
            "| [{}]({dir}/{}) | {} |",
            escape_cell(&source.name),
            source.id,
            escape_cell(&source.reference)
        );
    }
}

/// The `SOURCES.md` document listing datasets and phylogenies.
pub fn render_sources(repos: &Repository) -> Result<String> {
    let mut out = String::from("# Sources\n");
    let datasets = repos.datasets().context("read dataset index")?;
    render_section(
        &mut out,
        "Datasets",
        paths::DATASETS_DIR,
        datasets.iter().map(|dataset| &dataset.info.source),
    );
    let phylogenies = repos.phylogenies().context("read phylogeny index")?;
    render_section(
        &mut out,
        "Phylogenies",
        paths::PHYLOGENIES_DIR,
        phylogenies
            .iter()
            .filter(|phylogeny| is_listed(phylogeny.id()))
            .map(|phylogeny| &phylogeny.info.source),
    );
    Ok(out)
}

/// Write `SOURCES.md` at the repository root.
pub fn write_sources(repos: &Repository) -> Result<PathBuf> {
    let path = repos.path(paths::SOURCES_MD);
    write_atomic(&path, render_sources(repos)?.as_bytes())?;
    tracing::info!(path = %path.display(), "wrote source list");
    Ok(path)
}

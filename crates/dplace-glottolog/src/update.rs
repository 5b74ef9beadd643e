//! Rewriting the Glottolog-derived files of a repository.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Datelike;
use dplace_ingest::csv::{read_dicts_lenient, write_rows};
use dplace_ingest::files::write_atomic;
use dplace_ingest::{NexusFile, Repository, paths};
use dplace_model::{PhylogenyInfo, Record, Row, Society, Taxon, fields};

use crate::languoid::{Languoid, load_languoids};
use crate::trees::{Classification, GLOBAL_TREE, PrunedTree, build_trees, family_tree_name};

const GLOTTOLOG_URL: &str = "https://glottolog.org/";
const TREE_PREFIX: &str = "glottolog_";

pub const LANGUOID_FIELDS: &[&str] = &[
    "id",
    "name",
    "family_id",
    "family_name",
    "iso_code",
    "language_id",
    "macroarea",
    "lineage",
    "level",
];

/// Title and year stamped on the regenerated phylogeny index rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub title: String,
    pub year: String,
}

impl Release {
    /// A release of the given Glottolog version, dated this year.
    pub fn new(version: &str) -> Self {
        Self {
            title: format!("Glottolog {version}"),
            year: chrono::Local::now().year().to_string(),
        }
    }

    pub fn reference(&self) -> String {
        format!(
            "Hammarström, Harald & Forkel, Robert & Haspelmath, Martin. {}. {}. \
             Jena: Max Planck Institute for the Science of Human History. {GLOTTOLOG_URL}",
            self.title, self.year
        )
    }

    fn family_row(&self, family: &Languoid) -> Row {
        index_row([
            ("id", family_tree_name(&family.id)),
            ("name", format!("{} ({})", family.name, self.title)),
            ("author", format!("{} ({})", self.title, family.name)),
            ("year", self.year.clone()),
            ("scaling", String::new()),
            ("reference", self.reference()),
            (
                "url",
                format!("{GLOTTOLOG_URL}resource/languoid/id/{}", family.id),
            ),
        ])
    }

    fn global_row(&self) -> Row {
        index_row([
            ("id", GLOBAL_TREE.to_string()),
            ("name", format!("Global Classification ({})", self.title)),
            ("author", self.title.clone()),
            ("year", self.year.clone()),
            ("scaling", String::new()),
            ("reference", self.reference()),
            ("url", GLOTTOLOG_URL.to_string()),
        ])
    }
}

fn index_row<const N: usize>(pairs: [(&str, String); N]) -> Row {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// What a refresh wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub languoids: usize,
    pub trees: Vec<String>,
}

/// Refresh `csv/glottolog.csv`, the `glottolog_*` phylogenies and their
/// rows in `phylogenies/index.csv` from a Glottolog clone.
pub fn update(repos: &Repository, glottolog: &Path, release: &Release) -> Result<UpdateSummary> {
    let span = tracing::info_span!("glottolog", glottolog = %glottolog.display());
    let _guard = span.enter();

    let classification = Classification::new(load_languoids(glottolog)?);
    write_languoids(&repos.path(paths::GLOTTOLOG_CSV), &classification)?;

    let societies = societies_by_glottocode(repos.societies()?.values());
    let keep: BTreeSet<String> = societies.keys().map(|gc| (*gc).to_string()).collect();
    let trees = build_trees(&classification, &keep);

    let phylogenies_dir = repos.path(paths::PHYLOGENIES_DIR);
    remove_tree_dirs(&phylogenies_dir)?;

    let mut summary = UpdateSummary {
        languoids: classification.len(),
        trees: Vec::new(),
    };
    let mut index = BTreeMap::new();
    for (family_id, tree) in &trees.families {
        write_tree(&phylogenies_dir, tree, &societies)?;
        if let Some(family) = classification.get(family_id) {
            index.insert(tree.name.clone(), release.family_row(family));
        }
        summary.trees.push(tree.name.clone());
    }
    if let Some(global) = &trees.global {
        write_tree(&phylogenies_dir, global, &societies)?;
        index.insert(global.name.clone(), release.global_row());
        summary.trees.push(global.name.clone());
    }
    merge_index(&repos.path(paths::PHYLOGENIES_INDEX), index)?;

    tracing::info!(
        languoids = summary.languoids,
        trees = summary.trees.len(),
        "refreshed Glottolog data"
    );
    Ok(summary)
}

fn societies_by_glottocode<'a>(
    societies: impl Iterator<Item = &'a Society>,
) -> BTreeMap<&'a str, Vec<&'a Society>> {
    let mut by_glottocode: BTreeMap<&str, Vec<&Society>> = BTreeMap::new();
    for society in societies.filter(|s| s.has_glottocode()) {
        by_glottocode
            .entry(society.glottocode.as_str())
            .or_default()
            .push(society);
    }
    by_glottocode
}

fn languoid_row(languoid: &Languoid) -> Vec<String> {
    let family = languoid.family();
    vec![
        languoid.id.clone(),
        languoid.name.clone(),
        family.map(|a| a.id.clone()).unwrap_or_default(),
        family.map(|a| a.name.clone()).unwrap_or_default(),
        languoid.iso.clone().unwrap_or_default(),
        languoid.language_id().unwrap_or_default().to_string(),
        languoid.macroareas.first().cloned().unwrap_or_default(),
        languoid
            .lineage
            .iter()
            .map(|a| a.id.as_str())
            .collect::<Vec<_>>()
            .join("/"),
        languoid.level.to_string(),
    ]
}

/// Write one row per languoid, ordered by Glottocode.
pub fn write_languoids(path: &Path, classification: &Classification) -> Result<()> {
    write_rows(path, LANGUOID_FIELDS, classification.languoids().map(languoid_row))
        .with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = classification.len(), "wrote languoids");
    Ok(())
}

fn remove_tree_dirs(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read {}", dir.display()))?;
        let is_tree_dir = entry.file_name().to_string_lossy().starts_with(TREE_PREFIX);
        if is_tree_dir && entry.path().is_dir() {
            fs::remove_dir_all(entry.path())
                .with_context(|| format!("remove {}", entry.path().display()))?;
            tracing::debug!(dir = %entry.path().display(), "removed phylogeny");
        }
    }
    Ok(())
}

fn taxon_row(glottocode: &str, societies: &[&Society]) -> Vec<String> {
    let xd_ids: Vec<&str> = societies
        .iter()
        .map(|s| s.xd_id.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut soc_ids: Vec<&str> = societies.iter().map(|s| s.id.as_str()).collect();
    soc_ids.sort_unstable();
    vec![
        glottocode.to_string(),
        glottocode.to_string(),
        fields::comma_join(&xd_ids),
        fields::comma_join(&soc_ids),
    ]
}

/// Write `summary.trees` and `taxa.csv` of one classification tree.
fn write_tree(
    phylogenies_dir: &Path,
    tree: &PrunedTree,
    societies: &BTreeMap<&str, Vec<&Society>>,
) -> Result<()> {
    let dir = phylogenies_dir.join(&tree.name);
    let nexus = NexusFile::render_single(&tree.name, &tree.newick());
    write_atomic(&dir.join(paths::SUMMARY_TREES), nexus.as_bytes())
        .with_context(|| format!("write tree {}", tree.name))?;

    let rows = tree.taxa.iter().map(|gc| {
        let linked = societies.get(gc.as_str()).map(Vec::as_slice).unwrap_or_default();
        taxon_row(gc, linked)
    });
    write_rows(&dir.join(paths::TAXA_CSV), Taxon::FIELDS, rows)
        .with_context(|| format!("write taxa of {}", tree.name))?;
    tracing::info!(tree = %tree.name, taxa = tree.taxa.len(), "wrote phylogeny");
    Ok(())
}

/// Replace index rows whose id was regenerated; append the new ones.
///
/// Existing rows keep their columns and are ordered by their values; new
/// rows follow, ordered by id.
pub fn merge_index(path: &Path, mut generated: BTreeMap<String, Row>) -> Result<()> {
    let existing = if path.exists() {
        read_dicts_lenient(path)?
    } else {
        Default::default()
    };
    let header: Vec<String> = if existing.header.is_empty() {
        PhylogenyInfo::FIELDS
            .iter()
            .map(|f| (*f).to_string())
            .collect()
    } else {
        existing.header.clone()
    };

    let values = |row: &Row| -> Vec<String> {
        header
            .iter()
            .map(|column| row.get(column).cloned().unwrap_or_default())
            .collect()
    };
    let mut current: Vec<Vec<String>> = existing.rows.iter().map(values).collect();
    current.sort();

    let id_column = header.iter().position(|column| column == "id");
    let mut rows = Vec::with_capacity(current.len() + generated.len());
    for row in current {
        let id = id_column.and_then(|i| row.get(i)).cloned().unwrap_or_default();
        match generated.remove(&id) {
            Some(replacement) => rows.push(values(&replacement)),
            None => rows.push(row),
        }
    }
    rows.extend(generated.values().map(values));

    write_rows(path, &header, rows).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), "merged phylogeny index");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_names_title_and_year() {
        let release = Release {
            title: "Glottolog 5.0".to_string(),
            year: "2024".to_string(),
        };
        assert_eq!(
            release.reference(),
            "Hammarström, Harald & Forkel, Robert & Haspelmath, Martin. Glottolog 5.0. 2024. \
             Jena: Max Planck Institute for the Science of Human History. https://glottolog.org/"
        );
        assert_eq!(release.global_row()["name"], "Global Classification (Glottolog 5.0)");
    }
}

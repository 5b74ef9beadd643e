use std::path::Path;

use anyhow::{Result, bail};
use dplace_ingest::csv::write_rows;
use dplace_ingest::{DataFilter, Repository};
use dplace_model::fields::format_float;

pub const EXTRACT_HEADER: &[&str] = &[
    "ID",
    "XD_ID",
    "Glottocode",
    "Name",
    "OriginalName",
    "FocalYear",
    "Latitude",
    "Longitude",
    "Variable",
    "Value",
];

/// Restrictions on the extracted data; `None` means no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub societies: Option<Vec<String>>,
    pub datasets: Option<Vec<String>>,
    pub variables: Option<Vec<String>>,
    /// Restrict to the societies linked from this phylogeny's taxa.
    pub tree: Option<String>,
}

impl ExtractOptions {
    fn filter(&self, repos: &Repository) -> Result<DataFilter> {
        let mut filter = DataFilter::new();
        if let Some(datasets) = &self.datasets {
            filter = filter.datasets(datasets.iter().cloned());
        }
        if let Some(variables) = &self.variables {
            filter = filter.variables(variables.iter().cloned());
        }
        if let Some(tree) = &self.tree {
            let Some(phylogeny) = repos.phylogeny(tree)? else {
                bail!("failed to find tree {tree}");
            };
            let societies = phylogeny
                .taxa()?
                .iter()
                .flat_map(|taxon| taxon.soc_ids.iter().cloned());
            filter = filter.societies(societies);
        } else if let Some(societies) = &self.societies {
            filter = filter.societies(societies.iter().cloned());
        }
        Ok(filter)
    }
}

/// Write the selected data, one row per record with its society, to `out`.
///
/// Returns the number of rows written.
pub fn extract(repos: &Repository, options: &ExtractOptions, out: &Path) -> Result<usize> {
    let filter = options.filter(repos)?;
    let societies = repos.societies()?;
    let selection = repos.iter_data(filter)?;

    let mut rows = Vec::new();
    for record in selection.iter() {
        let Some(society) = societies.get(&record.soc_id) else {
            tracing::warn!(society = %record.soc_id, variable = %record.var_id, "skipping data of unknown society");
            continue;
        };
        rows.push(vec![
            society.id.clone(),
            society.xd_id.clone(),
            society.glottocode.clone(),
            society.pref_name_for_society.clone(),
            society.orig_name_and_id_in_this_dataset.clone(),
            society.main_focal_year.clone(),
            format_float(society.lat),
            format_float(society.long),
            record.var_id.clone(),
            record.code.clone(),
        ]);
    }
    let count = rows.len();
    write_rows(out, EXTRACT_HEADER, rows)?;
    tracing::info!(rows = count, path = %out.display(), "extracted data");
    Ok(count)
}

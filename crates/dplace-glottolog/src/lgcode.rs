//! `lgcode` annotations linking bibliography entries to languoids.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use dplace_ingest::{BibFile, DataFilter, Repository};

pub const LGCODE_FIELD: &str = "lgcode";

/// The repository bibliography with every entry cited by a data record
/// annotated with the societies coded from it, as `Name [glottocode]`.
///
/// Returns the annotated copy and the number of entries touched.
pub fn annotate_sources(repos: &Repository) -> Result<(BibFile, usize)> {
    let societies = repos.societies()?;
    let mut cited: BTreeMap<&str, BTreeSet<(&str, &str)>> = BTreeMap::new();
    let selection = repos.iter_data(DataFilter::new())?;
    for record in selection.iter() {
        let Some(society) = societies.get(&record.soc_id) else {
            tracing::warn!(society = %record.soc_id, "data record for unknown society");
            continue;
        };
        for reference in &record.references {
            cited.entry(reference.key.as_str()).or_default().insert((
                society.pref_name_for_society.as_str(),
                society.glottocode.as_str(),
            ));
        }
    }

    let mut sources = repos.sources()?.clone();
    let mut annotated = 0;
    for (key, languoids) in &cited {
        let Some(entry) = sources.get_mut(key) else {
            continue;
        };
        let value = languoids
            .iter()
            .map(|(name, glottocode)| format!("{name} [{glottocode}]"))
            .collect::<Vec<_>>()
            .join(", ");
        entry.set(LGCODE_FIELD, value);
        annotated += 1;
    }
    tracing::info!(entries = annotated, "annotated bibliography");
    Ok((sources, annotated))
}

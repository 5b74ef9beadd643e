use anyhow::{Context, Result};
use dplace_ingest::Repository;
use dplace_model::DatasetKind;

/// One line of the dataset listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub id: String,
    pub name: String,
    pub kind: DatasetKind,
    pub variables: usize,
    pub societies: usize,
}

pub fn list_datasets(repos: &Repository) -> Result<Vec<DatasetSummary>> {
    repos
        .datasets()?
        .iter()
        .map(|dataset| {
            Ok(DatasetSummary {
                id: dataset.id().to_string(),
                name: dataset.name().to_string(),
                kind: dataset.kind(),
                variables: dataset
                    .variables()
                    .with_context(|| format!("read variables of {}", dataset.id()))?
                    .len(),
                societies: dataset
                    .societies()
                    .with_context(|| format!("read societies of {}", dataset.id()))?
                    .len(),
            })
        })
        .collect()
}

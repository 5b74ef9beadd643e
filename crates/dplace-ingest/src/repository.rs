//! The repository root: index files, datasets, phylogenies and bibliography.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use dplace_model::{Data, DatasetInfo, PhylogenyInfo, Record, Society, Variable};

use crate::bib::BibFile;
use crate::csv::read_dicts_lenient;
use crate::dataset::{Dataset, cached};
use crate::error::{IngestError, Result};
use crate::paths;
use crate::phylogeny::Phylogeny;

/// Read-mostly access to a D-PLACE data checkout.
///
/// Index files, tables and the bibliography are read on first access and
/// cached for the lifetime of the value. The `societies` and `variables`
/// maps are views merged across datasets; a later dataset wins on id
/// collisions. They are dropped whenever a dataset is borrowed mutably.
#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
    datasets: OnceCell<Vec<Dataset>>,
    phylogenies: OnceCell<Vec<Phylogeny>>,
    societies: OnceCell<BTreeMap<String, Society>>,
    variables: OnceCell<BTreeMap<String, Variable>>,
    sources: OnceCell<BibFile>,
}

impl Repository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            datasets: OnceCell::new(),
            phylogenies: OnceCell::new(),
            societies: OnceCell::new(),
            variables: OnceCell::new(),
            sources: OnceCell::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a repository-relative path.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn datasets(&self) -> Result<&[Dataset]> {
        cached(&self.datasets, || {
            let base_dir = self.path(paths::DATASETS_DIR);
            let datasets = read_index::<DatasetInfo>(&self.path(paths::DATASETS_INDEX))?
                .into_iter()
                .map(|info| Dataset::new(info, &base_dir).with_readme_fallback())
                .collect::<Result<Vec<_>>>()?;
            tracing::debug!(count = datasets.len(), "loaded dataset index");
            Ok(datasets)
        })
        .map(Vec::as_slice)
    }

    pub fn dataset(&self, id: &str) -> Result<Option<&Dataset>> {
        Ok(self.datasets()?.iter().find(|ds| ds.id() == id))
    }

    /// Mutable access to one dataset; invalidates the merged views.
    pub fn dataset_mut(&mut self, id: &str) -> Result<Option<&mut Dataset>> {
        self.datasets()?;
        self.societies = OnceCell::new();
        self.variables = OnceCell::new();
        Ok(self
            .datasets
            .get_mut()
            .and_then(|datasets| datasets.iter_mut().find(|ds| ds.id() == id)))
    }

    pub fn phylogenies(&self) -> Result<&[Phylogeny]> {
        cached(&self.phylogenies, || {
            let base_dir = self.path(paths::PHYLOGENIES_DIR);
            let phylogenies: Vec<Phylogeny> =
                read_index::<PhylogenyInfo>(&self.path(paths::PHYLOGENIES_INDEX))?
                    .into_iter()
                    .map(|info| Phylogeny::new(info, &base_dir))
                    .collect();
            tracing::debug!(count = phylogenies.len(), "loaded phylogeny index");
            Ok(phylogenies)
        })
        .map(Vec::as_slice)
    }

    pub fn phylogeny(&self, id: &str) -> Result<Option<&Phylogeny>> {
        Ok(self.phylogenies()?.iter().find(|p| p.id() == id))
    }

    /// All societies keyed by id.
    pub fn societies(&self) -> Result<&BTreeMap<String, Society>> {
        cached(&self.societies, || {
            let mut societies = BTreeMap::new();
            for dataset in self.datasets()? {
                for society in dataset.societies()? {
                    societies.insert(society.id.clone(), society.clone());
                }
            }
            Ok(societies)
        })
    }

    /// All variables keyed by id.
    pub fn variables(&self) -> Result<&BTreeMap<String, Variable>> {
        cached(&self.variables, || {
            let mut variables = BTreeMap::new();
            for dataset in self.datasets()? {
                for variable in dataset.variables()? {
                    variables.insert(variable.id.clone(), variable.clone());
                }
            }
            Ok(variables)
        })
    }

    pub fn sources(&self) -> Result<&BibFile> {
        cached(&self.sources, || BibFile::load(&self.path(paths::SOURCES_BIB)))
    }

    /// Data records of the datasets selected by `filter`.
    ///
    /// Tables of the selected datasets are loaded up front; the returned
    /// selection can then be iterated any number of times.
    pub fn iter_data(&self, filter: DataFilter) -> Result<DataSelection<'_>> {
        let mut tables = Vec::new();
        for dataset in self.datasets()? {
            if filter.includes_dataset(dataset.id()) {
                tables.push(dataset.data()?);
            }
        }
        Ok(DataSelection { tables, filter })
    }

    /// Write back every dataset loaded so far.
    pub fn write(&self) -> Result<()> {
        if let Some(datasets) = self.datasets.get() {
            for dataset in datasets {
                dataset.write()?;
            }
        }
        Ok(())
    }
}

fn read_index<T: Record>(path: &Path) -> Result<Vec<T>> {
    read_dicts_lenient(path)?
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            T::from_row(row).map_err(|source| IngestError::Record {
                path: path.to_path_buf(),
                row: i + 1,
                source,
            })
        })
        .collect()
}

/// Inclusion filters for [`Repository::iter_data`].
///
/// The dataset filter distinguishes "unset" (every dataset) from an empty
/// set (no dataset). The variable and society filters treat an empty set
/// like an unset filter. Callers rely on this difference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFilter {
    datasets: Option<BTreeSet<String>>,
    variables: Option<BTreeSet<String>>,
    societies: Option<BTreeSet<String>>,
}

impl DataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn datasets<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datasets = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn variables<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn societies<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.societies = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn includes_dataset(&self, id: &str) -> bool {
        self.datasets.as_ref().is_none_or(|ids| ids.contains(id))
    }

    pub fn includes(&self, record: &Data) -> bool {
        non_empty_contains(self.variables.as_ref(), &record.var_id)
            && non_empty_contains(self.societies.as_ref(), &record.soc_id)
    }
}

fn non_empty_contains(ids: Option<&BTreeSet<String>>, id: &str) -> bool {
    match ids {
        Some(ids) if !ids.is_empty() => ids.contains(id),
        _ => true,
    }
}

/// Data records matching a [`DataFilter`], re-iterable.
#[derive(Debug, Clone)]
pub struct DataSelection<'a> {
    tables: Vec<&'a [Data]>,
    filter: DataFilter,
}

impl<'a> DataSelection<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Data> + '_ {
        self.tables
            .iter()
            .copied()
            .flat_map(|table| table.iter())
            .filter(|record| self.filter.includes(record))
    }

    pub fn filter(&self) -> &DataFilter {
        &self.filter
    }
}

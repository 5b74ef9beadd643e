//! One source dataset and its lazily loaded tables.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use dplace_model::{
    Code, Data, DatasetInfo, DatasetKind, Record, RelatedSocieties, Society, Variable,
};

use crate::csv::{read_records, write_records};
use crate::error::Result;
use crate::files::read_text;
use crate::paths;

/// Return the cached value, loading it on first access.
pub(crate) fn cached<'a, T>(cell: &'a OnceCell<T>, load: impl FnOnce() -> Result<T>) -> Result<&'a T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = load()?;
    Ok(cell.get_or_init(|| value))
}

/// A dataset directory: societies, variables with codes, data and relations.
///
/// Each table is read on first access and kept for the lifetime of the
/// `Dataset`. Setters replace the in-memory table; nothing touches disk until
/// [`Dataset::write`].
#[derive(Debug)]
pub struct Dataset {
    pub info: DatasetInfo,
    dir: PathBuf,
    data: OnceCell<Vec<Data>>,
    societies: OnceCell<Vec<Society>>,
    society_relations: OnceCell<Vec<RelatedSocieties>>,
    codes: OnceCell<Vec<Code>>,
    variables: OnceCell<Vec<Variable>>,
}

impl Dataset {
    /// A dataset whose tables live in `base_dir/<id>`.
    pub fn new(info: DatasetInfo, base_dir: &Path) -> Self {
        let dir = base_dir.join(&info.source.id);
        Self {
            info,
            dir,
            data: OnceCell::new(),
            societies: OnceCell::new(),
            society_relations: OnceCell::new(),
            codes: OnceCell::new(),
            variables: OnceCell::new(),
        }
    }

    /// Use `README.md` as description when the index leaves it empty.
    pub(crate) fn with_readme_fallback(mut self) -> Result<Self> {
        if self.info.description.is_empty() {
            let readme = self.dir.join(paths::README_MD);
            if readme.exists() {
                self.info.description = read_text(&readme)?;
            }
        }
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.info.source.id
    }

    pub fn name(&self) -> &str {
        &self.info.source.name
    }

    pub fn kind(&self) -> DatasetKind {
        self.info.kind
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn table(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn data(&self) -> Result<&[Data]> {
        cached(&self.data, || read_records(&self.table(paths::DATA_CSV))).map(Vec::as_slice)
    }

    pub fn societies(&self) -> Result<&[Society]> {
        cached(&self.societies, || {
            read_records(&self.table(paths::SOCIETIES_CSV))
        })
        .map(Vec::as_slice)
    }

    pub fn society_relations(&self) -> Result<&[RelatedSocieties]> {
        cached(&self.society_relations, || {
            read_records(&self.table(paths::SOCIETIES_MAPPING_CSV))
        })
        .map(Vec::as_slice)
    }

    /// Codes in file order, including codes of undefined variables.
    pub fn codes(&self) -> Result<&[Code]> {
        cached(&self.codes, || read_records(&self.table(paths::CODES_CSV))).map(Vec::as_slice)
    }

    /// Variables, each carrying its codes.
    pub fn variables(&self) -> Result<&[Variable]> {
        cached(&self.variables, || {
            let mut by_variable: BTreeMap<&str, Vec<Code>> = BTreeMap::new();
            for code in self.codes()? {
                by_variable
                    .entry(code.var_id.as_str())
                    .or_default()
                    .push(code.clone());
            }
            let variables: Vec<Variable> = read_records(&self.table(paths::VARIABLES_CSV))?;
            Ok(variables
                .into_iter()
                .map(|variable| {
                    let codes = by_variable.remove(variable.id.as_str()).unwrap_or_default();
                    variable.with_codes(codes)
                })
                .collect())
        })
        .map(Vec::as_slice)
    }

    pub fn set_data(&mut self, data: Vec<Data>) {
        self.data = OnceCell::from(data);
    }

    pub fn set_societies(&mut self, societies: Vec<Society>) {
        self.societies = OnceCell::from(societies);
    }

    pub fn set_society_relations(&mut self, relations: Vec<RelatedSocieties>) {
        self.society_relations = OnceCell::from(relations);
    }

    /// Replace variables; the code table is rebuilt from their codes.
    pub fn set_variables(&mut self, variables: Vec<Variable>) {
        let codes: Vec<Code> = variables
            .iter()
            .flat_map(|variable| variable.codes.iter().cloned())
            .collect();
        self.codes = OnceCell::from(codes);
        self.variables = OnceCell::from(variables);
    }

    /// Write every table back in the column layout it was read with.
    ///
    /// Tables that are absent on disk and empty in memory are not created.
    pub fn write(&self) -> Result<()> {
        self.write_table(paths::SOCIETIES_CSV, self.societies()?)?;
        self.write_table(paths::VARIABLES_CSV, self.variables()?)?;
        self.write_table(paths::CODES_CSV, self.codes()?)?;
        self.write_table(paths::DATA_CSV, self.data()?)?;
        self.write_table(paths::SOCIETIES_MAPPING_CSV, self.society_relations()?)?;
        tracing::info!(dataset = %self.id(), dir = %self.dir.display(), "wrote dataset");
        Ok(())
    }

    fn write_table<T: Record>(&self, name: &str, records: &[T]) -> Result<()> {
        let path = self.table(name);
        if records.is_empty() && !path.exists() {
            return Ok(());
        }
        write_records(&path, records)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info.source)
    }
}

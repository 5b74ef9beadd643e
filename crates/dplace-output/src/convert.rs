//! Conversion of datasets into output rows.
//!
//! Rows are built in a fixed order per dataset: the dataset itself, its
//! societies and their relations, variables with codes, then data. Data must
//! come last since a value is only linked to a code once the code's variable
//! has been seen.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use dplace_geo::Regions;
use dplace_ingest::{BibFile, Dataset, Repository, files, paths};
use dplace_model::{Data, DatasetInfo, DatasetKind, HrafReference, NA, Society, SourceInfo};

use crate::schema::SOURCES_FILE;
use crate::tables::{CodeRow, DatasetRow, LanguageRow, ParameterRow, RelationRow, ValueRow};

/// Region properties tried in order for a society's region label.
const REGION_LABELS: &[&str] = &["LEVEL2_NAM", "REGION_NAM"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Drop Code_IDs that do not resolve to an emitted code.
    pub fix_codes: bool,
    /// Skip validation of the written package.
    pub dev: bool,
}

/// All rows of one conversion plus the bibliography entries they cite.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub title: String,
    pub datasets: Vec<DatasetRow>,
    pub languages: Vec<LanguageRow>,
    pub parameters: Vec<ParameterRow>,
    pub codes: Vec<CodeRow>,
    pub values: Vec<ValueRow>,
    pub relations: Vec<RelationRow>,
    pub sources: BibFile,
}

impl Conversion {
    /// Null every Code_ID without a matching code row; returns how many.
    pub fn fix_codes(&mut self) -> usize {
        let known: BTreeSet<&str> = self.codes.iter().map(|c| c.id.as_str()).collect();
        let mut fixed = 0;
        for value in &mut self.values {
            if value
                .code_id
                .as_deref()
                .is_some_and(|code_id| !known.contains(code_id))
            {
                tracing::warn!(value = %value.id, code = ?value.code_id, "dropping dangling code reference");
                value.code_id = None;
                fixed += 1;
            }
        }
        fixed
    }
}

/// Identifiers in the output may not contain dots.
pub fn valid_id(id: &str) -> String {
    id.replace('.', "_")
}

/// Integer position of a code; dots are dropped so `1.2` sorts as `12`.
pub fn code_ord(code: &str) -> Option<i64> {
    code.replace('.', "").parse().ok()
}

/// How data of a dataset directory differs from data in a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Values keep their codes; ids are prefixed with the dataset id.
    Repository,
    /// Values are replaced by code names; ids are plain row numbers.
    DatasetDir,
}

struct Builder<'a> {
    mode: Mode,
    bibliography: &'a BibFile,
    regions: Option<&'a Regions>,
    dataset_ids: BTreeSet<String>,
    /// Variables with at least one code besides `NA`.
    categorical: BTreeSet<String>,
    /// Name of each emitted code, `None` for "Missing data".
    code_names: BTreeMap<(String, String), Option<String>>,
    cited: BTreeSet<String>,
    conversion: Conversion,
}

impl<'a> Builder<'a> {
    fn new(mode: Mode, bibliography: &'a BibFile, regions: Option<&'a Regions>) -> Self {
        Self {
            mode,
            bibliography,
            regions,
            dataset_ids: BTreeSet::new(),
            categorical: BTreeSet::new(),
            code_names: BTreeMap::new(),
            cited: BTreeSet::new(),
            conversion: Conversion::default(),
        }
    }

    fn add_dataset(&mut self, dataset: &Dataset) -> Result<()> {
        let _span = tracing::info_span!("dataset", id = %dataset.id()).entered();
        let info = &dataset.info;
        self.conversion.datasets.push(DatasetRow {
            id: info.source.id.clone(),
            name: info.source.name.clone(),
            description: info.description.clone(),
            kind: info.kind.to_string(),
            year: info.source.year.clone(),
            author: info.source.author.clone(),
            reference: info.source.reference.clone(),
            url: info.source.url.clone(),
        });

        for society in dataset.societies()? {
            let row = self.language(dataset.id(), society)?;
            self.conversion.languages.push(row);
        }
        self.add_relations(dataset)?;
        self.add_variables(dataset)?;
        for (i, record) in dataset.data()?.iter().enumerate() {
            let row = self.value(dataset.id(), i + 1, record);
            self.conversion.values.push(row);
        }
        tracing::debug!(
            societies = dataset.societies()?.len(),
            data = dataset.data()?.len(),
            "converted dataset"
        );
        Ok(())
    }

    fn language(&self, dataset_id: &str, society: &Society) -> Result<LanguageRow> {
        let region = match self.regions {
            Some(regions) => {
                let found = regions
                    .match_point(society.long, society.lat)
                    .with_context(|| format!("match region of society {}", society.id))?;
                REGION_LABELS
                    .iter()
                    .find_map(|key| found.region.property(key))
            }
            None => None,
        };
        let main_focal_year = match (self.mode, society.main_focal_year.as_str()) {
            (Mode::DatasetDir, NA) => None,
            (_, year) => Some(year.to_string()),
        };
        Ok(LanguageRow {
            id: society.id.clone(),
            name: society.pref_name_for_society.clone(),
            glottocode: society.glottocode.clone(),
            latitude: society.lat,
            longitude: society.long,
            comment: society.comment.clone(),
            dataset_id: dataset_id.to_string(),
            glottocode_comment: society.glottocode_comment.clone(),
            xd_id: society.xd_id.clone(),
            orig_name_and_id: society.orig_name_and_id_in_this_dataset.clone(),
            alt_names: society.alt_names_by_society.clone(),
            main_focal_year,
            hraf_id: society
                .hraf_name_id
                .as_ref()
                .and_then(HrafReference::culture_id)
                .map(str::to_string),
            hraf_name: society.hraf_name_id.as_ref().map(|h| h.name.clone()),
            hraf_link: society.hraf_link.clone(),
            orig_lat: society.orig_lat,
            orig_long: society.orig_long,
            region,
        })
    }

    fn add_relations(&mut self, dataset: &Dataset) -> Result<()> {
        for relations in dataset.society_relations()? {
            for related in &relations.related {
                let internal = self.dataset_ids.contains(&related.dataset);
                let id = (self.conversion.relations.len() + 1).to_string();
                self.conversion.relations.push(RelationRow {
                    id,
                    society_id: relations.id.clone(),
                    related_society_id: internal.then(|| related.id.clone()),
                    related_society_external_id: (!internal).then(|| related.id.clone()),
                    related_society_name: related.name.clone(),
                    related_society_dataset: related.dataset.clone(),
                });
            }
        }
        Ok(())
    }

    fn add_variables(&mut self, dataset: &Dataset) -> Result<()> {
        for variable in dataset.variables()? {
            self.conversion.parameters.push(ParameterRow {
                id: valid_id(&variable.id),
                name: variable.title.clone(),
                description: variable.definition.clone(),
                dataset_id: dataset.id().to_string(),
                category: variable.category.clone(),
                var_type: variable.var_type.to_string(),
                units: variable.units.clone(),
                source: variable.source.clone(),
                changes: variable.changes.clone(),
                notes: variable.notes.clone(),
            });
            if !variable.var_type.has_codes() {
                continue;
            }
            for code in &variable.codes {
                if code.is_na() {
                    continue;
                }
                self.categorical.insert(code.var_id.clone());
                let name = (!code.name.eq_ignore_ascii_case("missing data")).then(|| code.name.clone());
                self.code_names
                    .insert((code.var_id.clone(), code.code.clone()), name);
                self.conversion.codes.push(CodeRow {
                    id: self.code_id(&code.var_id, &code.code),
                    parameter_id: valid_id(&code.var_id),
                    name: code.name.clone(),
                    description: code.description.clone(),
                    ord: code_ord(&code.code),
                });
            }
        }
        Ok(())
    }

    fn code_id(&self, var_id: &str, code: &str) -> String {
        match self.mode {
            Mode::Repository => valid_id(&format!("{var_id}-{code}")),
            Mode::DatasetDir => format!("{}-{}", valid_id(var_id), code.replace('.', "")),
        }
    }

    fn value(&mut self, dataset_id: &str, number: usize, record: &Data) -> ValueRow {
        let source = record
            .references
            .iter()
            .map(|reference| {
                self.cite(&reference.key);
                reference.format_cldf()
            })
            .collect();

        let key = (record.var_id.clone(), record.code.clone());
        let (id, value, code_id, year) = match self.mode {
            Mode::Repository => {
                let code_id = (self.categorical.contains(&record.var_id) && record.code != NA)
                    .then(|| self.code_id(&record.var_id, &record.code));
                (
                    format!("{dataset_id}-{number}"),
                    Some(record.code.clone()),
                    code_id,
                    Some(record.year.clone()),
                )
            }
            Mode::DatasetDir => {
                let value = match self.code_names.get(&key) {
                    Some(name) => name.clone(),
                    None => Some(record.code.clone()),
                }
                .filter(|v| v != NA && v != "?");
                let code_id = self
                    .code_names
                    .contains_key(&key)
                    .then(|| self.code_id(&record.var_id, &record.code));
                let year = (record.year != NA).then(|| record.year.clone());
                (number.to_string(), value, code_id, year)
            }
        };

        ValueRow {
            id,
            language_id: record.soc_id.clone(),
            parameter_id: valid_id(&record.var_id),
            value,
            code_id,
            comment: record.comment.clone(),
            source,
            sub_case: record.sub_case.clone(),
            year,
            source_coded_data: record.source_coded_data.clone(),
            admin_comment: record.admin_comment.clone(),
            dataset_id: dataset_id.to_string(),
        }
    }

    /// Add a bibliography entry the first time it is cited.
    fn cite(&mut self, key: &str) {
        if !self.cited.insert(key.to_string()) {
            return;
        }
        match self.bibliography.get(key) {
            Some(entry) => self.conversion.sources.push(entry.clone()),
            None => tracing::warn!(key, "cited source missing from bibliography"),
        }
    }

    fn finish(self, options: ConversionOptions) -> Conversion {
        let mut conversion = self.conversion;
        if options.fix_codes {
            let fixed = conversion.fix_codes();
            tracing::info!(fixed, "fixed code references");
        }
        tracing::info!(
            datasets = conversion.datasets.len(),
            societies = conversion.languages.len(),
            variables = conversion.parameters.len(),
            values = conversion.values.len(),
            sources = conversion.sources.len(),
            "conversion finished"
        );
        conversion
    }
}

/// Convert every dataset of a repository.
pub fn convert_repository(
    repos: &Repository,
    regions: Option<&Regions>,
    options: ConversionOptions,
) -> Result<Conversion> {
    let bibliography = repos.sources().context("read bibliography")?;
    let datasets = repos.datasets().context("read dataset index")?;
    let mut builder = Builder::new(Mode::Repository, bibliography, regions);
    builder.dataset_ids = datasets.iter().map(|ds| ds.id().to_string()).collect();
    builder.conversion.title = "D-PLACE".to_string();
    for dataset in datasets {
        builder
            .add_dataset(dataset)
            .with_context(|| format!("convert dataset {}", dataset.id()))?;
    }
    Ok(builder.finish(options))
}

/// Convert a single dataset directory with its own `sources.bib`.
///
/// The directory name serves as dataset id. Relations to other datasets can
/// only be recorded as external ids.
pub fn convert_dataset_dir(
    dir: &Path,
    regions: Option<&Regions>,
    options: ConversionOptions,
) -> Result<Conversion> {
    let id = dir
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("dataset directory without a name: {}", dir.display()))?
        .to_string();
    let base_dir = dir.parent().unwrap_or_else(|| Path::new(""));
    let readme = dir.join(paths::README_MD);
    let description = if readme.exists() {
        files::read_text(&readme).context("read dataset description")?
    } else {
        String::new()
    };
    let info = DatasetInfo {
        source: SourceInfo {
            id: id.clone(),
            name: id.clone(),
            year: String::new(),
            author: String::new(),
            reference: String::new(),
            url: String::new(),
        },
        kind: DatasetKind::Cultural,
        description,
    };
    let dataset = Dataset::new(info, base_dir);

    let bib_path = dir.join(SOURCES_FILE);
    let bibliography = if bib_path.exists() {
        BibFile::load(&bib_path).context("read dataset bibliography")?
    } else {
        BibFile::default()
    };

    let mut builder = Builder::new(Mode::DatasetDir, &bibliography, regions);
    builder.dataset_ids.insert(id.clone());
    builder.conversion.title = format!("D-PLACE dataset derived from {id}");
    builder
        .add_dataset(&dataset)
        .with_context(|| format!("convert dataset directory {}", dir.display()))?;
    Ok(builder.finish(options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sanitized() {
        assert_eq!(valid_id("EA112.1"), "EA112_1");
        assert_eq!(code_ord("1.2"), Some(12));
        assert_eq!(code_ord("NA"), None);
    }

    #[test]
    fn fix_codes_drops_dangling_references() {
        let mut conversion = Conversion {
            codes: vec![CodeRow {
                id: "X1-1".to_string(),
                parameter_id: "X1".to_string(),
                name: "one".to_string(),
                description: String::new(),
                ord: Some(1),
            }],
            ..Conversion::default()
        };
        for (i, code_id) in ["X1-1", "X1-2"].into_iter().enumerate() {
            conversion.values.push(ValueRow {
                id: i.to_string(),
                language_id: "S1".to_string(),
                parameter_id: "X1".to_string(),
                value: None,
                code_id: Some(code_id.to_string()),
                comment: String::new(),
                source: Vec::new(),
                sub_case: String::new(),
                year: None,
                source_coded_data: String::new(),
                admin_comment: String::new(),
                dataset_id: "X".to_string(),
            });
        }
        assert_eq!(conversion.fix_codes(), 1);
        assert_eq!(conversion.values[0].code_id.as_deref(), Some("X1-1"));
        assert_eq!(conversion.values[1].code_id, None);
    }
}

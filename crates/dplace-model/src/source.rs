//! Index records for datasets and phylogenies, and phylogeny taxa.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::fields::{self, Row, RowReader};
use crate::record::Record;

/// Kind of data contributed by a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Cultural,
    Environmental,
}

impl DatasetKind {
    pub const ALL: &'static [&'static str] = &["cultural", "environmental"];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Cultural => "cultural",
            DatasetKind::Environmental => "environmental",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cultural" => Ok(DatasetKind::Cultural),
            "environmental" => Ok(DatasetKind::Environmental),
            _ => Err(ValidationError::Choice {
                field: "type",
                value: s.to_string(),
                allowed: Self::ALL,
            }),
        }
    }
}

/// Provenance shared by datasets and phylogenies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub id: String,
    pub name: String,
    pub year: String,
    pub author: String,
    pub reference: String,
    pub url: String,
}

impl SourceInfo {
    fn read(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            id: r.required("id")?.to_string(),
            name: r.required("name")?.to_string(),
            year: r.optional("year").to_string(),
            author: r.optional("author").to_string(),
            reference: r.optional("reference").to_string(),
            url: r.optional("url").to_string(),
        })
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// One row of `datasets/index.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    #[serde(flatten)]
    pub source: SourceInfo,
    #[serde(rename = "type")]
    pub kind: DatasetKind,
    pub description: String,
}

impl Record for DatasetInfo {
    const NAME: &'static str = "Dataset";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "type",
        "description",
        "year",
        "author",
        "reference",
        "url",
    ];

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(Self::NAME, row);
        Ok(Self {
            source: SourceInfo::read(&r)?,
            kind: r.required("type")?.parse()?,
            description: r.optional("description").to_string(),
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.source.id.clone(),
            self.source.name.clone(),
            self.kind.to_string(),
            self.description.clone(),
            self.source.year.clone(),
            self.source.author.clone(),
            self.source.reference.clone(),
            self.source.url.clone(),
        ]
    }
}

/// One row of `phylogenies/index.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhylogenyInfo {
    #[serde(flatten)]
    pub source: SourceInfo,
    pub scaling: String,
}

impl PhylogenyInfo {
    pub fn is_glottolog(&self) -> bool {
        self.source.id.starts_with("glottolog_")
    }
}

impl Record for PhylogenyInfo {
    const NAME: &'static str = "Phylogeny";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "author",
        "year",
        "scaling",
        "reference",
        "url",
    ];

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(Self::NAME, row);
        Ok(Self {
            source: SourceInfo::read(&r)?,
            scaling: r.optional("scaling").to_string(),
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.source.id.clone(),
            self.source.name.clone(),
            self.source.author.clone(),
            self.source.year.clone(),
            self.scaling.clone(),
            self.source.reference.clone(),
            self.source.url.clone(),
        ]
    }
}

/// Maps a tree leaf to a Glottocode and to societies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxon {
    pub taxon: String,
    pub glottocode: String,
    pub xd_ids: Vec<String>,
    pub soc_ids: Vec<String>,
    /// Columns of `taxa.csv` beyond the known ones, kept verbatim.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Taxon {
    pub const FIELDS: &'static [&'static str] = &["taxon", "glottocode", "xd_ids", "soc_ids"];

    /// Glottocode format is not validated here; the checker reports it.
    pub fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new("Taxon", row);
        let properties = row
            .iter()
            .filter(|(key, _)| !Self::FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(Self {
            taxon: r.required("taxon")?.to_string(),
            glottocode: r.optional("glottocode").to_string(),
            xd_ids: fields::comma_split(r.optional("xd_ids")),
            soc_ids: fields::comma_split(r.optional("soc_ids")),
            properties,
        })
    }

    pub fn columns(&self) -> Vec<String> {
        Self::FIELDS
            .iter()
            .map(|field| (*field).to_string())
            .chain(self.properties.keys().cloned())
            .collect()
    }

    pub fn values(&self) -> Vec<String> {
        vec![
            self.taxon.clone(),
            self.glottocode.clone(),
            fields::comma_join(&self.xd_ids),
            fields::comma_join(&self.soc_ids),
        ]
        .into_iter()
        .chain(self.properties.values().cloned())
        .collect()
    }
}

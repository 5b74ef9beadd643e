//! Table descriptions of the output package and its metadata document.
//!
//! The metadata follows the CSVW layout used by CLDF StructureDatasets:
//! one entry per table with its columns, primary key and foreign keys.
//! The same description drives writing and the post-write validation.

use serde::{Deserialize, Serialize};

pub const TERMS: &str = "http://cldf.clld.org/v1.0/terms.rdf";
pub const METADATA_FILE: &str = "StructureDataset-metadata.json";
pub const SOURCES_FILE: &str = "sources.bib";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "propertyUrl", default, skip_serializing_if = "Option::is_none")]
    pub property_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl Column {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            property_url: None,
            separator: None,
            datatype: None,
        }
    }

    /// A column carrying a CLDF term, e.g. `id` or `languageReference`.
    pub fn term(name: &str, term: &str) -> Self {
        Self {
            property_url: Some(format!("{TERMS}#{term}")),
            ..Self::new(name)
        }
    }

    pub fn is_term(&self, term: &str) -> bool {
        self.property_url
            .as_deref()
            .and_then(|url| url.strip_prefix(TERMS))
            .is_some_and(|fragment| fragment.strip_prefix('#') == Some(term))
    }

    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = Some(separator.to_string());
        self
    }

    pub fn datatype(mut self, datatype: &str) -> Self {
        self.datatype = Some(datatype.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub resource: String,
    #[serde(rename = "columnReference")]
    pub column_reference: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    #[serde(rename = "columnReference")]
    pub column_reference: Vec<String>,
    pub reference: Reference,
}

impl ForeignKey {
    /// `column` references the `ID` column of `resource`.
    pub fn to_id(column: &str, resource: &str) -> Self {
        Self {
            column_reference: vec![column.to_string()],
            reference: Reference {
                resource: resource.to_string(),
                column_reference: vec!["ID".to_string()],
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<Column>,
    #[serde(rename = "primaryKey")]
    pub primary_key: Vec<String>,
    #[serde(rename = "foreignKeys", default)]
    pub foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub url: String,
    #[serde(rename = "dc:conformsTo", default, skip_serializing_if = "Option::is_none")]
    pub conforms_to: Option<String>,
    #[serde(rename = "tableSchema")]
    pub table_schema: TableSchema,
}

impl Table {
    pub fn header(&self) -> Vec<&str> {
        self.table_schema
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.table_schema.columns.iter().find(|c| c.name == name)
    }
}

/// The metadata document written next to the tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "@context")]
    pub context: serde_json::Value,
    #[serde(rename = "dc:conformsTo")]
    pub conforms_to: String,
    #[serde(rename = "dc:title")]
    pub title: String,
    #[serde(rename = "dc:source")]
    pub source: String,
    pub tables: Vec<Table>,
}

impl Metadata {
    pub fn new(title: impl Into<String>, tables: Vec<Table>) -> Self {
        Self {
            context: serde_json::json!(["http://www.w3.org/ns/csvw", {"@language": "en"}]),
            conforms_to: format!("{TERMS}#StructureDataset"),
            title: title.into(),
            source: SOURCES_FILE.to_string(),
            tables,
        }
    }

    pub fn table(&self, url: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.url == url)
    }
}

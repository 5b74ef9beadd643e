//! Validation of a written package against its own metadata.
//!
//! Reads the metadata document back and checks, for every table, that the
//! header matches the declared columns, that primary keys are present and
//! unique, that every foreign key resolves, and that every cited source is
//! in the package bibliography.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use dplace_ingest::BibFile;
use dplace_ingest::csv::{CsvTable, read_dicts};
use dplace_ingest::files::read_text;
use dplace_model::Row;

use crate::schema::{Column, METADATA_FILE, Metadata, SOURCES_FILE, Table};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingColumn { table: String, column: String },
    MissingKey { table: String, row: usize },
    DuplicateKey { table: String, key: String },
    UnknownTable { table: String, reference: String },
    DanglingReference {
        table: String,
        column: String,
        value: String,
        target: String,
    },
    UnknownSource { table: String, key: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingColumn { table, column } => {
                write!(f, "{table}: missing column {column}")
            }
            Violation::MissingKey { table, row } => {
                write!(f, "{table}: row {row} has an empty primary key")
            }
            Violation::DuplicateKey { table, key } => {
                write!(f, "{table}: duplicate primary key {key}")
            }
            Violation::UnknownTable { table, reference } => {
                write!(f, "{table}: foreign key to unknown table {reference}")
            }
            Violation::DanglingReference {
                table,
                column,
                value,
                target,
            } => write!(f, "{table}: {column} {value} not found in {target}"),
            Violation::UnknownSource { table, key } => {
                write!(f, "{table}: source {key} missing from {SOURCES_FILE}")
            }
        }
    }
}

/// Validate the package in `dir`; an empty list means it is valid.
pub fn validate_package(dir: &Path) -> Result<Vec<Violation>> {
    let metadata_path = dir.join(METADATA_FILE);
    let metadata: Metadata = serde_json::from_str(&read_text(&metadata_path)?)
        .with_context(|| format!("parse {}", metadata_path.display()))?;

    let mut loaded = BTreeMap::new();
    for table in &metadata.tables {
        let data = read_dicts(&dir.join(&table.url))?;
        loaded.insert(table.url.as_str(), data);
    }
    let bib_path = dir.join(&metadata.source);
    let sources = if bib_path.exists() {
        BibFile::load(&bib_path)?
    } else {
        BibFile::default()
    };

    let mut violations = Vec::new();
    let mut keys: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for table in &metadata.tables {
        let data = &loaded[table.url.as_str()];
        check_columns(table, data, &mut violations);
        keys.insert(&table.url, primary_keys(table, data, &mut violations));
    }
    for table in &metadata.tables {
        let data = &loaded[table.url.as_str()];
        check_foreign_keys(table, data, &keys, &mut violations);
        check_sources(table, data, &sources, &mut violations);
    }

    tracing::info!(
        dir = %dir.display(),
        violations = violations.len(),
        "validated dataset package"
    );
    Ok(violations)
}

fn check_columns(table: &Table, data: &CsvTable, violations: &mut Vec<Violation>) {
    for column in &table.table_schema.columns {
        if !data.header.contains(&column.name) {
            violations.push(Violation::MissingColumn {
                table: table.url.clone(),
                column: column.name.clone(),
            });
        }
    }
}

fn primary_keys<'a>(
    table: &Table,
    data: &'a CsvTable,
    violations: &mut Vec<Violation>,
) -> BTreeSet<&'a str> {
    let mut seen = BTreeSet::new();
    for (i, row) in data.rows.iter().enumerate() {
        let key = key_of(row, &table.table_schema.primary_key);
        if key.is_empty() {
            violations.push(Violation::MissingKey {
                table: table.url.clone(),
                row: i + 1,
            });
        } else if !seen.insert(key) {
            violations.push(Violation::DuplicateKey {
                table: table.url.clone(),
                key: key.to_string(),
            });
        }
    }
    seen
}

/// Primary keys here are single-column; the first column names the key.
fn key_of<'a>(row: &'a Row, columns: &[String]) -> &'a str {
    columns
        .first()
        .and_then(|column| row.get(column))
        .map(String::as_str)
        .unwrap_or("")
}

/// Values of a cell, split when the column is a list.
fn cell_values<'a>(column: Option<&Column>, value: &'a str) -> Vec<&'a str> {
    match column.and_then(|c| c.separator.as_deref()) {
        Some(separator) => value
            .split(separator)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect(),
        None if value.is_empty() => Vec::new(),
        None => vec![value],
    }
}

fn check_foreign_keys(
    table: &Table,
    data: &CsvTable,
    keys: &BTreeMap<&str, BTreeSet<&str>>,
    violations: &mut Vec<Violation>,
) {
    for foreign_key in &table.table_schema.foreign_keys {
        let target = &foreign_key.reference.resource;
        let Some(target_keys) = keys.get(target.as_str()) else {
            violations.push(Violation::UnknownTable {
                table: table.url.clone(),
                reference: target.clone(),
            });
            continue;
        };
        let Some(column_name) = foreign_key.column_reference.first() else {
            continue;
        };
        let column = table.column(column_name);
        for row in &data.rows {
            let cell = row.get(column_name).map(String::as_str).unwrap_or("");
            for value in cell_values(column, cell) {
                if !target_keys.contains(value) {
                    violations.push(Violation::DanglingReference {
                        table: table.url.clone(),
                        column: column_name.clone(),
                        value: value.to_string(),
                        target: target.clone(),
                    });
                }
            }
        }
    }
}

fn check_sources(table: &Table, data: &CsvTable, sources: &BibFile, violations: &mut Vec<Violation>) {
    for column in &table.table_schema.columns {
        if !column.is_term("source") {
            continue;
        }
        for row in &data.rows {
            let cell = row.get(&column.name).map(String::as_str).unwrap_or("");
            for citation in cell_values(Some(column), cell) {
                let key = citation.split_once('[').map_or(citation, |(key, _)| key);
                if !sources.contains(key) {
                    violations.push(Violation::UnknownSource {
                        table: table.url.clone(),
                        key: key.to_string(),
                    });
                }
            }
        }
    }
}

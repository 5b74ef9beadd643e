//! Writing a conversion to disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use dplace_ingest::csv::write_rows;
use dplace_ingest::files::write_atomic;

use crate::convert::Conversion;
use crate::schema::{METADATA_FILE, Metadata, SOURCES_FILE};
use crate::tables::{TableRow, tables};

const LICENSE_FILE: &str = "LICENSE.txt";

/// Write tables, bibliography and metadata to `out_dir`.
///
/// `license`, when given and present, is copied next to the tables.
pub fn write_package(conversion: &Conversion, out_dir: &Path, license: Option<&Path>) -> Result<Metadata> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;

    write_table(out_dir, &conversion.datasets)?;
    write_table(out_dir, &conversion.languages)?;
    write_table(out_dir, &conversion.parameters)?;
    write_table(out_dir, &conversion.codes)?;
    write_table(out_dir, &conversion.values)?;
    write_table(out_dir, &conversion.relations)?;

    conversion
        .sources
        .save(&out_dir.join(SOURCES_FILE))
        .context("write bibliography")?;

    let metadata = Metadata::new(conversion.title.clone(), tables());
    let json = serde_json::to_string_pretty(&metadata).context("serialize metadata")?;
    write_atomic(&out_dir.join(METADATA_FILE), json.as_bytes()).context("write metadata")?;

    if let Some(license) = license.filter(|path| path.exists()) {
        let target = out_dir.join(LICENSE_FILE);
        fs::copy(license, &target)
            .with_context(|| format!("copy {} to {}", license.display(), target.display()))?;
    }

    tracing::info!(dir = %out_dir.display(), "wrote dataset package");
    Ok(metadata)
}

fn write_table<T: TableRow>(out_dir: &Path, rows: &[T]) -> Result<()> {
    let table = T::table();
    let path = out_dir.join(&table.url);
    write_rows(&path, &table.header(), rows.iter().map(T::cells))
        .with_context(|| format!("write {}", table.url))?;
    tracing::debug!(table = %table.url, rows = rows.len(), "wrote table");
    Ok(())
}

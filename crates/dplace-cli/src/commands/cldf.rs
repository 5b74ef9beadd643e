use std::path::PathBuf;

use anyhow::{Context, Result};
use dplace_geo::Regions;
use dplace_ingest::{Repository, paths};
use dplace_output::{
    ConversionOptions, Violation, convert_dataset_dir, convert_repository, validate_package,
    write_package,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CldfOptions {
    pub out_dir: PathBuf,
    /// Convert this raw dataset directory instead of the repository.
    pub dataset_dir: Option<PathBuf>,
    /// GeoJSON regions used to label societies.
    pub regions: Option<PathBuf>,
    pub conversion: ConversionOptions,
}

/// Convert and write the package; returns the validation violations,
/// which are always empty in dev mode.
pub fn run_cldf(repos: &Repository, options: &CldfOptions) -> Result<Vec<Violation>> {
    let regions = options
        .regions
        .as_deref()
        .map(Regions::load)
        .transpose()
        .context("load regions")?;

    let conversion = match &options.dataset_dir {
        Some(dir) => convert_dataset_dir(dir, regions.as_ref(), options.conversion)?,
        None => convert_repository(repos, regions.as_ref(), options.conversion)?,
    };
    let license = repos.path(paths::LICENSE);
    write_package(&conversion, &options.out_dir, Some(&license))?;

    if options.conversion.dev {
        tracing::info!("skipping package validation");
        return Ok(Vec::new());
    }
    let violations = validate_package(&options.out_dir)?;
    for violation in &violations {
        tracing::error!("{violation}");
    }
    Ok(violations)
}

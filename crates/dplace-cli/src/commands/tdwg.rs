use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use dplace_geo::Regions;
use dplace_ingest::files::{read_text, write_atomic};
use dplace_ingest::{Repository, paths};
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

const NAME_PROPERTY: &str = "REGION_NAM";
const CODE_PROPERTY: &str = "TDWG_CODE";

/// A society's TDWG level-2 region, with the coordinates it was matched at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdwgAssignment {
    pub lat: f64,
    pub lon: f64,
    pub name: Option<String>,
    pub code: Option<String>,
}

impl TdwgAssignment {
    /// Already coded for these coordinates.
    fn is_current(&self, lat: f64, lon: f64) -> bool {
        is_close(self.lat, lat)
            && is_close(self.lon, lon)
            && self.code.as_deref().is_some_and(|code| !code.is_empty())
    }
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TdwgSummary {
    pub contained: usize,
    pub nearest: usize,
    pub unchanged: usize,
}

pub type TdwgAssignments = BTreeMap<String, TdwgAssignment>;

fn read_assignments(path: &Path) -> Result<TdwgAssignments> {
    if !path.exists() {
        return Ok(TdwgAssignments::new());
    }
    serde_json::from_str(&read_text(path)?).with_context(|| format!("parse {}", path.display()))
}

fn write_assignments(path: &Path, assignments: &TdwgAssignments) -> Result<()> {
    let mut bytes = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b"    "));
    assignments
        .serialize(&mut serializer)
        .context("serialize region assignments")?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)?;
    Ok(())
}

/// Assign every society to a TDWG level-2 region and update
/// `geo/societies_tdwg.json`.
pub fn assign_regions(repos: &Repository) -> Result<TdwgSummary> {
    let regions_path = repos.path(paths::TDWG_REGIONS);
    if !regions_path.exists() {
        bail!(
            "dependency missing: this command needs the TDWG regions in {}",
            regions_path.display()
        );
    }
    let regions = Regions::load(&regions_path)?;
    let assignments_path = repos.path(paths::SOCIETIES_TDWG);
    let mut assignments = read_assignments(&assignments_path)?;

    let mut summary = TdwgSummary::default();
    for dataset in repos.datasets()? {
        for society in dataset.societies()? {
            if assignments
                .get(&society.id)
                .is_some_and(|current| current.is_current(society.lat, society.long))
            {
                summary.unchanged += 1;
                continue;
            }
            let found = regions.match_point(society.long, society.lat)?;
            let name = found.region.property(NAME_PROPERTY);
            if found.is_contained() {
                tracing::info!(society = %society, region = ?name, "contained in region");
                summary.contained += 1;
            } else {
                tracing::warn!(
                    society = %society,
                    region = ?name,
                    distance = found.distance,
                    "assigning to nearest region"
                );
                summary.nearest += 1;
            }
            assignments.insert(
                society.id.clone(),
                TdwgAssignment {
                    lat: society.lat,
                    lon: society.long,
                    name,
                    code: found.region.property(CODE_PROPERTY),
                },
            );
        }
    }

    write_assignments(&assignments_path, &assignments)?;
    tracing::info!(
        contained = summary.contained,
        nearest = summary.nearest,
        unchanged = summary.unchanged,
        "assigned regions"
    );
    Ok(summary)
}

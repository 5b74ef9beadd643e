//! Region matching for society coordinates.
//!
//! Regions are read from a GeoJSON `FeatureCollection` of `Polygon` and
//! `MultiPolygon` features. A point is assigned to the region containing it
//! or, failing that, to the nearest region by planar distance in degrees.

use std::path::{Path, PathBuf};

use geo::{Contains, Coord, Distance, Euclidean, LineString, MultiPolygon, Point, Polygon};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid GeoJSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("feature {index}: {message}")]
    Geometry { index: usize, message: String },

    #[error("no regions to match against")]
    EmptyFeatureSet,
}

pub type Result<T> = std::result::Result<T, GeoError>;

/// A labeled area.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub properties: Map<String, Value>,
    pub geometry: MultiPolygon<f64>,
}

impl Region {
    /// A property rendered as text; numbers are formatted, null is absent.
    pub fn property(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Outcome of [`Regions::match_point`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionMatch<'a> {
    pub region: &'a Region,
    /// Zero when the region contains the point.
    pub distance: f64,
}

impl RegionMatch<'_> {
    pub fn is_contained(&self) -> bool {
        self.distance == 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Regions {
    regions: Vec<Region>,
}

impl Regions {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GeoError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let regions = Self::from_geojson(&text)?;
        tracing::debug!(path = %path.display(), regions = regions.len(), "loaded regions");
        Ok(regions)
    }

    pub fn from_geojson(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)?;
        let features = document
            .get("features")
            .and_then(Value::as_array)
            .ok_or(GeoError::Geometry {
                index: 0,
                message: "not a FeatureCollection".to_string(),
            })?;
        let regions = features
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                parse_feature(feature).map_err(|message| GeoError::Geometry { index, message })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// The region containing `(lon, lat)`, else the nearest one.
    pub fn match_point(&self, lon: f64, lat: f64) -> Result<RegionMatch<'_>> {
        let point = Point::new(lon, lat);
        let mut nearest: Option<RegionMatch<'_>> = None;
        for region in &self.regions {
            if region.geometry.contains(&point) {
                return Ok(RegionMatch {
                    region,
                    distance: 0.0,
                });
            }
            let distance = region
                .geometry
                .iter()
                .map(|polygon| Euclidean::distance(&point, polygon))
                .fold(f64::INFINITY, f64::min);
            if nearest.is_none_or(|best| distance < best.distance) {
                nearest = Some(RegionMatch { region, distance });
            }
        }
        nearest.ok_or(GeoError::EmptyFeatureSet)
    }
}

fn parse_feature(feature: &Value) -> std::result::Result<Region, String> {
    let properties = feature
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let geometry = feature
        .get("geometry")
        .ok_or_else(|| "missing geometry".to_string())?;
    let coordinates = geometry
        .get("coordinates")
        .ok_or_else(|| "missing coordinates".to_string())?;
    let polygons = match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => vec![polygon(coordinates)?],
        Some("MultiPolygon") => coordinates
            .as_array()
            .ok_or_else(|| "MultiPolygon coordinates must be an array".to_string())?
            .iter()
            .map(polygon)
            .collect::<std::result::Result<Vec<_>, _>>()?,
        other => return Err(format!("unsupported geometry type {other:?}")),
    };
    Ok(Region {
        properties,
        geometry: MultiPolygon::new(polygons),
    })
}

fn polygon(rings: &Value) -> std::result::Result<Polygon<f64>, String> {
    let mut rings = rings
        .as_array()
        .ok_or_else(|| "polygon must be an array of rings".to_string())?
        .iter()
        .map(ring);
    let exterior = rings
        .next()
        .ok_or_else(|| "polygon without exterior ring".to_string())??;
    let interiors = rings.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn ring(positions: &Value) -> std::result::Result<LineString<f64>, String> {
    positions
        .as_array()
        .ok_or_else(|| "ring must be an array of positions".to_string())?
        .iter()
        .map(|position| {
            let x = position.get(0).and_then(Value::as_f64);
            let y = position.get(1).and_then(Value::as_f64);
            match (x, y) {
                (Some(x), Some(y)) => Ok(Coord { x, y }),
                _ => Err(format!("invalid position {position}")),
            }
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(LineString::new)
}

//! Zone boundary records from the boundary source.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use geo::Coord;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use super::geometry::{RawPolygon, RawRing};
use crate::error::BuildError;

/// Zone id used by tz_world for areas without a time zone
pub const UNINHABITED: &str = "uninhabited";

/// A raw boundary record: zone id plus unvalidated geometry.
///
/// Any coordinate-reference-system normalization is the source's job;
/// coordinates here are already WGS84 lon/lat.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneBoundary {
    pub zone_id: String,
    /// Polygon parts. A `Polygon` source geometry yields one part.
    pub parts: Vec<RawPolygon>,
}

impl ZoneBoundary {
    pub fn new(zone_id: impl Into<String>, parts: Vec<RawPolygon>) -> Self {
        Self {
            zone_id: zone_id.into(),
            parts,
        }
    }
}

/// Supplies boundary records in a stable order.
pub trait BoundarySource {
    fn boundaries(&self) -> Result<Vec<ZoneBoundary>, BuildError>;
}

impl BoundarySource for Vec<ZoneBoundary> {
    fn boundaries(&self) -> Result<Vec<ZoneBoundary>, BuildError> {
        Ok(self.clone())
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<GeometryJson>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeometryJson {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

/// GeoJSON `FeatureCollection` of time-zone polygons (tz_world layout).
pub struct GeoJsonBoundaries {
    path: PathBuf,
    zone_property: String,
}

impl GeoJsonBoundaries {
    pub fn new(path: impl Into<PathBuf>, zone_property: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            zone_property: zone_property.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a feature collection from any reader
    pub fn parse<R: Read>(reader: R, zone_property: &str) -> Result<Vec<ZoneBoundary>, BuildError> {
        let collection: FeatureCollection = serde_json::from_reader(reader)?;

        let boundaries = collection
            .features
            .into_iter()
            .map(|feature| {
                let zone_id = feature
                    .properties
                    .as_ref()
                    .and_then(|props| props.get(zone_property))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();

                // Unsupported or missing geometry becomes an empty part list
                // and is rejected during validation.
                let parts = match feature.geometry {
                    Some(GeometryJson::Polygon { coordinates }) => vec![polygon_parts(coordinates)],
                    Some(GeometryJson::MultiPolygon { coordinates }) => {
                        coordinates.into_iter().map(polygon_parts).collect()
                    }
                    Some(GeometryJson::Unsupported) | None => Vec::new(),
                };

                ZoneBoundary { zone_id, parts }
            })
            .collect();

        Ok(boundaries)
    }
}

impl BoundarySource for GeoJsonBoundaries {
    fn boundaries(&self) -> Result<Vec<ZoneBoundary>, BuildError> {
        info!("Reading zone boundaries from {}", self.path.display());
        let file = File::open(&self.path).map_err(|e| BuildError::io(&self.path, e))?;
        let boundaries = Self::parse(BufReader::new(file), &self.zone_property)?;
        info!("Read {} boundary records", boundaries.len());
        Ok(boundaries)
    }
}

fn polygon_parts(rings: Vec<Vec<Vec<f64>>>) -> RawPolygon {
    rings.into_iter().map(ring_coords).collect()
}

/// Positions are `[lon, lat, ...]`; a short position becomes NaN and fails
/// ring validation.
fn ring_coords(positions: Vec<Vec<f64>>) -> RawRing {
    positions
        .into_iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Coord { x: *x, y: *y },
            _ => Coord {
                x: f64::NAN,
                y: f64::NAN,
            },
        })
        .collect()
}

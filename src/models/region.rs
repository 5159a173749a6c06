//! Time-zone region types.

use geo::{BoundingRect, MultiPolygon};
use serde::{Deserialize, Serialize};

/// Per-zone attributes joined from the zone metadata source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneInfo {
    /// ISO 3166-1 alpha-2 code of the country the zone belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,

    /// GMT offset in hours (January)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmt_offset: Option<f64>,

    /// DST offset in hours (July)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_offset: Option<f64>,

    /// Offset in hours independent of DST
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_offset: Option<f64>,
}

/// A named multi-polygon carrying time-zone and country association data.
///
/// Regions are immutable once built; the index owns them behind `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Olson-style zone key, e.g. "America/Argentina/Buenos_Aires"
    pub zone_id: String,

    /// Display name in the alternate naming convention
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Daylight display name in the alternate naming convention
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daylight_name: Option<String>,

    #[serde(flatten)]
    pub info: ZoneInfo,

    /// Disjoint parts, `x = lon`, `y = lat`
    pub geometry: MultiPolygon<f64>,
}

impl Region {
    pub fn country_code(&self) -> Option<&str> {
        self.info.country_code.as_deref()
    }

    /// Get the bounding box of this region
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

/// Lookup result without the geometry, for display.
#[derive(Debug, Clone, Serialize)]
pub struct RegionSummary<'a> {
    pub zone_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daylight_name: Option<&'a str>,
    #[serde(flatten)]
    pub info: &'a ZoneInfo,
}

impl<'a> From<&'a Region> for RegionSummary<'a> {
    fn from(region: &'a Region) -> Self {
        Self {
            zone_id: &region.zone_id,
            display_name: region.display_name.as_deref(),
            daylight_name: region.daylight_name.as_deref(),
            info: &region.info,
        }
    }
}

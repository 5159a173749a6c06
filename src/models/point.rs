//! Query coordinates.

use geo::Coord;
use serde::{Deserialize, Serialize};

/// Geographic point (lat/lon) in decimal degrees.
///
/// Geometry is stored with `x = lon, y = lat`, so conversions go through
/// [`GeoPoint::coord`] rather than building a `Coord` by hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar coordinate of this point (`x = lon`, `y = lat`)
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }

    /// Parse "lat,lon"
    pub fn parse(s: &str) -> Option<Self> {
        let (lat, lon) = s.split_once(',')?;
        let lat: f64 = lat.trim().parse().ok()?;
        let lon: f64 = lon.trim().parse().ok()?;
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        Some(Self { lat, lon })
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_axis_order() {
        let p = GeoPoint::new(-34.6379425, -58.3756365);
        let c = p.coord();
        assert_eq!(c.x, -58.3756365);
        assert_eq!(c.y, -34.6379425);
    }

    #[test]
    fn test_parse_keeps_legacy_precision() {
        let p = GeoPoint::parse("-41.2443701, 174.7618546").unwrap();
        assert_eq!(p.lat, -41.2443701);
        assert_eq!(p.lon, 174.7618546);
        assert_eq!(p.to_string(), "-41.2443701, 174.7618546");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(GeoPoint::parse("12.5").is_none());
        assert!(GeoPoint::parse("a,b").is_none());
        assert!(GeoPoint::parse("NaN,1").is_none());
    }
}

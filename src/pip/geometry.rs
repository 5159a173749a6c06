//! Planar geometry primitives for zone boundaries.
//!
//! All computation happens in degree space (`x = lon`, `y = lat`). Distances
//! are Euclidean in degrees: longitude wrap at ±180° is not handled and
//! latitude compression near the poles is not corrected.
//!
//! Boundary rule for containment: a point on an exterior ring edge is inside,
//! a point on a hole edge is also inside (holes exclude only their interior).

use geo::{
    Area, ConvexHull, Coord, Distance, Euclidean, LineString, MultiPolygon, Point, Polygon,
    Simplify, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GeometryError;

/// Unvalidated ring as read from a boundary source
pub type RawRing = Vec<Coord<f64>>;

/// Unvalidated polygon: exterior ring first, then holes
pub type RawPolygon = Vec<RawRing>;

/// Validate a closed ring.
///
/// `geo` silently closes rings on construction, so this has to run on the raw
/// coordinates before any `Polygon` is built.
pub fn validate_ring(coords: RawRing) -> Result<LineString<f64>, GeometryError> {
    if coords.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(GeometryError::BadPosition);
    }
    if coords.len() < 3 {
        return Err(GeometryError::TooFewPoints);
    }
    if coords.first() != coords.last() {
        return Err(GeometryError::UnclosedRing);
    }
    // first == last, so 4 positions are 3 distinct points
    if coords.len() < 4 {
        return Err(GeometryError::TooFewPoints);
    }
    Ok(LineString::new(coords))
}

/// Build a polygon from an exterior ring and optional holes
pub fn build_polygon(rings: RawPolygon) -> Result<Polygon<f64>, GeometryError> {
    let mut rings = rings.into_iter();
    let exterior = validate_ring(rings.next().ok_or(GeometryError::EmptyGeometry)?)?;
    let interiors = rings.map(validate_ring).collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Build a multi-polygon; any invalid part rejects the whole geometry
pub fn build_multi_polygon(parts: Vec<RawPolygon>) -> Result<MultiPolygon<f64>, GeometryError> {
    if parts.is_empty() {
        return Err(GeometryError::EmptyGeometry);
    }
    let polygons = parts
        .into_iter()
        .map(build_polygon)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MultiPolygon::new(polygons))
}

/// Where a point lies relative to a single ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingPosition {
    Inside,
    Boundary,
    Outside,
}

/// Crossing-number test with an exact on-edge check.
pub fn ring_position(ring: &LineString<f64>, p: Coord<f64>) -> RingPosition {
    let mut inside = false;
    for line in ring.lines() {
        let (a, b) = (line.start, line.end);
        if on_segment(p, a, b) {
            return RingPosition::Boundary;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }
    if inside {
        RingPosition::Inside
    } else {
        RingPosition::Outside
    }
}

fn on_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    cross == 0.0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

fn ring_distance(ring: &LineString<f64>, p: Coord<f64>) -> f64 {
    Euclidean.distance(&Point::from(p), ring)
}

/// Point containment and distance for zone geometries.
pub trait PointLocation {
    /// True if the point is inside (boundary-inclusive, see module docs)
    fn contains_point(&self, p: Coord<f64>) -> bool;

    /// Minimum planar distance to any boundary, 0 when contained
    fn distance_to_point(&self, p: Coord<f64>) -> f64;
}

impl PointLocation for Polygon<f64> {
    fn contains_point(&self, p: Coord<f64>) -> bool {
        if ring_position(self.exterior(), p) == RingPosition::Outside {
            return false;
        }
        self.interiors()
            .iter()
            .all(|hole| ring_position(hole, p) != RingPosition::Inside)
    }

    fn distance_to_point(&self, p: Coord<f64>) -> f64 {
        if self.contains_point(p) {
            return 0.0;
        }
        std::iter::once(self.exterior())
            .chain(self.interiors())
            .map(|ring| ring_distance(ring, p))
            .fold(f64::INFINITY, f64::min)
    }
}

impl PointLocation for MultiPolygon<f64> {
    fn contains_point(&self, p: Coord<f64>) -> bool {
        self.0.iter().any(|poly| poly.contains_point(p))
    }

    fn distance_to_point(&self, p: Coord<f64>) -> f64 {
        let mut best = f64::INFINITY;
        for poly in &self.0 {
            let d = poly.distance_to_point(p);
            if d == 0.0 {
                return 0.0;
            }
            best = best.min(d);
        }
        best
    }
}

/// Build-time simplification settings.
///
/// Defaults are the legacy importer constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplifyOptions {
    /// First tolerance tried, in degrees
    pub initial_tolerance: f64,
    /// Amount the tolerance is relaxed after each invalid result
    pub tolerance_step: f64,
    /// Polygons with less area (square degrees) are replaced by their convex hull
    pub hull_area_threshold: f64,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            initial_tolerance: 0.05,
            tolerance_step: 0.005,
            hull_area_threshold: 0.1,
        }
    }
}

/// Simplify every part of a region, keeping each part valid.
pub fn simplify_region(geometry: &MultiPolygon<f64>, opts: &SimplifyOptions) -> MultiPolygon<f64> {
    MultiPolygon::new(
        geometry
            .0
            .iter()
            .map(|poly| simplify_polygon(poly, opts))
            .collect(),
    )
}

/// Simplify a polygon, relaxing the tolerance until the result is valid.
///
/// Near-degenerate polygons become their convex hull. If no tolerance yields
/// a valid polygon the input is returned unchanged.
pub fn simplify_polygon(poly: &Polygon<f64>, opts: &SimplifyOptions) -> Polygon<f64> {
    if poly.unsigned_area() < opts.hull_area_threshold {
        return poly.convex_hull();
    }

    let steps = if opts.tolerance_step > 0.0 {
        (opts.initial_tolerance / opts.tolerance_step).round() as usize
    } else {
        1
    };

    for i in 0..steps {
        let tolerance = opts.initial_tolerance - opts.tolerance_step * i as f64;
        if tolerance <= 0.0 {
            break;
        }
        let candidate = poly.simplify(tolerance);
        if is_valid_polygon(&candidate) {
            if i > 0 {
                debug!("Simplified at relaxed tolerance {}", tolerance);
            }
            return candidate;
        }
        debug!("Simplification at tolerance {} invalid, relaxing", tolerance);
    }

    debug!("No valid simplification, keeping original polygon");
    poly.clone()
}

/// OGC-valid with non-zero area. `geo` accepts rings collapsed onto a line,
/// which are useless as zone shapes.
pub fn is_valid_polygon(poly: &Polygon<f64>) -> bool {
    poly.unsigned_area() > 0.0 && poly.is_valid()
}

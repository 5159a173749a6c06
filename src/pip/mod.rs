//! Point-in-Polygon (PIP) time-zone lookup.
//!
//! Validates zone boundaries into regions and answers point queries using an
//! R-tree spatial index with containment-then-nearest fallback.

mod boundary;
pub mod geometry;
mod index;
mod service;

pub use boundary::{BoundarySource, GeoJsonBoundaries, ZoneBoundary, UNINHABITED};
pub use geometry::{PointLocation, RawPolygon, RawRing, SimplifyOptions};
pub use index::{BuildOptions, BuildReport, RegionIndex};
pub use service::{LookupService, ServiceHandle, FALLBACK_THRESHOLD};

//! Error taxonomy for the build phase.
//!
//! Lookups never fail: absence of a region or country is `None`. Everything
//! here is raised while validating source data, before an index or catalog is
//! published.

use std::path::PathBuf;
use thiserror::Error;

/// A malformed boundary geometry. Never fatal; the record is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum GeometryError {
    #[error("ring has fewer than 3 distinct points")]
    TooFewPoints,

    #[error("ring is not closed")]
    UnclosedRing,

    #[error("position has fewer than 2 ordinates or a non-finite value")]
    BadPosition,

    #[error("geometry has no polygons")]
    EmptyGeometry,
}

/// Why a boundary record was excluded from the region index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SkipReason {
    #[error("empty zone id")]
    EmptyZoneId,

    #[error("uninhabited zone")]
    UninhabitedZone,

    #[error("invalid geometry: {0}")]
    InvalidGeometry(GeometryError),
}

/// Fatal build failure. A service is never published from a failed build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("duplicate country code '{iso}'")]
    DuplicateKey { iso: String },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse delimited source")]
    Csv(#[from] csv::Error),

    #[error("failed to parse JSON source")]
    Json(#[from] serde_json::Error),

    #[error("malformed {source_name} record at line {line}: {reason}")]
    Malformed {
        source_name: &'static str,
        line: u64,
        reason: String,
    },

    #[error("unusable snapshot: {0}")]
    Snapshot(String),
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}

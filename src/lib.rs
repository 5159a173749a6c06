//! Sextant - reverse geographic lookup
//!
//! Resolves a latitude/longitude to the time-zone region containing it (or the
//! nearest one within a tolerance) and to the country owning that region.
//! Shared by the ingest and query binaries.

pub mod config;
pub mod countries;
pub mod error;
pub mod metadata;
pub mod models;
pub mod pip;
pub mod snapshot;

#[cfg(test)]
mod testing;

pub use countries::CountryCatalog;
pub use error::BuildError;
pub use models::{Country, GeoPoint, Region};
pub use pip::{LookupService, RegionIndex};

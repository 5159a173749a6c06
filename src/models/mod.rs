//! Core data models for the reverse-lookup engine.

pub mod country;
pub mod point;
pub mod region;

pub use country::{Country, CountryRow};
pub use point::GeoPoint;
pub use region::{Region, RegionSummary, ZoneInfo};

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pip::{BuildOptions, SimplifyOptions, FALLBACK_THRESHOLD};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub sources: SourcesConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    /// GeoJSON FeatureCollection of zone boundaries
    pub boundaries: PathBuf,
    /// Feature property holding the zone id
    #[serde(default = "default_zone_property")]
    pub zone_property: String,
    /// GeoNames timeZones.txt
    pub time_zones: PathBuf,
    /// GeoNames countryInfo.txt
    pub countries: PathBuf,
    /// Optional `zone_id,standard,daylight` CSV
    #[serde(default)]
    pub zone_names: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BuildConfig {
    pub simplify: bool,
    pub initial_tolerance: f64,
    pub tolerance_step: f64,
    pub hull_area_threshold: f64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        let defaults = SimplifyOptions::default();
        Self {
            simplify: false,
            initial_tolerance: defaults.initial_tolerance,
            tolerance_step: defaults.tolerance_step,
            hull_area_threshold: defaults.hull_area_threshold,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LookupConfig {
    /// Degrees
    pub fallback_threshold: f64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            fallback_threshold: FALLBACK_THRESHOLD,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub snapshot: PathBuf,
}

fn default_zone_property() -> String {
    "TZID".to_string()
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn build_options(&self) -> BuildOptions {
        let simplify = self.build.simplify.then(|| SimplifyOptions {
            initial_tolerance: self.build.initial_tolerance,
            tolerance_step: self.build.tolerance_step,
            hull_area_threshold: self.build.hull_area_threshold,
        });
        BuildOptions { simplify }
    }
}

//! Persisted index and catalog: gzip-compressed JSON.
//!
//! The R-tree is not stored; it is rebuilt from the regions on load.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::countries::{CountryCatalog, LazyCatalog};
use crate::error::BuildError;
use crate::models::{Country, Region};
use crate::pip::{LookupService, RegionIndex};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub format_version: u32,
    pub built_at: DateTime<Utc>,
    /// Import order is significant for overlap and tie resolution
    pub regions: Vec<Region>,
    pub countries: Vec<Country>,
}

impl Snapshot {
    pub fn capture(index: &RegionIndex, catalog: &CountryCatalog) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            built_at: Utc::now(),
            regions: index.regions().map(|r| Region::clone(r)).collect(),
            countries: catalog.iter().cloned().collect(),
        }
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), BuildError> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        serde_json::to_writer(&mut encoder, self)?;
        encoder
            .finish()
            .map_err(|e| BuildError::Snapshot(format!("compression failed: {}", e)))?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BuildError> {
        let snapshot: Snapshot = serde_json::from_reader(GzDecoder::new(reader))?;
        if snapshot.format_version != FORMAT_VERSION {
            return Err(BuildError::Snapshot(format!(
                "format version {} (expected {})",
                snapshot.format_version, FORMAT_VERSION
            )));
        }
        Ok(snapshot)
    }

    pub fn write(&self, path: &Path) -> Result<(), BuildError> {
        info!(
            "Writing snapshot with {} regions and {} countries to {}",
            self.regions.len(),
            self.countries.len(),
            path.display()
        );
        let file = File::create(path).map_err(|e| BuildError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush().map_err(|e| BuildError::io(path, e))?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, BuildError> {
        info!("Loading snapshot from {}", path.display());
        let file = File::open(path).map_err(|e| BuildError::io(path, e))?;
        let snapshot = Self::from_reader(BufReader::new(file))?;
        info!(
            "Snapshot built at {} with {} regions and {} countries",
            snapshot.built_at,
            snapshot.regions.len(),
            snapshot.countries.len()
        );
        Ok(snapshot)
    }

    /// Rebuild the index and catalog. Duplicate country codes are rejected
    /// here as in any other build.
    pub fn into_service(self) -> Result<LookupService, BuildError> {
        let catalog = CountryCatalog::build(self.countries)?;
        let index = RegionIndex::from_regions(self.regions);
        Ok(LookupService::new(
            Arc::new(index),
            Arc::new(LazyCatalog::ready(catalog)),
        ))
    }
}

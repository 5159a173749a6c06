//! Per-zone metadata and display-name sources joined onto regions at build time.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use hashbrown::HashMap;
use tracing::info;

use crate::error::BuildError;
use crate::models::ZoneInfo;

/// Looks up country code and offsets for a zone id. Absence is a valid answer.
pub trait ZoneMetadataSource: Sync {
    fn zone_info(&self, zone_id: &str) -> Option<ZoneInfo>;
}

/// Maps a zone id to a display name in another naming convention.
pub trait ZoneNameMapper: Sync {
    fn display_name(&self, zone_id: &str, daylight: bool) -> Option<String>;
}

/// Mapper that never knows a name
pub struct NoZoneNames;

impl ZoneNameMapper for NoZoneNames {
    fn display_name(&self, _zone_id: &str, _daylight: bool) -> Option<String> {
        None
    }
}

impl ZoneMetadataSource for HashMap<String, ZoneInfo> {
    fn zone_info(&self, zone_id: &str) -> Option<ZoneInfo> {
        self.get(zone_id).cloned()
    }
}

/// GeoNames `timeZones.txt`
///
/// CountryCode  TimeZoneId  GMT offset  DST offset  raw offset
/// AR           America/Argentina/Buenos_Aires  -3.0  -3.0  -3.0
#[derive(Debug, Default)]
pub struct GeoNamesTimeZones {
    zones: HashMap<String, ZoneInfo>,
}

impl GeoNamesTimeZones {
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        info!("Loading zone metadata from {}", path.display());
        let file = File::open(path).map_err(|e| BuildError::io(path, e))?;
        let zones = Self::parse(file)?;
        info!("Loaded metadata for {} zones", zones.len());
        Ok(zones)
    }

    pub fn parse<R: Read>(reader: R) -> Result<Self, BuildError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);

        let mut zones = HashMap::new();
        for result in csv_reader.records() {
            let record = result?;
            let zone_id = field(&record, 1).ok_or_else(|| malformed(&record, "missing zone id"))?;

            let info = ZoneInfo {
                country_code: field(&record, 0).map(String::from),
                gmt_offset: offset(&record, 2)?,
                dst_offset: offset(&record, 3)?,
                raw_offset: offset(&record, 4)?,
            };
            zones.insert(zone_id.to_string(), info);
        }

        Ok(Self { zones })
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl ZoneMetadataSource for GeoNamesTimeZones {
    fn zone_info(&self, zone_id: &str) -> Option<ZoneInfo> {
        self.zones.get(zone_id).cloned()
    }
}

/// CSV of `zone_id,standard_name,daylight_name`, e.g. Olson to Windows names.
#[derive(Debug, Default)]
pub struct CsvZoneNames {
    names: HashMap<String, (Option<String>, Option<String>)>,
}

impl CsvZoneNames {
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        info!("Loading zone names from {}", path.display());
        let file = File::open(path).map_err(|e| BuildError::io(path, e))?;
        Self::parse(file)
    }

    pub fn parse<R: Read>(reader: R) -> Result<Self, BuildError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(reader);

        let mut names = HashMap::new();
        for result in csv_reader.records() {
            let record = result?;
            let Some(zone_id) = field(&record, 0) else {
                continue;
            };
            let standard = field(&record, 1).map(String::from);
            let daylight = field(&record, 2).map(String::from).or_else(|| standard.clone());
            names.insert(zone_id.to_string(), (standard, daylight));
        }

        Ok(Self { names })
    }
}

impl ZoneNameMapper for CsvZoneNames {
    fn display_name(&self, zone_id: &str, daylight: bool) -> Option<String> {
        let (standard, daylight_name) = self.names.get(zone_id)?;
        if daylight {
            daylight_name.clone()
        } else {
            standard.clone()
        }
    }
}

fn field(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|v| !v.is_empty())
}

fn offset(record: &StringRecord, idx: usize) -> Result<Option<f64>, BuildError> {
    match field(record, idx) {
        None => Ok(None),
        Some(v) => v
            .parse::<f64>()
            .map(Some)
            .map_err(|_| malformed(record, &format!("bad offset '{}'", v))),
    }
}

fn malformed(record: &StringRecord, reason: &str) -> BuildError {
    BuildError::Malformed {
        source_name: "time zone",
        line: record.position().map(|p| p.line()).unwrap_or(0),
        reason: reason.to_string(),
    }
}

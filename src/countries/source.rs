use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::info;

use crate::error::BuildError;
use crate::models::{Country, CountryRow};

/// Supplies raw country records for the catalog.
pub trait CountrySource: Send + Sync {
    fn countries(&self) -> Result<Vec<Country>, BuildError>;
}

impl CountrySource for Vec<Country> {
    fn countries(&self) -> Result<Vec<Country>, BuildError> {
        Ok(self.clone())
    }
}

/// GeoNames `countryInfo.txt`: tab separated, `#` comment lines, 19 columns.
pub struct GeoNamesCountries {
    path: PathBuf,
}

impl GeoNamesCountries {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse<R: Read>(reader: R) -> Result<Vec<Country>, BuildError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .quoting(false)
            .flexible(true)
            .from_reader(reader);

        let mut countries = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row: CountryRow = record.deserialize(None)?;

            if row.iso.trim().is_empty() {
                return Err(BuildError::Malformed {
                    source_name: "country",
                    line,
                    reason: "empty ISO code".to_string(),
                });
            }

            let country = Country::from_row(row).map_err(|column| BuildError::Malformed {
                source_name: "country",
                line,
                reason: format!("non-numeric {}", column),
            })?;
            countries.push(country);
        }

        Ok(countries)
    }
}

impl CountrySource for GeoNamesCountries {
    fn countries(&self) -> Result<Vec<Country>, BuildError> {
        info!("Reading countries from {}", self.path.display());
        let file = File::open(&self.path).map_err(|e| BuildError::io(&self.path, e))?;
        let countries = Self::parse(file)?;
        info!("Read {} country records", countries.len());
        Ok(countries)
    }
}

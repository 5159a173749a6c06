use std::collections::BTreeMap;

use tracing::info;

use crate::error::BuildError;
use crate::models::Country;

/// Immutable country records keyed by ISO alpha-2 code.
#[derive(Debug, Default, PartialEq)]
pub struct CountryCatalog {
    countries: BTreeMap<String, Country>,
}

impl CountryCatalog {
    /// Key records by `iso`. A repeated code fails the whole build.
    pub fn build(records: Vec<Country>) -> Result<Self, BuildError> {
        let mut countries = BTreeMap::new();
        for country in records {
            if countries.contains_key(&country.iso) {
                return Err(BuildError::DuplicateKey { iso: country.iso });
            }
            countries.insert(country.iso.clone(), country);
        }
        info!("Country catalog built with {} countries", countries.len());
        Ok(Self { countries })
    }

    pub fn get(&self, iso: &str) -> Option<&Country> {
        self.countries.get(iso)
    }

    /// Countries in ISO order
    pub fn iter(&self) -> impl Iterator<Item = &Country> {
        self.countries.values()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

//! Country attribute records.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One raw row of the GeoNames `countryInfo.txt` bulk file.
///
/// Columns are positional; empty or missing trailing fields deserialize to `None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CountryRow {
    pub iso: String,
    pub iso3: Option<String>,
    pub iso_numeric: Option<String>,
    pub fips: Option<String>,
    pub name: Option<String>,
    pub capital: Option<String>,
    pub area: Option<String>,
    pub population: Option<String>,
    pub continent: Option<String>,
    pub top_level_domain: Option<String>,
    pub currency_code: Option<String>,
    pub currency_name: Option<String>,
    pub phone: Option<String>,
    pub postal_code_format: Option<String>,
    pub postal_code_regex: Option<String>,
    pub languages: Option<String>,
    pub geoname_id: Option<String>,
    pub neighbours: Option<String>,
    pub equivalent_fips_code: Option<String>,
}

/// Country metadata keyed by ISO 3166-1 alpha-2 code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub iso: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso_numeric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fips: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capital: Option<String>,
    /// Square kilometres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_level_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code_regex: Option<String>,
    /// Language tags in source order, e.g. ["es-AR", "en", "it"]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geoname_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub neighbours: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equivalent_fips_code: Option<String>,
}

impl Country {
    /// Convert a raw row. Fails with the offending column name if a numeric
    /// column holds something other than a number.
    pub fn from_row(row: CountryRow) -> Result<Self, &'static str> {
        let area = parse_decimal(row.area.as_deref()).map_err(|_| "area")?;
        let population = parse_decimal(row.population.as_deref()).map_err(|_| "population")?;

        Ok(Self {
            iso: row.iso.trim().to_string(),
            iso3: non_empty(row.iso3),
            iso_numeric: non_empty(row.iso_numeric),
            fips: non_empty(row.fips),
            name: non_empty(row.name),
            capital: non_empty(row.capital),
            area,
            population,
            continent: non_empty(row.continent),
            top_level_domain: non_empty(row.top_level_domain),
            currency_code: non_empty(row.currency_code),
            currency_name: non_empty(row.currency_name),
            phone: non_empty(row.phone),
            postal_code_format: non_empty(row.postal_code_format),
            postal_code_regex: non_empty(row.postal_code_regex),
            languages: split_list(row.languages.as_deref()),
            geoname_id: non_empty(row.geoname_id),
            neighbours: split_list(row.neighbours.as_deref()),
            equivalent_fips_code: non_empty(row.equivalent_fips_code),
        })
    }

    /// Compiled postal code regex, `None` if absent or not a valid pattern.
    ///
    /// Keep the result when validating many codes for the same country.
    pub fn postal_code_pattern(&self) -> Option<Regex> {
        Regex::new(self.postal_code_regex.as_deref()?).ok()
    }

    /// One-off check of a postal code. Compiles the pattern on every call;
    /// use [`postal_code_pattern`](Self::postal_code_pattern) for bulk checks.
    pub fn postal_code_matches(&self, code: &str) -> Option<bool> {
        self.postal_code_pattern().map(|re| re.is_match(code))
    }
}

/// Split a comma-delimited field, dropping empty entries and keeping order.
pub fn split_list(field: Option<&str>) -> Vec<String> {
    field
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_decimal(value: Option<&str>) -> Result<Option<f64>, std::num::ParseFloatError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse::<f64>().map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argentina_row() -> CountryRow {
        CountryRow {
            iso: "AR".to_string(),
            iso3: Some("ARG".to_string()),
            iso_numeric: Some("032".to_string()),
            fips: Some("AR".to_string()),
            name: Some("Argentina".to_string()),
            capital: Some("Buenos Aires".to_string()),
            area: Some("2766890.0".to_string()),
            population: Some("44938712".to_string()),
            continent: Some("SA".to_string()),
            top_level_domain: Some(".ar".to_string()),
            currency_code: Some("ARS".to_string()),
            currency_name: Some("Peso".to_string()),
            phone: Some("54".to_string()),
            postal_code_format: Some("@####@@@".to_string()),
            postal_code_regex: Some(r"^[A-Z]?\d{4}[A-Z]{0,3}$".to_string()),
            languages: Some("es-AR,en,,it,de,fr,gn".to_string()),
            geoname_id: Some("3865483".to_string()),
            neighbours: Some("CL,BO,UY,PY,BR".to_string()),
            equivalent_fips_code: None,
        }
    }

    #[test]
    fn test_languages_keep_order_and_drop_empty() {
        let country = Country::from_row(argentina_row()).unwrap();
        assert_eq!(
            country.languages,
            vec!["es-AR", "en", "it", "de", "fr", "gn"]
        );
        assert_eq!(country.neighbours, vec!["CL", "BO", "UY", "PY", "BR"]);
    }

    #[test]
    fn test_missing_values_stay_absent() {
        let row = CountryRow {
            iso: "AQ".to_string(),
            name: Some("Antarctica".to_string()),
            capital: Some(String::new()),
            population: Some("0".to_string()),
            ..Default::default()
        };
        let country = Country::from_row(row).unwrap();
        assert_eq!(country.capital, None);
        assert_eq!(country.area, None);
        assert_eq!(country.population, Some(0.0));
        assert!(country.languages.is_empty());
    }

    #[test]
    fn test_bad_number_names_column() {
        let mut row = argentina_row();
        row.area = Some("huge".to_string());
        assert_eq!(Country::from_row(row).unwrap_err(), "area");
    }

    #[test]
    fn test_postal_code_matches() {
        let country = Country::from_row(argentina_row()).unwrap();
        assert_eq!(country.postal_code_matches("C1425DKE"), Some(true));
        assert_eq!(country.postal_code_matches("12"), Some(false));

        let mut row = argentina_row();
        row.postal_code_regex = None;
        let country = Country::from_row(row).unwrap();
        assert_eq!(country.postal_code_matches("1425"), None);
    }

    #[test]
    fn test_postal_code_pattern_reused() {
        let country = Country::from_row(argentina_row()).unwrap();
        let re = country.postal_code_pattern().unwrap();
        let codes = ["C1425DKE", "1425", "X", "B1900"];
        let matched: Vec<bool> = codes.iter().map(|c| re.is_match(c)).collect();
        assert_eq!(matched, vec![true, true, false, true]);

        let mut row = argentina_row();
        row.postal_code_regex = Some("([".to_string());
        assert!(Country::from_row(row).unwrap().postal_code_pattern().is_none());
    }
}

//! Synthetic fixtures shared by unit tests.
//!
//! Boxes are coarse stand-ins for real zone shapes, sized so the legacy landmark
//! coordinates fall inside the zone they resolve to.

use std::sync::Arc;

use geo::Coord;
use hashbrown::HashMap;

use crate::countries::{CountryCatalog, GeoNamesCountries, LazyCatalog};
use crate::metadata::NoZoneNames;
use crate::models::{Country, ZoneInfo};
use crate::pip::{BuildOptions, LookupService, RawPolygon, RegionIndex, ZoneBoundary};

pub const COUNTRY_INFO: &str = "\
# GeoNames countryInfo excerpt
#ISO\tISO3\tISO-Numeric\tfips\tCountry\tCapital\tArea(in sq km)\tPopulation\tContinent\ttld\tCurrencyCode\tCurrencyName\tPhone\tPostal Code Format\tPostal Code Regex\tLanguages\tgeonameid\tneighbours\tEquivalentFipsCode
AQ\tATA\t010\tAY\tAntarctica\t\t1.4E7\t0\tAN\t.aq\t\t\t\t\t\t\t6697173\t\t
AR\tARG\t032\tAR\tArgentina\tBuenos Aires\t2766890.0\t44938712\tSA\t.ar\tARS\tPeso\t54\t@####@@@\t^[A-Z]?\\d{4}[A-Z]{0,3}$\tes-AR,en,it,de,fr,gn\t3865483\tCL,BO,UY,PY,BR\t
NZ\tNZL\t554\tNZ\tNew Zealand\tWellington\t268680.0\t4885500\tOC\t.nz\tNZD\tDollar\t64\t####\t^(\\d{4})$\ten-NZ,mi\t2186224\t\t
US\tUSA\t840\tUS\tUnited States\tWashington\t9629091.0\t327167434\tNA\t.us\tUSD\tDollar\t1\t#####-####\t^\\d{5}(-\\d{4})?$\ten-US,es-US,haw,fr\t6252001\tCA,MX,CU\t
";

/// Closed axis-aligned box as a raw polygon
pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> RawPolygon {
    vec![closed_box(min_x, min_y, max_x, max_y)]
}

fn closed_box(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<Coord<f64>> {
    vec![
        Coord { x: min_x, y: min_y },
        Coord { x: max_x, y: min_y },
        Coord { x: max_x, y: max_y },
        Coord { x: min_x, y: max_y },
        Coord { x: min_x, y: min_y },
    ]
}

pub fn rect_boundary(zone_id: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> ZoneBoundary {
    ZoneBoundary::new(zone_id, vec![rect(min_x, min_y, max_x, max_y)])
}

/// Import-ordered boundaries. Rome has a hole exactly filled by Vatican.
pub fn sample_boundaries() -> Vec<ZoneBoundary> {
    vec![
        rect_boundary("America/Argentina/Buenos_Aires", -63.0, -41.0, -56.0, -33.0),
        rect_boundary("America/Argentina/Jujuy", -67.0, -25.0, -63.0, -21.0),
        rect_boundary("America/Phoenix", -115.0, 31.0, -109.0, 37.0),
        ZoneBoundary::new(
            "Pacific/Auckland",
            vec![
                rect(166.0, -47.0, 174.0, -40.5),
                rect(172.5, -41.5, 179.0, -34.0),
            ],
        ),
        ZoneBoundary::new(
            "Europe/Rome",
            vec![vec![
                closed_box(6.0, 36.0, 19.0, 47.0),
                closed_box(12.25, 41.75, 12.5, 42.0),
            ]],
        ),
        rect_boundary("Europe/Vatican", 12.25, 41.75, 12.5, 42.0),
        rect_boundary("Antarctica/Troll", 0.0, -75.0, 5.0, -70.0),
    ]
}

pub fn sample_zone_info() -> HashMap<String, ZoneInfo> {
    let zone = |code: &str, gmt: f64, dst: f64, raw: f64| ZoneInfo {
        country_code: Some(code.to_string()),
        gmt_offset: Some(gmt),
        dst_offset: Some(dst),
        raw_offset: Some(raw),
    };
    let mut zones = HashMap::new();
    zones.insert("America/Argentina/Buenos_Aires".to_string(), zone("AR", -3.0, -3.0, -3.0));
    zones.insert("America/Argentina/Jujuy".to_string(), zone("AR", -3.0, -3.0, -3.0));
    zones.insert("America/Phoenix".to_string(), zone("US", -7.0, -7.0, -7.0));
    zones.insert("Pacific/Auckland".to_string(), zone("NZ", 13.0, 12.0, 12.0));
    // Italy and the Vatican are not in the country excerpt
    zones.insert("Europe/Rome".to_string(), zone("IT", 1.0, 2.0, 1.0));
    zones.insert("Europe/Vatican".to_string(), zone("VA", 1.0, 2.0, 1.0));
    zones
}

pub fn sample_countries() -> Vec<Country> {
    GeoNamesCountries::parse(COUNTRY_INFO.as_bytes()).unwrap()
}

pub fn sample_index() -> RegionIndex {
    let (index, _) = RegionIndex::build(
        sample_boundaries(),
        &sample_zone_info(),
        &NoZoneNames,
        &BuildOptions::default(),
    );
    index
}

pub fn sample_service() -> LookupService {
    let catalog = CountryCatalog::build(sample_countries()).unwrap();
    LookupService::new(Arc::new(sample_index()), Arc::new(LazyCatalog::ready(catalog)))
}

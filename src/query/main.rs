//! Reverse-lookup query tool.
//!
//! Loads a snapshot and resolves points or country codes, printing JSON.
//! Without arguments it runs a fixed set of landmark points.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sextant::models::{Country, GeoPoint, RegionSummary};
use sextant::pip::{LookupService, FALLBACK_THRESHOLD};
use sextant::snapshot::Snapshot;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Landmark points resolved when no query is given
const LANDMARKS: &[(&str, f64, f64)] = &[
    ("Buenos Aires", -34.6379425, -58.3756365),
    ("Phoenix", 33.45, -112.066667),
    ("Jujuy", -24.1931095, -65.4455425),
    ("Buenos Aires (west)", -34.6158527, -58.4332985),
    ("Montevideo", -34.8198798, -56.2303067),
    ("Mendoza", -32.9264482, -68.813779),
    ("Tucuman", -26.8285851, -65.2515487),
    ("Santiago", -33.6682982, -70.363372),
    ("Wellington", -41.2443701, 174.7618546),
    ("Madrid", 40.4378271, -3.6795367),
    ("Miami", 25.8265645, -80.229947),
];

const SAMPLE_COUNTRY: &str = "AR";

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Resolve time zone and country for coordinates")]
struct Args {
    /// Snapshot written by ingest
    #[arg(short, long, default_value = "sextant.json.gz")]
    snapshot: PathBuf,

    /// Latitude in degrees
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude in degrees
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Look up a country by ISO alpha-2 code
    #[arg(long)]
    iso: Option<String>,

    /// Nearest-region fallback distance in degrees
    #[arg(long, default_value_t = FALLBACK_THRESHOLD)]
    threshold: f64,

    /// Log each lookup stage
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct PointAnswer<'a> {
    lat: f64,
    lon: f64,
    time_zone: Option<RegionSummary<'a>>,
    country: Option<&'a Country>,
    elapsed_ms: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Sextant Query");

    let start = Instant::now();
    let service = Snapshot::read(&args.snapshot)
        .and_then(Snapshot::into_service)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?
        .with_fallback_threshold(args.threshold);
    info!(
        "Loaded {} regions in {} ms",
        service.index().len(),
        start.elapsed().as_millis()
    );

    match (args.lat, args.lon, &args.iso) {
        (Some(lat), Some(lon), _) => resolve_point(&service, GeoPoint::new(lat, lon))?,
        (_, _, Some(iso)) => resolve_code(&service, iso)?,
        _ => {
            for (name, lat, lon) in LANDMARKS {
                info!("Landmark: {}", name);
                resolve_point(&service, GeoPoint::new(*lat, *lon))?;
            }
            resolve_code(&service, SAMPLE_COUNTRY)?;
        }
    }

    Ok(())
}

fn resolve_point(service: &LookupService, point: GeoPoint) -> Result<()> {
    let start = Instant::now();
    let region = service.resolve_time_zone(point);
    let country = service.resolve_country(point)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let answer = PointAnswer {
        lat: point.lat,
        lon: point.lon,
        time_zone: region.as_deref().map(RegionSummary::from),
        country,
        elapsed_ms,
    };
    println!("{}", serde_json::to_string_pretty(&answer)?);
    Ok(())
}

fn resolve_code(service: &LookupService, iso: &str) -> Result<()> {
    let start = Instant::now();
    let country = service.resolve_country_code(iso)?;
    info!("{} resolved in {:.3} ms", iso, start.elapsed().as_secs_f64() * 1000.0);
    println!("{}", serde_json::to_string_pretty(&country)?);
    Ok(())
}

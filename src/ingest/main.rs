//! Build pipeline.
//!
//! Loads zone boundaries, zone metadata and the country catalog, builds the
//! region index and writes a snapshot for the query tool.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use sextant::config::Config;
use sextant::countries::{CountryCatalog, CountrySource, GeoNamesCountries};
use sextant::metadata::{CsvZoneNames, GeoNamesTimeZones, NoZoneNames, ZoneNameMapper};
use sextant::pip::{BoundarySource, GeoJsonBoundaries, RegionIndex};
use sextant::snapshot::Snapshot;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Build the reverse-lookup snapshot from boundary and metadata files")]
struct Args {
    /// TOML config file
    #[arg(short, long, default_value = "sextant.toml")]
    config: PathBuf,

    /// Override the snapshot output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Simplify geometry regardless of the config
    #[arg(long)]
    simplify: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Sextant Ingest Pipeline");
    info!("Config: {}", args.config.display());

    let mut config = Config::load_from_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    if args.simplify {
        config.build.simplify = true;
    }
    let output = args.output.unwrap_or_else(|| config.output.snapshot.clone());

    let import_start = Utc::now();

    let pb = ProgressBar::new(5);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    pb.set_message("zone boundaries");
    let boundaries = GeoJsonBoundaries::new(&config.sources.boundaries, &config.sources.zone_property)
        .boundaries()
        .context("Failed to load zone boundaries")?;
    pb.inc(1);

    pb.set_message("zone metadata");
    let metadata = GeoNamesTimeZones::load(&config.sources.time_zones)
        .context("Failed to load zone metadata")?;
    let names: Box<dyn ZoneNameMapper> = match &config.sources.zone_names {
        Some(path) => Box::new(CsvZoneNames::load(path).context("Failed to load zone names")?),
        None => Box::new(NoZoneNames),
    };
    pb.inc(1);

    pb.set_message("country catalog");
    let countries = GeoNamesCountries::new(&config.sources.countries)
        .countries()
        .context("Failed to load countries")?;
    let catalog = CountryCatalog::build(countries).context("Failed to build country catalog")?;
    pb.inc(1);

    pb.set_message("region index");
    let (index, report) = RegionIndex::build(
        boundaries,
        &metadata,
        names.as_ref(),
        &config.build_options(),
    );
    pb.inc(1);

    pb.set_message("snapshot");
    Snapshot::capture(&index, &catalog)
        .write(&output)
        .with_context(|| format!("Failed to write snapshot to {}", output.display()))?;
    pb.inc(1);
    pb.finish_with_message("Build complete");

    info!("Regions indexed: {}", report.retained);
    info!("Records merged into an existing zone: {}", report.merged);
    if report.without_metadata > 0 {
        warn!("Zones without metadata: {}", report.without_metadata);
    }
    for (reason, count) in &report.skipped {
        warn!("Skipped {} records: {}", count, reason);
    }
    info!("Countries: {}", catalog.len());

    let elapsed = Utc::now() - import_start;
    info!(
        "Wrote {} in {:.1}s",
        output.display(),
        elapsed.num_milliseconds() as f64 / 1000.0
    );

    Ok(())
}

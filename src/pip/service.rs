//! Reverse-lookup service: time zone and country for a point.

use std::sync::{Arc, RwLock};
use tracing::debug;

use super::RegionIndex;
use crate::countries::{CountryCatalog, LazyCatalog};
use crate::error::BuildError;
use crate::models::{Country, GeoPoint, Region};

/// Maximum planar distance (degrees) at which a non-containing region is
/// still accepted. Tolerates coastline and simplification gaps.
pub const FALLBACK_THRESHOLD: f64 = 1.0;

/// Two-stage lookup: containing region, else nearest within the threshold.
pub struct LookupService {
    index: Arc<RegionIndex>,
    catalog: Arc<LazyCatalog>,
    fallback_threshold: f64,
}

impl LookupService {
    pub fn new(index: Arc<RegionIndex>, catalog: Arc<LazyCatalog>) -> Self {
        Self {
            index,
            catalog,
            fallback_threshold: FALLBACK_THRESHOLD,
        }
    }

    pub fn with_fallback_threshold(mut self, threshold: f64) -> Self {
        self.fallback_threshold = threshold;
        self
    }

    /// Time-zone region at the point, `None` for open ocean or gaps wider
    /// than the fallback threshold.
    pub fn resolve_time_zone(&self, point: GeoPoint) -> Option<Arc<Region>> {
        if let Some(region) = self.index.find_containing(point) {
            debug!("({}) contained in {}", point, region.zone_id);
            return Some(region);
        }
        let nearest = self.index.find_nearest(point, self.fallback_threshold);
        if nearest.is_none() {
            debug!("({}) has no region within {} degrees", point, self.fallback_threshold);
        }
        nearest
    }

    /// Country at the point.
    ///
    /// Same two stages as [`resolve_time_zone`](Self::resolve_time_zone), but
    /// only regions whose country code is in the catalog take part. Errors
    /// only if the catalog has to be built and the build fails.
    pub fn resolve_country(&self, point: GeoPoint) -> Result<Option<&Country>, BuildError> {
        let catalog = self.catalog.get()?;
        let joined = |region: &Region| country_of(catalog, region).is_some();

        let region = self
            .index
            .find_containing_where(point, joined)
            .or_else(|| {
                self.index
                    .find_nearest_where(point, self.fallback_threshold, joined)
            });

        Ok(region.and_then(|r| country_of(catalog, &r)))
    }

    /// Country by ISO alpha-2 code, no geometry involved
    pub fn resolve_country_code(&self, iso: &str) -> Result<Option<&Country>, BuildError> {
        Ok(self.catalog.get()?.get(iso))
    }

    /// Get the region index (for stats/debugging)
    pub fn index(&self) -> &RegionIndex {
        &self.index
    }

    pub fn catalog(&self) -> &LazyCatalog {
        &self.catalog
    }
}

fn country_of<'a>(catalog: &'a CountryCatalog, region: &Region) -> Option<&'a Country> {
    region.country_code().and_then(|code| catalog.get(code))
}

/// Process-wide reference to the current service.
///
/// Readers take an `Arc` snapshot; `replace` swaps in a rebuilt service
/// without disturbing lookups already running on the old one.
pub struct ServiceHandle {
    current: RwLock<Arc<LookupService>>,
}

impl ServiceHandle {
    pub fn new(service: LookupService) -> Self {
        Self {
            current: RwLock::new(Arc::new(service)),
        }
    }

    pub fn current(&self) -> Arc<LookupService> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Publish a new service, returning the previous one
    pub fn replace(&self, service: LookupService) -> Arc<LookupService> {
        let next = Arc::new(service);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}

//! Spatial index for fast time-zone region lookups.

use std::sync::Arc;

use hashbrown::HashMap;
use rayon::prelude::*;
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::boundary::{ZoneBoundary, UNINHABITED};
use super::geometry::{build_multi_polygon, simplify_region, PointLocation, SimplifyOptions};
use crate::error::SkipReason;
use crate::metadata::{ZoneMetadataSource, ZoneNameMapper};
use crate::models::{GeoPoint, Region};

/// Wrapper for R-tree indexing of regions.
///
/// `ordinal` is the import position, used to keep results deterministic
/// regardless of tree traversal order.
#[derive(Clone)]
struct IndexedRegion {
    ordinal: usize,
    region: Arc<Region>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRegion {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Options for the build phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Simplify geometry before indexing. Off unless explicitly enabled.
    #[serde(default)]
    pub simplify: Option<SimplifyOptions>,
}

/// Outcome counts of a build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    /// Distinct regions in the index
    pub retained: usize,
    /// Records folded into an earlier region with the same zone id
    pub merged: usize,
    pub without_metadata: usize,
    pub skipped: HashMap<SkipReason, usize>,
}

impl BuildReport {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
    }
}

/// Immutable index over all retained regions.
pub struct RegionIndex {
    tree: RTree<IndexedRegion>,
    /// Regions in import order
    regions: Vec<Arc<Region>>,
    by_zone: HashMap<String, usize>,
}

impl RegionIndex {
    /// Validate boundary records, join metadata and build the index.
    ///
    /// Records with empty or sentinel zone ids, or malformed geometry, are
    /// skipped and counted in the report. Zones without metadata are kept
    /// with their metadata fields absent.
    pub fn build(
        records: Vec<ZoneBoundary>,
        metadata: &dyn ZoneMetadataSource,
        names: &dyn ZoneNameMapper,
        opts: &BuildOptions,
    ) -> (Self, BuildReport) {
        info!("Building region index for {} boundary records...", records.len());

        let validated: Vec<Result<(Region, bool), SkipReason>> = records
            .into_par_iter()
            .map(|record| Self::validate(record, metadata, names, opts))
            .collect();

        let mut report = BuildReport::default();
        let mut regions: Vec<Region> = Vec::with_capacity(validated.len());
        let mut positions: HashMap<String, usize> = HashMap::new();
        for result in validated {
            match result {
                Ok((region, has_metadata)) => {
                    // Boundary files often split one zone over several records
                    if let Some(&pos) = positions.get(&region.zone_id) {
                        regions[pos].geometry.0.extend(region.geometry.0);
                        report.merged += 1;
                        continue;
                    }
                    if !has_metadata {
                        report.without_metadata += 1;
                    }
                    positions.insert(region.zone_id.clone(), regions.len());
                    regions.push(region);
                }
                Err(reason) => report.skip(reason),
            }
        }
        report.retained = regions.len();

        for (reason, count) in &report.skipped {
            info!("  skipped {} records: {}", count, reason);
        }

        let index = Self::from_regions(regions);
        info!(
            "Region index built with {} regions ({} skipped, {} merged, {} without metadata)",
            index.len(),
            report.skipped_total(),
            report.merged,
            report.without_metadata
        );
        (index, report)
    }

    fn validate(
        record: ZoneBoundary,
        metadata: &dyn ZoneMetadataSource,
        names: &dyn ZoneNameMapper,
        opts: &BuildOptions,
    ) -> Result<(Region, bool), SkipReason> {
        let zone_id = record.zone_id.trim();
        if zone_id.is_empty() {
            return Err(SkipReason::EmptyZoneId);
        }
        if zone_id.eq_ignore_ascii_case(UNINHABITED) {
            return Err(SkipReason::UninhabitedZone);
        }

        let mut geometry =
            build_multi_polygon(record.parts).map_err(SkipReason::InvalidGeometry)?;
        if let Some(simplify) = &opts.simplify {
            geometry = simplify_region(&geometry, simplify);
        }

        let info = metadata.zone_info(zone_id);
        let has_metadata = info.is_some();
        let region = Region {
            zone_id: zone_id.to_string(),
            display_name: names.display_name(zone_id, false),
            daylight_name: names.display_name(zone_id, true),
            info: info.unwrap_or_default(),
            geometry,
        };
        Ok((region, has_metadata))
    }

    /// Index already validated regions, e.g. from a snapshot.
    pub fn from_regions(regions: Vec<Region>) -> Self {
        let regions: Vec<Arc<Region>> = regions.into_iter().map(Arc::new).collect();

        let indexed: Vec<IndexedRegion> = regions
            .iter()
            .enumerate()
            .filter_map(|(ordinal, region)| {
                let (min_x, min_y, max_x, max_y) = region.bbox()?;
                Some(IndexedRegion {
                    ordinal,
                    region: Arc::clone(region),
                    envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
                })
            })
            .collect();

        let by_zone = regions
            .iter()
            .enumerate()
            .map(|(i, r)| (r.zone_id.clone(), i))
            .collect();

        Self {
            tree: RTree::bulk_load(indexed),
            regions,
            by_zone,
        }
    }

    /// First region (in import order) containing the point
    pub fn find_containing(&self, point: GeoPoint) -> Option<Arc<Region>> {
        self.find_containing_where(point, |_| true)
    }

    /// First region (in import order) containing the point and accepted by `filter`
    pub fn find_containing_where<F>(&self, point: GeoPoint, filter: F) -> Option<Arc<Region>>
    where
        F: Fn(&Region) -> bool,
    {
        let coord = point.coord();
        let query_envelope = AABB::from_point([coord.x, coord.y]);

        let mut candidates: Vec<&IndexedRegion> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .collect();
        candidates.sort_unstable_by_key(|ir| ir.ordinal);

        candidates
            .into_iter()
            .find(|ir| filter(ir.region.as_ref()) && ir.region.geometry.contains_point(coord))
            .map(|ir| Arc::clone(&ir.region))
    }

    /// Region nearest to the point if strictly closer than `max_distance`.
    ///
    /// Ties go to the region first in import order.
    pub fn find_nearest(&self, point: GeoPoint, max_distance: f64) -> Option<Arc<Region>> {
        self.find_nearest_where(point, max_distance, |_| true)
    }

    pub fn find_nearest_where<F>(
        &self,
        point: GeoPoint,
        max_distance: f64,
        filter: F,
    ) -> Option<Arc<Region>>
    where
        F: Fn(&Region) -> bool,
    {
        let coord = point.coord();
        // Any region closer than max_distance has an envelope intersecting this box
        let query_envelope = AABB::from_corners(
            [coord.x - max_distance, coord.y - max_distance],
            [coord.x + max_distance, coord.y + max_distance],
        );
        let best = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|ir| filter(ir.region.as_ref()))
            .map(|ir| (ir.region.geometry.distance_to_point(coord), ir))
            .filter(|(d, _)| *d < max_distance)
            .min_by(|(da, a), (db, b)| da.total_cmp(db).then(a.ordinal.cmp(&b.ordinal)));

        if let Some((distance, ir)) = &best {
            debug!(
                "Nearest region to ({}) is {} at {:.6} degrees",
                point, ir.region.zone_id, distance
            );
        }
        best.map(|(_, ir)| Arc::clone(&ir.region))
    }

    /// Direct lookup by zone id
    pub fn get(&self, zone_id: &str) -> Option<&Arc<Region>> {
        self.by_zone.get(zone_id).map(|&i| &self.regions[i])
    }

    /// Regions in import order
    pub fn regions(&self) -> impl Iterator<Item = &Arc<Region>> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;
    use geo::Coord;
    use crate::metadata::NoZoneNames;
    use crate::models::ZoneInfo;
    use crate::testing::{rect, rect_boundary, sample_boundaries, sample_index, sample_zone_info};

    #[test]
    fn test_build_skips_invalid_records() {
        let mut records = sample_boundaries();
        records.push(ZoneBoundary::new("  ", vec![rect(0.0, 0.0, 1.0, 1.0)]));
        records.push(ZoneBoundary::new("Uninhabited", vec![rect(0.0, 0.0, 1.0, 1.0)]));
        records.push(ZoneBoundary::new("Etc/Broken", vec![]));
        records.push(ZoneBoundary::new(
            "Etc/Open",
            vec![vec![vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 1.0, y: 1.0 },
                Coord { x: 0.0, y: 1.0 },
            ]]],
        ));

        let total = records.len();
        let (index, report) = RegionIndex::build(
            records,
            &sample_zone_info(),
            &NoZoneNames,
            &BuildOptions::default(),
        );

        assert_eq!(report.retained, total - 4);
        assert_eq!(index.len(), report.retained);
        assert_eq!(report.skipped_total(), 4);
        assert_eq!(report.skipped[&SkipReason::EmptyZoneId], 1);
        assert_eq!(report.skipped[&SkipReason::UninhabitedZone], 1);
        assert_eq!(
            report.skipped[&SkipReason::InvalidGeometry(GeometryError::EmptyGeometry)],
            1
        );
        assert_eq!(
            report.skipped[&SkipReason::InvalidGeometry(GeometryError::UnclosedRing)],
            1
        );
        assert!(index.get("Uninhabited").is_none());
    }

    #[test]
    fn test_records_with_same_zone_are_merged() {
        let records = vec![
            rect_boundary("Pacific/Auckland", 166.0, -47.0, 170.0, -43.0),
            rect_boundary("Pacific/Chatham", -177.0, -45.0, -176.0, -43.0),
            rect_boundary("Pacific/Auckland", 172.0, -42.0, 179.0, -34.0),
        ];
        let (index, report) = RegionIndex::build(
            records,
            &sample_zone_info(),
            &NoZoneNames,
            &BuildOptions::default(),
        );
        assert_eq!(report.retained, 2);
        assert_eq!(report.merged, 1);
        assert_eq!(index.get("Pacific/Auckland").unwrap().geometry.0.len(), 2);

        let south = index.find_containing(GeoPoint::new(-45.0, 168.0)).unwrap();
        let north = index.find_containing(GeoPoint::new(-41.2443701, 174.7618546)).unwrap();
        assert!(Arc::ptr_eq(&south, &north));
    }

    #[test]
    fn test_missing_metadata_is_not_an_error() {
        let (index, report) = RegionIndex::build(
            vec![rect_boundary("Antarctica/Troll", 0.0, -75.0, 5.0, -70.0)],
            &HashMap::<String, ZoneInfo>::new(),
            &NoZoneNames,
            &BuildOptions::default(),
        );
        assert_eq!(report.without_metadata, 1);
        let region = index.get("Antarctica/Troll").unwrap();
        assert_eq!(region.info, ZoneInfo::default());
        assert!(region.display_name.is_none());
    }

    #[test]
    fn test_find_containing() {
        let index = sample_index();
        let region = index
            .find_containing(GeoPoint::new(-34.6379425, -58.3756365))
            .unwrap();
        assert_eq!(region.zone_id, "America/Argentina/Buenos_Aires");
        assert_eq!(region.country_code(), Some("AR"));

        assert!(index.find_containing(GeoPoint::new(0.0, -160.0)).is_none());
    }

    #[test]
    fn test_hole_belongs_to_the_region_filling_it() {
        let index = sample_index();
        let inside_hole = GeoPoint::new(41.875, 12.375);
        assert_eq!(index.find_containing(inside_hole).unwrap().zone_id, "Europe/Vatican");

        // hole edge counts as part of the outer region, which comes first
        let on_hole_edge = GeoPoint::new(41.75, 12.375);
        assert_eq!(index.find_containing(on_hole_edge).unwrap().zone_id, "Europe/Rome");

        let rome = index.get("Europe/Rome").unwrap();
        assert!(!rome.geometry.contains_point(inside_hole.coord()));
        assert_eq!(rome.geometry.distance_to_point(inside_hole.coord()), 0.125);
    }

    #[test]
    fn test_overlap_returns_first_in_import_order() {
        let records = vec![
            rect_boundary("Zone/Second", 0.0, 0.0, 10.0, 10.0),
            rect_boundary("Zone/Inner", 2.0, 2.0, 4.0, 4.0),
        ];
        let (index, _) = RegionIndex::build(
            records,
            &HashMap::<String, ZoneInfo>::new(),
            &NoZoneNames,
            &BuildOptions::default(),
        );
        let region = index.find_containing(GeoPoint::new(3.0, 3.0)).unwrap();
        assert_eq!(region.zone_id, "Zone/Second");
    }

    #[test]
    fn test_find_nearest_threshold_is_strict() {
        let (index, _) = RegionIndex::build(
            vec![rect_boundary("Zone/A", 0.0, 0.0, 1.0, 1.0)],
            &HashMap::<String, ZoneInfo>::new(),
            &NoZoneNames,
            &BuildOptions::default(),
        );
        // lon 1.5 is 0.5 degrees east of the box
        let p = GeoPoint::new(0.5, 1.5);
        assert_eq!(index.find_nearest(p, 1.0).unwrap().zone_id, "Zone/A");
        assert!(index.find_nearest(p, 0.5).is_none());
        assert!(index.find_nearest(GeoPoint::new(0.5, 3.0), 1.0).is_none());
    }

    #[test]
    fn test_find_nearest_picks_closest_then_first() {
        let records = vec![
            rect_boundary("Zone/West", -2.0, 0.0, -0.75, 1.0),
            rect_boundary("Zone/East", 0.5, 0.0, 2.0, 1.0),
            rect_boundary("Zone/EastTwin", 0.5, 1.0, 2.0, 2.0),
        ];
        let (index, _) = RegionIndex::build(
            records,
            &HashMap::<String, ZoneInfo>::new(),
            &NoZoneNames,
            &BuildOptions::default(),
        );
        let p = GeoPoint::new(1.0, 0.0);
        // East and EastTwin share the corner 0.5 degrees away
        assert_eq!(index.find_nearest(p, 1.0).unwrap().zone_id, "Zone/East");
    }

    #[test]
    fn test_find_where_filters() {
        let index = sample_index();
        let p = GeoPoint::new(-34.6379425, -58.3756365);
        assert!(index
            .find_containing_where(p, |r| r.country_code() == Some("US"))
            .is_none());
        assert!(index
            .find_nearest_where(p, 1.0, |r| r.country_code() == Some("US"))
            .is_none());
    }

    #[test]
    fn test_simplified_build_still_answers() {
        let (index, _) = RegionIndex::build(
            sample_boundaries(),
            &sample_zone_info(),
            &NoZoneNames,
            &BuildOptions {
                simplify: Some(SimplifyOptions::default()),
            },
        );
        let region = index
            .find_containing(GeoPoint::new(33.45, -112.066667))
            .unwrap();
        assert_eq!(region.zone_id, "America/Phoenix");
    }

    #[test]
    fn test_regions_keep_import_order() {
        let index = sample_index();
        let ids: Vec<&str> = index.regions().map(|r| r.zone_id.as_str()).collect();
        let expected: Vec<String> = sample_boundaries().into_iter().map(|b| b.zone_id).collect();
        assert_eq!(ids, expected);
    }
}

//! Point-to-region proximity.
//!
//! The distance from a point to a region is the Euclidean distance to the
//! closest point of the region's bounding rectangle `[min_x, max_x] ×
//! [min_y, max_y]`, found by clamping the point into the rectangle. Points
//! inside or on the rectangle are at distance 0.
//!
//! Both operands must be in the same pixel space; normalized landmarks are
//! scaled with [`TrackedPoint::to_pixel`](posehue_frame_model::TrackedPoint::to_pixel)
//! first.

use posehue_frame_model::{DetectionConfig, PixelPoint, PoseLandmark, Region};
use serde::Serialize;

/// Distance from `point` to the bounding rectangle of `region`.
pub fn distance_to_region(point: PixelPoint, region: &Region) -> f64 {
    let closest = PixelPoint::new(
        point.x.clamp(region.min_x as f64, region.max_x as f64),
        point.y.clamp(region.min_y as f64, region.max_y as f64),
    );
    point.distance_to(&closest)
}

/// Whether `point` is within `threshold` pixels of `region`.
pub fn is_near(point: PixelPoint, region: &Region, threshold: f64) -> bool {
    distance_to_region(point, region) <= threshold
}

/// A region that lies near at least one joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionMatch {
    pub region: Region,
    /// The closest joint.
    pub joint: PoseLandmark,
    /// Pixel distance from that joint to the region's bounding box.
    pub distance: f64,
}

/// Keeps regions that lie within a fixed distance of any tracked joint.
#[derive(Debug, Clone, Copy)]
pub struct ProximityMatcher {
    threshold: f64,
}

impl ProximityMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(config.near_distance_px)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_near(&self, point: PixelPoint, region: &Region) -> bool {
        is_near(point, region, self.threshold)
    }

    /// Regions near at least one joint, in input order, each tagged with
    /// its closest joint.
    pub fn match_regions(
        &self,
        regions: &[Region],
        joints: &[(PoseLandmark, PixelPoint)],
    ) -> Vec<RegionMatch> {
        regions
            .iter()
            .filter_map(|region| {
                joints
                    .iter()
                    .map(|(joint, point)| (*joint, distance_to_region(*point, region)))
                    .filter(|(_, distance)| *distance <= self.threshold)
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(joint, distance)| RegionMatch {
                        region: *region,
                        joint,
                        distance,
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Region {
        Region {
            min_x,
            min_y,
            max_x,
            max_y,
            pixel_count: 1,
        }
    }

    #[test]
    fn test_inside_and_boundary_are_zero() {
        let r = rect(10, 10, 20, 20);
        assert_eq!(distance_to_region(PixelPoint::new(15.0, 15.0), &r), 0.0);
        assert_eq!(distance_to_region(PixelPoint::new(10.0, 20.0), &r), 0.0);
        assert_eq!(distance_to_region(PixelPoint::new(20.0, 13.5), &r), 0.0);
    }

    #[test]
    fn test_edge_distance() {
        let r = rect(10, 10, 20, 20);
        let d = distance_to_region(PixelPoint::new(25.0, 15.0), &r);
        assert!((d - 5.0).abs() < 1e-12);
        let d = distance_to_region(PixelPoint::new(12.0, 2.0), &r);
        assert!((d - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_corner_distance() {
        let r = rect(10, 10, 20, 20);
        let d = distance_to_region(PixelPoint::new(23.0, 24.0), &r);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let r = rect(0, 0, 10, 10);
        assert!(is_near(PixelPoint::new(60.0, 5.0), &r, 50.0));
        assert!(!is_near(PixelPoint::new(60.5, 5.0), &r, 50.0));
    }

    #[test]
    fn test_match_regions_picks_closest_joint() {
        let regions = [rect(0, 0, 10, 10), rect(200, 200, 210, 210)];
        let joints = [
            (PoseLandmark::LeftKnee, PixelPoint::new(40.0, 5.0)),
            (PoseLandmark::RightKnee, PixelPoint::new(15.0, 5.0)),
        ];
        let matched = ProximityMatcher::new(50.0).match_regions(&regions, &joints);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].region, regions[0]);
        assert_eq!(matched[0].joint, PoseLandmark::RightKnee);
        assert!((matched[0].distance - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_joints_no_matches() {
        let regions = [rect(0, 0, 10, 10)];
        assert!(ProximityMatcher::new(1e9).match_regions(&regions, &[]).is_empty());
    }
}

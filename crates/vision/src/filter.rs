//! Minimum-area filtering of labeled regions.

use posehue_frame_model::{DetectionConfig, Region};

/// Discards regions with fewer than `min_area` pixels.
#[derive(Debug, Clone, Copy)]
pub struct ObjectFilter {
    min_area: usize,
}

impl ObjectFilter {
    pub fn new(min_area: usize) -> Self {
        Self { min_area }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(config.min_object_area_px)
    }

    pub fn min_area(&self) -> usize {
        self.min_area
    }

    /// Whether a region is large enough to keep.
    pub fn keeps(&self, region: &Region) -> bool {
        region.pixel_count >= self.min_area
    }

    /// Keep qualifying regions, preserving their order.
    pub fn apply(&self, regions: Vec<Region>) -> Vec<Region> {
        regions.into_iter().filter(|r| self.keeps(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_with_count(pixel_count: usize) -> Region {
        Region {
            pixel_count,
            ..Region::seed(0, 0)
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let filter = ObjectFilter::new(500);
        assert!(filter.keeps(&region_with_count(500)));
        assert!(!filter.keeps(&region_with_count(499)));
    }

    #[test]
    fn test_apply_preserves_order() {
        let regions = vec![
            region_with_count(30),
            region_with_count(5),
            region_with_count(20),
        ];
        let kept = ObjectFilter::new(20).apply(regions);
        let counts: Vec<_> = kept.iter().map(|r| r.pixel_count).collect();
        assert_eq!(counts, vec![30, 20]);
    }

    #[test]
    fn test_zero_threshold_keeps_everything() {
        let regions = vec![region_with_count(1), region_with_count(2)];
        assert_eq!(ObjectFilter::new(0).apply(regions.clone()), regions);
    }
}

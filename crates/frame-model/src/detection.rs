//! Detection configuration: color thresholds, area and distance limits,
//! timing, and the set of joints to follow.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::landmark::PoseLandmark;

/// Closed hue interval `[min, max]` in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HueInterval {
    pub min: f64,
    pub max: f64,
}

impl HueInterval {
    /// The default target: green.
    pub const GREEN: HueInterval = HueInterval {
        min: 90.0,
        max: 150.0,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Expand a possibly wrapping range into disjoint closed intervals.
    ///
    /// `wrapping(340.0, 10.0)` yields `[340, 360]` and `[0, 10]`; a
    /// non-wrapping pair yields a single interval.
    pub fn wrapping(from: f64, to: f64) -> Vec<HueInterval> {
        if from <= to {
            vec![Self::new(from, to)]
        } else {
            vec![Self::new(from, 360.0), Self::new(0.0, to)]
        }
    }

    /// Whether `hue` lies inside the interval, bounds included.
    pub fn contains(&self, hue: f64) -> bool {
        hue >= self.min && hue <= self.max
    }
}

/// Tunable parameters for one detection run.
///
/// Values are fixed for the lifetime of a scheduler; there is no
/// mid-run reconfiguration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum time between admitted cycles (ms). A tick is admitted only
    /// when strictly more than this has elapsed since the last cycle.
    pub throttle_interval_ms: u64,

    /// Number of samples kept per joint for temporal smoothing.
    pub smoothing_window_size: usize,

    /// Target hues; a pixel matches if its hue is inside any interval.
    pub hue_ranges: Vec<HueInterval>,

    /// Minimum HSV saturation, percent.
    pub saturation_min_percent: f64,

    /// Minimum HSV value, percent.
    pub value_min_percent: f64,

    /// Components with fewer pixels than this are discarded.
    pub min_object_area_px: usize,

    /// Maximum pixel distance between a joint and a region's bounding box
    /// for the region to count as "near".
    pub near_distance_px: f64,

    /// Joints that are smoothed and matched against regions.
    pub tracked_joints: Vec<PoseLandmark>,

    /// Threads used to classify pixels. `0` picks the available parallelism.
    pub worker_threads: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            throttle_interval_ms: 200,
            smoothing_window_size: 10,
            hue_ranges: vec![HueInterval::GREEN],
            saturation_min_percent: 25.0,
            value_min_percent: 25.0,
            min_object_area_px: 500,
            near_distance_px: 50.0,
            tracked_joints: vec![PoseLandmark::LeftKnee, PoseLandmark::RightKnee],
            worker_threads: 1,
        }
    }
}

impl DetectionConfig {
    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.throttle_interval_ms == 0 {
            return Err(ModelError::invalid_config(
                "throttle_interval_ms must be greater than zero",
            ));
        }
        if self.smoothing_window_size == 0 {
            return Err(ModelError::invalid_config(
                "smoothing_window_size must be at least 1",
            ));
        }
        if self.hue_ranges.is_empty() {
            return Err(ModelError::invalid_config(
                "at least one hue range is required",
            ));
        }
        for range in &self.hue_ranges {
            let in_circle = (0.0..=360.0).contains(&range.min) && (0.0..=360.0).contains(&range.max);
            if !in_circle || range.min > range.max {
                return Err(ModelError::invalid_config(format!(
                    "hue range [{}, {}] must satisfy 0 <= min <= max <= 360; \
                     split wrapping ranges with HueInterval::wrapping",
                    range.min, range.max
                )));
            }
        }
        for (name, value) in [
            ("saturation_min_percent", self.saturation_min_percent),
            ("value_min_percent", self.value_min_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ModelError::invalid_config(format!(
                    "{name} must be within [0, 100], got {value}"
                )));
            }
        }
        if !self.near_distance_px.is_finite() || self.near_distance_px < 0.0 {
            return Err(ModelError::invalid_config(format!(
                "near_distance_px must be a non-negative number, got {}",
                self.near_distance_px
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DetectionConfig::default();
        config.validate().unwrap();
        assert_eq!(config.throttle_interval_ms, 200);
        assert_eq!(config.smoothing_window_size, 10);
        assert_eq!(config.hue_ranges, vec![HueInterval::new(90.0, 150.0)]);
        assert_eq!(config.min_object_area_px, 500);
        assert_eq!(config.near_distance_px, 50.0);
    }

    #[test]
    fn test_wrapping_splits_range() {
        let parts = HueInterval::wrapping(340.0, 10.0);
        assert_eq!(
            parts,
            vec![HueInterval::new(340.0, 360.0), HueInterval::new(0.0, 10.0)]
        );
        assert_eq!(HueInterval::wrapping(90.0, 150.0).len(), 1);
    }

    #[test]
    fn test_interval_is_closed() {
        let range = HueInterval::new(90.0, 150.0);
        assert!(range.contains(90.0));
        assert!(range.contains(150.0));
        assert!(!range.contains(150.5));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = DetectionConfig {
            hue_ranges: vec![HueInterval::new(340.0, 10.0)],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ModelError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = DetectionConfig {
            smoothing_window_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_percent_bounds_rejected() {
        let config = DetectionConfig {
            value_min_percent: 120.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let raw = r#"{"min_object_area_px":20,"tracked_joints":["leftWrist"]}"#;
        let config: DetectionConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.min_object_area_px, 20);
        assert_eq!(config.tracked_joints, vec![PoseLandmark::LeftWrist]);
        assert_eq!(config.throttle_interval_ms, 200);
    }
}

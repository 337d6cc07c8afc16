pub mod analyze;
pub mod config;
pub mod replay;

use std::path::Path;

use clap::Args;
use posehue_frame_model::{DetectionConfig, Frame, HueInterval, PoseLandmark};
use posehue_vision::CycleOutput;

/// Command-line overrides layered on top of the loaded detection config.
#[derive(Args, Debug, Default)]
pub struct DetectionOverrides {
    /// Hue range `FROM:TO` in degrees; wraps through 0 when FROM > TO (repeatable)
    #[arg(long = "hue", value_name = "FROM:TO", value_parser = parse_hue_range)]
    pub hue: Vec<(f64, f64)>,

    /// Minimum saturation, percent
    #[arg(long)]
    pub min_saturation: Option<f64>,

    /// Minimum value (brightness), percent
    #[arg(long)]
    pub min_value: Option<f64>,

    /// Minimum object area in pixels
    #[arg(long)]
    pub min_area: Option<usize>,

    /// Proximity threshold in pixels
    #[arg(long)]
    pub near_distance: Option<f64>,

    /// Minimum milliseconds between cycles
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Samples kept per joint for smoothing
    #[arg(long)]
    pub window: Option<usize>,

    /// Joint to track, e.g. `leftKnee` (repeatable; replaces the configured set)
    #[arg(long = "joint", value_name = "NAME")]
    pub joints: Vec<PoseLandmark>,

    /// Segmentation worker threads (0 = all cores)
    #[arg(long)]
    pub workers: Option<usize>,
}

impl DetectionOverrides {
    /// Apply the overrides and validate the result.
    pub fn apply(self, mut config: DetectionConfig) -> anyhow::Result<DetectionConfig> {
        if !self.hue.is_empty() {
            config.hue_ranges = self
                .hue
                .into_iter()
                .flat_map(|(from, to)| HueInterval::wrapping(from, to))
                .collect();
        }
        if let Some(v) = self.min_saturation {
            config.saturation_min_percent = v;
        }
        if let Some(v) = self.min_value {
            config.value_min_percent = v;
        }
        if let Some(v) = self.min_area {
            config.min_object_area_px = v;
        }
        if let Some(v) = self.near_distance {
            config.near_distance_px = v;
        }
        if let Some(v) = self.throttle_ms {
            config.throttle_interval_ms = v;
        }
        if let Some(v) = self.window {
            config.smoothing_window_size = v;
        }
        if !self.joints.is_empty() {
            config.tracked_joints = self.joints;
        }
        if let Some(v) = self.workers {
            config.worker_threads = v;
        }

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid detection settings: {e}"))?;
        Ok(config)
    }
}

fn parse_hue_range(s: &str) -> Result<(f64, f64), String> {
    let (from, to) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got '{s}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|_| format!("'{part}' is not a number"))
    };
    Ok((parse(from)?, parse(to)?))
}

/// Decode an image file into an RGBA frame.
pub fn load_frame(path: &Path) -> anyhow::Result<Frame> {
    let image = image::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to decode {}: {e}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(Frame::from_rgba(width, height, image.into_raw())?)
}

/// One-line human summary of a cycle.
pub fn summarize(output: &CycleOutput) -> String {
    let flag = |b: bool| if b { "yes" } else { "no" };
    format!(
        "t={}ms objects={} joints={} matched={} | object: {} joint: {} near: {}",
        output.timestamp_ms,
        output.objects.len(),
        output.joints.len(),
        output.matched.len(),
        flag(output.object_detected),
        flag(output.joint_detected),
        flag(output.near_match),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hue_range() {
        assert_eq!(parse_hue_range("340:10"), Ok((340.0, 10.0)));
        assert_eq!(parse_hue_range(" 90 : 150 "), Ok((90.0, 150.0)));
        assert!(parse_hue_range("90-150").is_err());
        assert!(parse_hue_range("a:10").is_err());
    }

    #[test]
    fn test_overrides_replace_hue_and_joints() {
        let overrides = DetectionOverrides {
            hue: vec![(340.0, 10.0)],
            joints: vec![PoseLandmark::LeftWrist],
            min_area: Some(42),
            ..Default::default()
        };
        let config = overrides.apply(DetectionConfig::default()).unwrap();
        assert_eq!(
            config.hue_ranges,
            vec![HueInterval::new(340.0, 360.0), HueInterval::new(0.0, 10.0)]
        );
        assert_eq!(config.tracked_joints, vec![PoseLandmark::LeftWrist]);
        assert_eq!(config.min_object_area_px, 42);
    }

    #[test]
    fn test_overrides_are_validated() {
        let overrides = DetectionOverrides {
            window: Some(0),
            ..Default::default()
        };
        assert!(overrides.apply(DetectionConfig::default()).is_err());
    }
}

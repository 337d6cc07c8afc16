//! Run one analysis cycle on a single image.

use std::path::{Path, PathBuf};

use posehue_frame_model::{CoordinateSpace, DetectionConfig, LandmarkSet};
use posehue_vision::{FrameScheduler, TickOutcome};

pub fn run(
    image: PathBuf,
    space: CoordinateSpace,
    landmarks: Option<PathBuf>,
    json: bool,
    config: DetectionConfig,
) -> anyhow::Result<()> {
    let frame = super::load_frame(&image)?;
    let landmarks = match landmarks {
        Some(path) => load_landmarks(&path)?,
        None => LandmarkSet::new(),
    };

    tracing::info!(
        image = %image.display(),
        width = frame.width(),
        height = frame.height(),
        landmarks = landmarks.len(),
        %space,
        "Analyzing frame"
    );

    let mut scheduler = FrameScheduler::new(config, space)?;
    let output = match scheduler.tick(0, Some(&frame), &landmarks) {
        TickOutcome::Completed(output) => output,
        TickOutcome::Skipped(reason) => anyhow::bail!("Frame was not analyzed: {reason:?}"),
        other => anyhow::bail!("Unexpected scheduler outcome: {other:?}"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Analyzed: {}", image.display());
    println!(
        "  Frame:   {}x{} ({} space)",
        output.frame_width, output.frame_height, output.space
    );
    println!("  Objects: {}", output.objects.len());
    for region in &output.objects {
        println!(
            "    [{}, {}] - [{}, {}]  {} px",
            region.min_x, region.min_y, region.max_x, region.max_y, region.pixel_count
        );
    }
    println!("  Joints:  {}", output.joints.len());
    for joint in &output.joints {
        println!(
            "    {:<14} ({:.1}, {:.1}) px",
            joint.joint, joint.pixel.x, joint.pixel.y
        );
    }
    println!("  Matches: {}", output.matched.len());
    for m in &output.matched {
        println!(
            "    {} is {:.1} px from region at [{}, {}]",
            m.joint, m.distance, m.region.min_x, m.region.min_y
        );
    }
    println!();
    println!("{}", super::summarize(&output));

    Ok(())
}

fn load_landmarks(path: &Path) -> anyhow::Result<LandmarkSet> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read landmarks {}: {e}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse landmarks {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use posehue_frame_model::PoseLandmark;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("posehue-analyze-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_missing_landmark_file_reports_io_error() {
        let path = scratch_path("missing.json");
        let err = load_landmarks(&path).unwrap_err().to_string();
        assert!(err.starts_with("Failed to read landmarks"), "{err}");
        assert!(err.contains("missing.json"), "{err}");
        // The underlying OS error is kept.
        assert!(err.len() > format!("Failed to read landmarks {}: ", path.display()).len());
    }

    #[test]
    fn test_named_landmark_file_loads() {
        let path = scratch_path("named.json");
        std::fs::write(&path, r#"{"leftKnee": {"x": 0.4, "y": 0.7}}"#).unwrap();
        let landmarks = load_landmarks(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(landmarks.len(), 1);
        assert!(landmarks.get(PoseLandmark::LeftKnee).is_some());
    }

    #[test]
    fn test_malformed_landmark_file_reports_parse_error() {
        let path = scratch_path("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let err = load_landmarks(&path).unwrap_err().to_string();
        std::fs::remove_file(&path).ok();
        assert!(err.starts_with("Failed to parse landmarks"), "{err}");
    }
}

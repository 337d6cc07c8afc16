//! Recorded tick streams for offline replay.
//!
//! A session file is JSONL: one tick per line, `#` lines are comments.
//! Frame paths are resolved relative to the session file's directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::landmark::LandmarkSet;

/// Milliseconds on the tick source's clock.
pub type TimestampMs = u64;

/// One tick from the external refresh source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTick {
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    /// Image to analyze on this tick, if one was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<PathBuf>,

    /// Landmarks the pose model reported for this tick.
    #[serde(default)]
    pub landmarks: LandmarkSet,
}

impl SessionTick {
    pub fn new(timestamp_ms: TimestampMs, frame: Option<PathBuf>, landmarks: LandmarkSet) -> Self {
        Self {
            timestamp_ms,
            frame,
            landmarks,
        }
    }
}

/// Parse ticks from JSONL content.
pub fn parse_session(jsonl: &str) -> Result<Vec<SessionTick>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize ticks to JSONL.
pub fn serialize_session(ticks: &[SessionTick]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for tick in ticks {
        output.push_str(&serde_json::to_string(tick)?);
        output.push('\n');
    }
    Ok(output)
}

/// Read a session file and resolve its frame paths.
pub fn load_session(path: impl AsRef<Path>) -> Result<Vec<SessionTick>, ModelError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ModelError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut ticks = parse_session(&content).map_err(|e| ModelError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for tick in &mut ticks {
        if let Some(frame) = tick.frame.take() {
            tick.frame = Some(if frame.is_absolute() {
                frame
            } else {
                base.join(frame)
            });
        }
    }
    Ok(ticks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{PoseLandmark, TrackedPoint};

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let jsonl = "# session v1\n\n{\"t\":0,\"frame\":\"f0.png\"}\n{\"t\":50}\n";
        let ticks = parse_session(jsonl).unwrap();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].frame.as_deref(), Some(Path::new("f0.png")));
        assert!(ticks[1].frame.is_none());
        assert!(ticks[1].landmarks.is_empty());
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let ticks = vec![
            SessionTick::new(
                0,
                Some(PathBuf::from("a.png")),
                LandmarkSet::new().with(PoseLandmark::LeftKnee, TrackedPoint::planar(0.3, 0.6)),
            ),
            SessionTick::new(250, None, LandmarkSet::new()),
        ];
        let jsonl = serialize_session(&ticks).unwrap();
        assert_eq!(parse_session(&jsonl).unwrap(), ticks);
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = load_session("/nonexistent/posehue/session.jsonl").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/posehue/session.jsonl"));
    }
}

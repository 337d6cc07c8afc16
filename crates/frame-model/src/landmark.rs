//! Pose landmarks supplied by the external pose-estimation model.
//!
//! The model reports 33 body landmarks per detected pose in a fixed order.
//! Each landmark has normalized `x`/`y` (fractions of frame width/height),
//! a relative depth `z`, and a `visibility` confidence in `[0.0, 1.0]`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::region::{CoordinateSpace, PixelPoint};

/// Joint identity within the 33-point pose topology.
///
/// Discriminants match the model's landmark index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum PoseLandmark {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl PoseLandmark {
    /// Number of landmarks the pose model emits per pose.
    pub const COUNT: usize = 33;

    /// All landmarks in model output order.
    pub const ALL: [PoseLandmark; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Position in the model's landmark array.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// camelCase name, as used in landmark and config files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "leftEyeInner",
            Self::LeftEye => "leftEye",
            Self::LeftEyeOuter => "leftEyeOuter",
            Self::RightEyeInner => "rightEyeInner",
            Self::RightEye => "rightEye",
            Self::RightEyeOuter => "rightEyeOuter",
            Self::LeftEar => "leftEar",
            Self::RightEar => "rightEar",
            Self::MouthLeft => "mouthLeft",
            Self::MouthRight => "mouthRight",
            Self::LeftShoulder => "leftShoulder",
            Self::RightShoulder => "rightShoulder",
            Self::LeftElbow => "leftElbow",
            Self::RightElbow => "rightElbow",
            Self::LeftWrist => "leftWrist",
            Self::RightWrist => "rightWrist",
            Self::LeftPinky => "leftPinky",
            Self::RightPinky => "rightPinky",
            Self::LeftIndex => "leftIndex",
            Self::RightIndex => "rightIndex",
            Self::LeftThumb => "leftThumb",
            Self::RightThumb => "rightThumb",
            Self::LeftHip => "leftHip",
            Self::RightHip => "rightHip",
            Self::LeftKnee => "leftKnee",
            Self::RightKnee => "rightKnee",
            Self::LeftAnkle => "leftAnkle",
            Self::RightAnkle => "rightAnkle",
            Self::LeftHeel => "leftHeel",
            Self::RightHeel => "rightHeel",
            Self::LeftFootIndex => "leftFootIndex",
            Self::RightFootIndex => "rightFootIndex",
        }
    }
}

impl fmt::Display for PoseLandmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for PoseLandmark {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|lm| lm.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ModelError::Unrecognized {
                kind: "pose landmark",
                value: wanted.to_string(),
            })
    }
}

/// One normalized landmark sample.
///
/// Coordinates are nominally in `[0.0, 1.0]` but are not clamped; the model
/// reports slightly out-of-frame joints with values outside that range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl TrackedPoint {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    /// A fully visible point on the image plane.
    pub fn planar(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    /// Scale normalized coordinates into capture-frame pixels.
    pub fn to_pixel(&self, frame_width: u32, frame_height: u32) -> PixelPoint {
        PixelPoint::new(self.x * frame_width as f64, self.y * frame_height as f64)
    }

    /// Flip horizontally in normalized space.
    pub fn mirrored(&self) -> Self {
        Self {
            x: 1.0 - self.x,
            ..*self
        }
    }

    /// Express the point in `space`.
    pub fn in_space(&self, space: CoordinateSpace) -> Self {
        match space {
            CoordinateSpace::Capture => *self,
            CoordinateSpace::Mirrored => self.mirrored(),
        }
    }
}

/// Landmarks reported for one cycle, keyed by joint.
///
/// A joint that the model did not report this cycle is simply absent.
/// Deserializes either from a `{ "leftKnee": {...} }` object or from the
/// model's raw landmark array in index order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LandmarkSetRepr")]
pub struct LandmarkSet(BTreeMap<PoseLandmark, TrackedPoint>);

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkSetRepr {
    Named(BTreeMap<PoseLandmark, TrackedPoint>),
    Indexed(Vec<TrackedPoint>),
}

impl TryFrom<LandmarkSetRepr> for LandmarkSet {
    type Error = ModelError;

    fn try_from(repr: LandmarkSetRepr) -> Result<Self, Self::Error> {
        match repr {
            LandmarkSetRepr::Named(map) => Ok(Self(map)),
            LandmarkSetRepr::Indexed(points) => Self::from_model_output(&points),
        }
    }
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the pose model's landmark array (index order).
    pub fn from_model_output(points: &[TrackedPoint]) -> Result<Self, ModelError> {
        if points.len() > PoseLandmark::COUNT {
            return Err(ModelError::Unrecognized {
                kind: "landmark array length",
                value: points.len().to_string(),
            });
        }
        Ok(Self(
            PoseLandmark::ALL
                .iter()
                .copied()
                .zip(points.iter().copied())
                .collect(),
        ))
    }

    /// Builder-style insert.
    pub fn with(mut self, joint: PoseLandmark, point: TrackedPoint) -> Self {
        self.0.insert(joint, point);
        self
    }

    pub fn insert(&mut self, joint: PoseLandmark, point: TrackedPoint) -> Option<TrackedPoint> {
        self.0.insert(joint, point)
    }

    pub fn get(&self, joint: PoseLandmark) -> Option<&TrackedPoint> {
        self.0.get(&joint)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoseLandmark, &TrackedPoint)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }
}

impl FromIterator<(PoseLandmark, TrackedPoint)> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = (PoseLandmark, TrackedPoint)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

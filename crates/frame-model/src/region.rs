//! Regions, pixel-space points, and output coordinate spaces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Bounding box and area of one connected mask component.
///
/// Bounds are inclusive pixel indices: a single-pixel region has
/// `min_x == max_x` and `min_y == max_y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    /// Number of mask pixels in the component (not the bounding-box area).
    pub pixel_count: usize,
}

impl Region {
    /// A region consisting of one pixel.
    pub fn seed(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            pixel_count: 1,
        }
    }

    /// Grow the region by one pixel at `(x, y)`.
    pub fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.pixel_count += 1;
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Area of the bounding box, which is at least `pixel_count`.
    pub fn bbox_area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Whether the pixel `(x, y)` lies inside the bounding box.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Center of the bounding box in pixel coordinates.
    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(
            (self.min_x as f64 + self.max_x as f64) / 2.0,
            (self.min_y as f64 + self.max_y as f64) / 2.0,
        )
    }

    /// Flip horizontally inside a frame of the given width.
    pub fn mirrored(&self, frame_width: u32) -> Self {
        let last = frame_width.saturating_sub(1);
        Self {
            min_x: last.saturating_sub(self.max_x),
            max_x: last.saturating_sub(self.min_x),
            ..*self
        }
    }

    /// Express the region in `space`, given the capture frame width.
    pub fn in_space(&self, space: CoordinateSpace, frame_width: u32) -> Self {
        match space {
            CoordinateSpace::Capture => *self,
            CoordinateSpace::Mirrored => self.mirrored(frame_width),
        }
    }
}

/// A point in pixel coordinates (fractional positions allowed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Shift by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Flip horizontally inside a frame of the given width.
    ///
    /// Uses the same map as [`Region::mirrored`] (`x -> W - 1 - x`), so
    /// distances between points and regions survive the flip.
    pub fn mirrored(&self, frame_width: u32) -> Self {
        Self::new(frame_width.saturating_sub(1) as f64 - self.x, self.y)
    }
}

/// Coordinate convention used when results are handed back to the caller.
///
/// Capture space matches the raw camera buffer. Mirrored space is the
/// horizontally flipped "selfie" view most webcam UIs display. The pipeline
/// always works in capture space; callers choose the output space explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// Unmodified capture-buffer coordinates.
    Capture,
    /// X axis flipped to match a mirrored display.
    Mirrored,
}

impl CoordinateSpace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Mirrored => "mirrored",
        }
    }
}

impl fmt::Display for CoordinateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateSpace {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "capture" | "raw" => Ok(Self::Capture),
            "mirrored" | "mirror" | "display" => Ok(Self::Mirrored),
            other => Err(ModelError::Unrecognized {
                kind: "coordinate space",
                value: other.to_string(),
            }),
        }
    }
}

//! Temporal smoothing of tracked joints.
//!
//! Pose landmarks jitter from frame to frame. Each joint keeps a bounded
//! FIFO history of its most recent raw samples, and the smoothed estimate is
//! an exponentially weighted average over that history: the sample at
//! position `i` (0 = oldest) of a history of length `n` gets weight
//! `exp(i - (n - 1))`, so the newest sample has weight 1 and each older one
//! is scaled by a further `1/e`. Weights are normalized, which keeps every
//! coordinate inside the range spanned by the window.
//!
//! With fewer than [`MIN_SMOOTHING_SAMPLES`] samples the raw point is passed
//! through unchanged.

use std::collections::{HashMap, VecDeque};

use posehue_frame_model::{PoseLandmark, TrackedPoint};

/// Samples required before smoothing kicks in.
pub const MIN_SMOOTHING_SAMPLES: usize = 3;

/// A smoothed estimate has the same shape as a raw sample.
pub type SmoothedPoint = TrackedPoint;

/// Bounded history of raw samples for one joint, oldest first.
#[derive(Debug, Clone)]
pub struct PointHistory {
    samples: VecDeque<TrackedPoint>,
    capacity: usize,
}

impl PointHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when full.
    pub fn push(&mut self, point: TrackedPoint) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&TrackedPoint> {
        self.samples.back()
    }

    pub fn samples(&self) -> impl Iterator<Item = &TrackedPoint> {
        self.samples.iter()
    }

    /// Exponentially weighted average of the whole history.
    ///
    /// Returns `None` when the history is empty.
    pub fn weighted_average(&self) -> Option<TrackedPoint> {
        let newest = self.samples.len().checked_sub(1)? as f64;

        let mut total = 0.0;
        let mut acc = TrackedPoint::new(0.0, 0.0, 0.0, 0.0);
        for (i, s) in self.samples.iter().enumerate() {
            let w = (i as f64 - newest).exp();
            acc.x += s.x * w;
            acc.y += s.y * w;
            acc.z += s.z * w;
            acc.visibility += s.visibility * w;
            total += w;
        }

        Some(TrackedPoint::new(
            acc.x / total,
            acc.y / total,
            acc.z / total,
            acc.visibility / total,
        ))
    }
}

/// Per-joint smoothing state that persists across cycles.
#[derive(Debug, Clone)]
pub struct PointSmoother {
    window: usize,
    histories: HashMap<PoseLandmark, PointHistory>,
}

impl PointSmoother {
    /// Create a smoother keeping up to `window` samples per joint.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            histories: HashMap::new(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Record a raw sample for `joint` and return the smoothed estimate.
    pub fn update(&mut self, joint: PoseLandmark, raw: TrackedPoint) -> SmoothedPoint {
        let window = self.window;
        let history = self
            .histories
            .entry(joint)
            .or_insert_with(|| PointHistory::new(window));
        history.push(raw);

        if history.len() < MIN_SMOOTHING_SAMPLES {
            return raw;
        }
        history.weighted_average().unwrap_or(raw)
    }

    pub fn history(&self, joint: PoseLandmark) -> Option<&PointHistory> {
        self.histories.get(&joint)
    }

    /// Drop the history of one joint.
    pub fn reset(&mut self, joint: PoseLandmark) {
        self.histories.remove(&joint);
    }

    /// Drop every history.
    pub fn clear(&mut self) {
        self.histories.clear();
    }
}

impl Default for PointSmoother {
    fn default() -> Self {
        Self::new(10)
    }
}

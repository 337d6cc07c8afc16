//! PoseHue Vision: the per-frame analysis pipeline
//!
//! Finds objects of a target hue in a video frame and relates them to
//! tracked pose joints:
//! - **Segmentation:** RGBA → HSV → binary mask over configured hue ranges
//! - **Labeling:** 4-connected components with bounding boxes and pixel counts
//! - **Filtering:** Drop components below a minimum area
//! - **Smoothing:** Exponentially weighted history per joint
//! - **Proximity:** Point-to-rectangle distance against each joint
//! - **Scheduling:** Throttled, all-or-nothing cycles driven by external ticks
//!
//! This crate is pure computation with no I/O and no platform dependencies.
//! Frames and landmarks come in as data; cycle results go out as data.

pub mod filter;
pub mod label;
pub mod proximity;
pub mod scheduler;
pub mod segment;
pub mod smooth;

pub use filter::ObjectFilter;
pub use label::ComponentLabeler;
pub use proximity::ProximityMatcher;
pub use scheduler::{CycleOutput, FrameScheduler, TickOutcome};
pub use segment::ColorSegmenter;
pub use smooth::PointSmoother;

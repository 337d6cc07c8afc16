//! PoseHue Frame Model
//!
//! Defines the data contracts shared by the analysis pipeline and its callers:
//! - **Frames & masks:** RGBA8 pixel buffers and the binary masks derived from them
//! - **Regions:** Bounding boxes of connected mask components
//! - **Landmarks:** Normalized pose points keyed by joint identity
//! - **Detection config:** Thresholds and hue ranges for a run
//! - **Sessions:** Recorded tick streams for offline replay
//!
//! Pixel coordinates are integer column/row indices into the capture frame.
//! Landmark coordinates are normalized to roughly `[0.0, 1.0]` and must be
//! scaled by the frame dimensions before they are compared with regions.

pub mod detection;
pub mod error;
pub mod frame;
pub mod landmark;
pub mod region;
pub mod session;

pub use detection::*;
pub use error::*;
pub use frame::*;
pub use landmark::*;
pub use region::*;
pub use session::*;

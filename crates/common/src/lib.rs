//! PoseHue Common Utilities
//!
//! Shared infrastructure for all PoseHue crates:
//! - Error types and result aliases
//! - Clock and throttling utilities for the frame tick source
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;

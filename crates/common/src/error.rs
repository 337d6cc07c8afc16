//! Error types shared across PoseHue crates.

use std::path::PathBuf;

use posehue_frame_model::ModelError;

/// Top-level error type for PoseHue operations.
///
/// The per-frame pipeline never produces these; they surface only when
/// building inputs, loading configuration, or reading recorded sessions.
/// Invalid frames, configs, and session files arrive as [`ModelError`].
#[derive(Debug, thiserror::Error)]
pub enum PosehueError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using PosehueError.
pub type PosehueResult<T> = Result<T, PosehueError>;

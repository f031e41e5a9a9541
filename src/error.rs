use crate::config::SourceMode;
use std::path::PathBuf;
use thiserror::Error;

/// Every failure the viewer can surface to its caller.
///
/// End of a video stream is not represented here; frame sources signal it by
/// returning `None`.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("no eligible {mode} files found in {}", path.display())]
    EmptyPool { path: PathBuf, mode: SourceMode },

    #[error("failed to open source {}: {reason}", path.display())]
    SourceOpen { path: PathBuf, reason: String },

    #[error("detector invocation failed: {0}")]
    DetectorInvocation(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("display error: {0}")]
    Display(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid detection: {0}")]
    InvalidDetection(String),
}

impl ViewerError {
    pub fn source_open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ViewerError::SourceOpen {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

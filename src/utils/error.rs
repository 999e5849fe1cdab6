//! Error types and handling
//!
//! Common error types used across the crate.

use crate::capture::{CaptureError, SourceKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recording lifecycle errors
#[derive(Error, Debug)]
pub enum RecorderError {
    /// No capture source was enabled in the options
    #[error("no capture source selected")]
    NoSourceSelected,

    /// A capture source could not be acquired
    #[error("failed to acquire {source}: {cause}")]
    Acquisition {
        source: SourceKind,
        #[source]
        cause: CaptureError,
    },

    /// Every requested source returned zero tracks
    #[error("composite stream contains no tracks")]
    EmptyStream,

    #[error("encoder error: {0}")]
    Encoding(String),

    #[error("a recording is already in progress")]
    AlreadyRecording,

    #[error("no recording in progress")]
    NotRecording,

    #[error("download failed: {0}")]
    Download(#[from] std::io::Error),
}

/// Error response for a view layer
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&RecorderError> for ErrorResponse {
    fn from(error: &RecorderError) -> Self {
        let code = match error {
            RecorderError::NoSourceSelected => "NO_SOURCE_SELECTED",
            RecorderError::Acquisition { .. } => "SOURCE_ACQUISITION",
            RecorderError::EmptyStream => "EMPTY_STREAM",
            RecorderError::Encoding(_) => "ENCODING_ERROR",
            RecorderError::AlreadyRecording => "ALREADY_RECORDING",
            RecorderError::NotRecording => "NOT_RECORDING",
            RecorderError::Download(_) => "DOWNLOAD_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using RecorderError
pub type RecorderResult<T> = Result<T, RecorderError>;

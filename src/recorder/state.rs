//! Recording state management
//!
//! Defines the recording state machine, the per-session capture options,
//! and the summary of a finalized session.

use crate::encoder::MediaType;
use serde::{Deserialize, Serialize};

/// Current state of the recording controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No session in progress
    Idle,
    /// Waiting on capture source permission prompts
    Acquiring,
    /// Live preview bound and encoder producing chunks
    Recording,
    /// Stop requested; waiting for the encoder to flush
    Finalizing,
    /// Artifact materialized and previewable
    Stopped,
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Which capture sources to record
///
/// Read once at session start; immutable for the duration of the session.
/// At least one toggle must be enabled or `start()` is refused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureOptions {
    /// Capture microphone audio
    pub microphone: bool,

    /// Capture camera video
    pub camera: bool,

    /// Capture a screen share
    pub screen: bool,
}

impl CaptureOptions {
    pub fn any_enabled(&self) -> bool {
        self.microphone || self.camera || self.screen
    }

    /// Whether a user-media request (microphone/camera) is needed
    pub fn wants_user_media(&self) -> bool {
        self.microphone || self.camera
    }

    /// Whether a display-media request (screen share) is needed
    pub fn wants_display_media(&self) -> bool {
        self.screen
    }
}

/// Result of a finalized recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Recorded duration in milliseconds
    pub duration_ms: f64,

    /// Number of chunks delivered by the encoder
    pub chunk_count: usize,

    /// Total artifact size in bytes
    pub total_bytes: usize,

    /// Container format of the artifact
    pub media_type: MediaType,
}

//! Capture port definitions
//!
//! Host-agnostic traits for media capture sources. The host environment
//! supplies the implementations (device capture, screen share); the
//! controller only consumes the tracks they hand out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Kind of media carried by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

/// Stable identifier for a media track
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh unique track id
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A live media track handle owned by the host
///
/// Stopping a track releases the underlying device or screen share.
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &TrackId;

    fn kind(&self) -> TrackKind;

    /// Release the underlying device. Must be idempotent.
    fn stop(&self);

    fn is_live(&self) -> bool;
}

/// The set of tracks returned by one capture source request
pub struct SourceStream {
    tracks: Vec<Arc<dyn MediaTrack>>,
}

impl SourceStream {
    pub fn new(tracks: Vec<Arc<dyn MediaTrack>>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn into_tracks(self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks
    }
}

/// Constraints for a user-media request (microphone and/or camera)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

/// Constraints for a display-media request (screen share)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConstraints {
    pub video: bool,
}

/// Which capture source an operation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    UserMedia,
    DisplayMedia,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::UserMedia => f.write_str("user media"),
            SourceKind::DisplayMedia => f.write_str("display media"),
        }
    }
}

/// Capture source failures
#[derive(Error, Debug, Clone)]
pub enum CaptureError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Camera/microphone capture port
#[async_trait]
pub trait UserMediaSource: Send + Sync {
    /// Request tracks matching the constraints. Suspends until the host
    /// grants or denies access.
    async fn acquire(&self, constraints: MediaConstraints) -> Result<SourceStream, CaptureError>;
}

/// Screen-share capture port
#[async_trait]
pub trait DisplayMediaSource: Send + Sync {
    /// Request a screen-share track set. Suspends until the host grants
    /// or denies access.
    async fn acquire(&self, constraints: DisplayConstraints)
        -> Result<SourceStream, CaptureError>;
}

//! Media capture ports
//!
//! This module defines the capture-source side of the recording pipeline.
//! Implementations are host-provided and injected into the controller.

pub mod traits;

pub use traits::{
    CaptureError, DisplayConstraints, DisplayMediaSource, MediaConstraints, MediaTrack,
    SourceKind, SourceStream, TrackId, TrackKind, UserMediaSource,
};

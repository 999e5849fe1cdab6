//! Recording system module
//!
//! This module implements the recording session architecture:
//! - CaptureOptions and the recording state machine
//! - CompositeStream assembly from capture sources
//! - RecordingController orchestrating the session lifecycle

pub mod controller;
pub mod state;
pub mod stream;

#[cfg(test)]
pub(crate) mod fakes;

pub use controller::{ControlEvent, HostPorts, RecorderEvent, RecordingController};
pub use state::{CaptureOptions, RecordingState, SessionSummary};
pub use stream::CompositeStream;

//! reel - in-memory media recording session controller
//!
//! Coordinates host-provided capture sources, an encoder, and presentation
//! surfaces through one recording lifecycle: acquire, preview, record,
//! finalize, download. The host subsystems (device capture, screen share,
//! encoding, display surfaces) are injected as trait objects; the crate
//! owns only the state machine and stream-composition policy.

pub mod artifact;
pub mod capture;
pub mod encoder;
pub mod recorder;
pub mod surface;
pub mod utils;

pub use artifact::Artifact;
pub use recorder::{CaptureOptions, HostPorts, RecorderEvent, RecordingController, RecordingState};
pub use utils::error::{RecorderError, RecorderResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for hosts that embed the crate
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reel=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

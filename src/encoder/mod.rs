//! Encoder port
//!
//! The encoder is a host-provided subsystem that turns a live composite
//! stream into an ordered sequence of encoded chunks. Chunks and the final
//! flush notification arrive asynchronously over one channel, strictly in
//! delivery order.

use crate::recorder::stream::CompositeStream;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

/// Container format for encoded output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Webm,
    Mp4,
}

impl MediaType {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Webm => "webm",
            MediaType::Mp4 => "mp4",
        }
    }

    /// Get the MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaType::Webm => "video/webm",
            MediaType::Mp4 => "video/mp4",
        }
    }
}

impl Default for MediaType {
    fn default() -> Self {
        Self::Webm
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Events delivered by a running encoder
///
/// `Data` events arrive in encoding order; `Finalized` is delivered once,
/// after every `Data` event for the session.
#[derive(Debug, Clone)]
pub enum EncoderEvent {
    /// An encoded chunk is available
    Data(Vec<u8>),
    /// All buffered data has been flushed; no further events follow
    Finalized,
    /// Encoding failed mid-session; no further events follow
    Error(String),
}

/// Encoder failures
#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("unsupported media type: {0}")]
    Unsupported(MediaType),

    #[error("encoder error: {0}")]
    Internal(String),
}

/// Controls for a running encoder
#[async_trait]
pub trait Encoder: Send {
    /// Begin producing chunks
    async fn start(&mut self) -> Result<(), EncoderError>;

    /// Request finalization. Trailing `Data` events and one `Finalized`
    /// event may still be delivered after this returns.
    async fn stop(&mut self) -> Result<(), EncoderError>;
}

/// An encoder bound to a stream, plus its ordered event channel
pub struct EncoderPipeline {
    pub controls: Box<dyn Encoder>,
    pub events: mpsc::Receiver<EncoderEvent>,
}

/// Port for constructing encoders
pub trait EncoderFactory: Send + Sync {
    /// Bind an encoder to the given stream and container format
    fn open(
        &self,
        stream: &CompositeStream,
        media_type: MediaType,
    ) -> Result<EncoderPipeline, EncoderError>;
}

//! Downloadable artifact
//!
//! The finalized output of a recording session: the encoder's chunks
//! concatenated in delivery order, tagged with a container format.

use crate::encoder::MediaType;
use chrono::{SecondsFormat, Utc};

/// Immutable finalized recording output
#[derive(Debug, Clone)]
pub struct Artifact {
    bytes: Vec<u8>,
    media_type: MediaType,
}

impl Artifact {
    /// Concatenate encoded chunks in delivery order
    pub fn from_chunks(chunks: Vec<Vec<u8>>, media_type: MediaType) -> Self {
        let mut bytes = Vec::with_capacity(chunks.iter().map(Vec::len).sum());
        for chunk in chunks {
            bytes.extend_from_slice(&chunk);
        }
        Self { bytes, media_type }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Derive a download filename from the current time.
    ///
    /// Uses download time, not recording time, so repeated downloads of the
    /// same artifact never collide.
    pub fn download_filename(&self) -> String {
        format!(
            "video_{}.{}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            self.media_type.extension()
        )
    }
}

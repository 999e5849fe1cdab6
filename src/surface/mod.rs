//! Presentation ports
//!
//! Surfaces are externally owned; the controller only binds and unbinds
//! them. A host shell (or a test harness) supplies the implementations.

use crate::artifact::Artifact;
use crate::recorder::stream::CompositeStream;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Transient reference to a materialized artifact, analogous to an object
/// URL. Valid until revoked through the issuing [`BlobHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues and revokes transient artifact references
pub trait BlobHost: Send + Sync {
    fn create_url(&self, artifact: &Artifact) -> ObjectUrl;

    /// Release the reference. Must tolerate an already-revoked url.
    fn revoke_url(&self, url: &ObjectUrl);
}

/// Live preview surface
pub trait PreviewSurface: Send + Sync {
    fn show_live(&self, stream: &CompositeStream);

    fn clear(&self);
}

/// Recorded playback surface
pub trait PlaybackSurface: Send + Sync {
    fn play(&self, url: &ObjectUrl);

    fn clear(&self);
}

/// Visible indicator for option-validation failures
pub trait ErrorIndicator: Send + Sync {
    fn show(&self, message: &str);

    fn hide(&self);
}

/// Produces a named file download of an artifact
pub trait DownloadSink: Send + Sync {
    fn save(&self, filename: &str, artifact: &Artifact) -> io::Result<()>;
}

/// Download sink writing artifacts into a directory
pub struct FileDownloadSink {
    dir: PathBuf,
}

impl FileDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for FileDownloadSink {
    fn save(&self, filename: &str, artifact: &Artifact) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, artifact.bytes())?;
        tracing::info!("Saved recording to {:?}", path);
        Ok(())
    }
}

//! Composite stream assembly
//!
//! Merges the tracks returned by every requested capture source into one
//! stream for preview and encoding.

use crate::capture::{MediaTrack, SourceStream, TrackId, TrackKind};
use std::collections::HashSet;
use std::sync::Arc;

/// The merged, deduplicated track set for one recording session
///
/// Track order is stable: sources in request order, video tracks ahead of
/// audio tracks within each source. Duplicate track ids are dropped.
pub struct CompositeStream {
    tracks: Vec<Arc<dyn MediaTrack>>,
}

impl CompositeStream {
    /// Merge source streams in request order
    pub fn from_sources(sources: Vec<SourceStream>) -> Self {
        let mut seen: HashSet<TrackId> = HashSet::new();
        let mut tracks: Vec<Arc<dyn MediaTrack>> = Vec::new();

        for source in sources {
            let source_tracks = source.into_tracks();
            for kind in [TrackKind::Video, TrackKind::Audio] {
                for track in source_tracks.iter().filter(|t| t.kind() == kind) {
                    if seen.insert(track.id().clone()) {
                        tracks.push(Arc::clone(track));
                    }
                }
            }
        }

        Self { tracks }
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn track_ids(&self) -> Vec<TrackId> {
        self.tracks.iter().map(|t| t.id().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Stop every track, releasing the underlying devices
    pub fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
        tracing::debug!("Stopped {} tracks", self.tracks.len());
    }
}

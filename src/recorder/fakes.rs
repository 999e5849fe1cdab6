//! Test doubles for the recording pipeline
//!
//! Fakes stand in for the host-provided capture sources, encoder, and
//! presentation surfaces, recording the calls the controller makes so
//! tests can assert on ordering and resource release.

use crate::artifact::Artifact;
use crate::capture::{
    CaptureError, DisplayConstraints, DisplayMediaSource, MediaConstraints, MediaTrack,
    SourceStream, TrackId, TrackKind, UserMediaSource,
};
use crate::encoder::{
    Encoder, EncoderError, EncoderEvent, EncoderFactory, EncoderPipeline, MediaType,
};
use crate::recorder::stream::CompositeStream;
use crate::surface::{
    BlobHost, DownloadSink, ErrorIndicator, ObjectUrl, PlaybackSurface, PreviewSurface,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

/// A track that records whether it was stopped
pub(crate) struct FakeTrack {
    id: TrackId,
    kind: TrackKind,
    stopped: AtomicBool,
}

impl FakeTrack {
    pub fn video(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: TrackId::new(id),
            kind: TrackKind::Video,
            stopped: AtomicBool::new(false),
        })
    }

    pub fn audio(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: TrackId::new(id),
            kind: TrackKind::Audio,
            stopped: AtomicBool::new(false),
        })
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl MediaTrack for FakeTrack {
    fn id(&self) -> &TrackId {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        !self.stopped()
    }
}

/// Fake user-media provider counting requests
pub(crate) struct FakeUserMedia {
    tracks: Mutex<Vec<Arc<dyn MediaTrack>>>,
    fail_with: Mutex<Option<CaptureError>>,
    last_constraints: Mutex<Option<MediaConstraints>>,
    gate: Mutex<Option<Arc<Notify>>>,
    pub requests: AtomicUsize,
}

impl FakeUserMedia {
    pub fn with_tracks(tracks: Vec<Arc<FakeTrack>>) -> Arc<Self> {
        Arc::new(Self {
            tracks: Mutex::new(tracks.into_iter().map(|t| t as Arc<dyn MediaTrack>).collect()),
            fail_with: Mutex::new(None),
            last_constraints: Mutex::new(None),
            gate: Mutex::new(None),
            requests: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: CaptureError) -> Arc<Self> {
        let fake = Self::with_tracks(vec![]);
        *fake.fail_with.lock() = Some(error);
        fake
    }

    /// Acquisition suspends until the returned gate is notified, standing
    /// in for a pending permission prompt
    pub fn gated(tracks: Vec<Arc<FakeTrack>>) -> (Arc<Self>, Arc<Notify>) {
        let fake = Self::with_tracks(tracks);
        let gate = Arc::new(Notify::new());
        *fake.gate.lock() = Some(gate.clone());
        (fake, gate)
    }

    pub fn last_constraints(&self) -> Option<MediaConstraints> {
        *self.last_constraints.lock()
    }
}

#[async_trait]
impl UserMediaSource for FakeUserMedia {
    async fn acquire(&self, constraints: MediaConstraints) -> Result<SourceStream, CaptureError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.last_constraints.lock() = Some(constraints);
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(error) = self.fail_with.lock().clone() {
            return Err(error);
        }
        Ok(SourceStream::new(self.tracks.lock().clone()))
    }
}

/// Fake display-media provider counting requests
pub(crate) struct FakeDisplayMedia {
    tracks: Mutex<Vec<Arc<dyn MediaTrack>>>,
    fail_with: Mutex<Option<CaptureError>>,
    pub requests: AtomicUsize,
}

impl FakeDisplayMedia {
    pub fn with_tracks(tracks: Vec<Arc<FakeTrack>>) -> Arc<Self> {
        Arc::new(Self {
            tracks: Mutex::new(tracks.into_iter().map(|t| t as Arc<dyn MediaTrack>).collect()),
            fail_with: Mutex::new(None),
            requests: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: CaptureError) -> Arc<Self> {
        let fake = Self::with_tracks(vec![]);
        *fake.fail_with.lock() = Some(error);
        fake
    }
}

#[async_trait]
impl DisplayMediaSource for FakeDisplayMedia {
    async fn acquire(
        &self,
        _constraints: DisplayConstraints,
    ) -> Result<SourceStream, CaptureError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.fail_with.lock().clone() {
            return Err(error);
        }
        Ok(SourceStream::new(self.tracks.lock().clone()))
    }
}

struct FakeEncoder {
    started: Arc<AtomicBool>,
    stop_signalled: Arc<AtomicBool>,
}

#[async_trait]
impl Encoder for FakeEncoder {
    async fn start(&mut self) -> Result<(), EncoderError> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EncoderError> {
        self.stop_signalled.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Fake encoder factory exposing the event sender to tests
pub(crate) struct FakeEncoderFactory {
    tx: Mutex<Option<mpsc::Sender<EncoderEvent>>>,
    fail_open: AtomicBool,
    pub started: Arc<AtomicBool>,
    pub stop_signalled: Arc<AtomicBool>,
    pub opens: AtomicUsize,
}

impl FakeEncoderFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tx: Mutex::new(None),
            fail_open: AtomicBool::new(false),
            started: Arc::new(AtomicBool::new(false)),
            stop_signalled: Arc::new(AtomicBool::new(false)),
            opens: AtomicUsize::new(0),
        })
    }

    pub fn failing_open() -> Arc<Self> {
        let fake = Self::new();
        fake.fail_open.store(true, Ordering::SeqCst);
        fake
    }

    /// Event sender for the most recently opened pipeline
    pub fn sender(&self) -> mpsc::Sender<EncoderEvent> {
        self.tx.lock().clone().expect("encoder never opened")
    }
}

impl EncoderFactory for FakeEncoderFactory {
    fn open(
        &self,
        _stream: &CompositeStream,
        _media_type: MediaType,
    ) -> Result<EncoderPipeline, EncoderError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(EncoderError::Internal("open refused".into()));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(32);
        *self.tx.lock() = Some(tx);
        Ok(EncoderPipeline {
            controls: Box::new(FakeEncoder {
                started: self.started.clone(),
                stop_signalled: self.stop_signalled.clone(),
            }),
            events: rx,
        })
    }
}

/// One fake standing in for every presentation port, keeping an ordered
/// call log so tests can assert sequencing
pub(crate) struct FakeHost {
    calls: Mutex<Vec<String>>,
    saved: Mutex<Vec<(String, Vec<u8>)>>,
    previewed: Mutex<Vec<String>>,
    error_visible: AtomicBool,
    url_seq: AtomicUsize,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
            previewed: Mutex::new(Vec::new()),
            error_visible: AtomicBool::new(false),
            url_seq: AtomicUsize::new(0),
        })
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().clone()
    }

    pub fn previewed_tracks(&self) -> Vec<String> {
        self.previewed.lock().clone()
    }

    pub fn error_visible(&self) -> bool {
        self.error_visible.load(Ordering::SeqCst)
    }
}

impl PreviewSurface for FakeHost {
    fn show_live(&self, stream: &CompositeStream) {
        *self.previewed.lock() = stream.track_ids().iter().map(|id| id.to_string()).collect();
        self.record("preview.show_live".into());
    }

    fn clear(&self) {
        self.record("preview.clear".into());
    }
}

impl PlaybackSurface for FakeHost {
    fn play(&self, url: &ObjectUrl) {
        self.record(format!("playback.play({url})"));
    }

    fn clear(&self) {
        self.record("playback.clear".into());
    }
}

impl ErrorIndicator for FakeHost {
    fn show(&self, message: &str) {
        self.error_visible.store(true, Ordering::SeqCst);
        self.record(format!("error.show({message})"));
    }

    fn hide(&self) {
        self.error_visible.store(false, Ordering::SeqCst);
        self.record("error.hide".into());
    }
}

impl BlobHost for FakeHost {
    fn create_url(&self, _artifact: &Artifact) -> ObjectUrl {
        let n = self.url_seq.fetch_add(1, Ordering::SeqCst);
        let url = ObjectUrl::new(format!("blob:reel/{n}"));
        self.record(format!("blob.create({url})"));
        url
    }

    fn revoke_url(&self, url: &ObjectUrl) {
        self.record(format!("blob.revoke({url})"));
    }
}

impl DownloadSink for FakeHost {
    fn save(&self, filename: &str, artifact: &Artifact) -> io::Result<()> {
        self.record(format!("download.save({filename})"));
        self.saved
            .lock()
            .push((filename.to_string(), artifact.bytes().to_vec()));
        Ok(())
    }
}

//! Recording controller
//!
//! Orchestrates the capture sources, the encoder, and the presentation
//! surfaces through the recording lifecycle:
//! idle → acquiring → recording → finalizing → stopped → downloaded.
//!
//! The encoder's finalize notification, not the stop call, is the
//! authoritative signal to materialize the artifact; trailing chunks
//! delivered between the two are appended in arrival order.

use super::state::{CaptureOptions, RecordingState, SessionSummary};
use super::stream::CompositeStream;
use crate::artifact::Artifact;
use crate::capture::{
    CaptureError, DisplayConstraints, DisplayMediaSource, MediaConstraints, SourceKind,
    SourceStream, UserMediaSource,
};
use crate::encoder::{Encoder, EncoderEvent, EncoderFactory, EncoderPipeline, MediaType};
use crate::surface::{
    BlobHost, DownloadSink, ErrorIndicator, ObjectUrl, PlaybackSurface, PreviewSurface,
};
use crate::utils::error::{RecorderError, RecorderResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

/// Events emitted through the recording lifecycle
#[derive(Debug, Clone)]
pub enum RecorderEvent {
    /// Preview bound and encoder producing chunks
    Started,
    /// Stop requested; encoder flushing
    Stopping,
    /// Acquisition was cancelled before recording began
    Cancelled,
    /// Artifact materialized and previewable
    Finalized(SessionSummary),
    /// Artifact saved under the given filename
    Downloaded(String),
    /// Session abandoned
    Error(String),
}

/// Named UI trigger events routed to the controller
#[derive(Debug, Clone)]
pub enum ControlEvent {
    Start(CaptureOptions),
    Stop,
    Download,
}

/// Host ports the controller is constructed with
///
/// All ports are externally owned; the controller never manages their
/// lifecycle.
pub struct HostPorts {
    pub user_media: Arc<dyn UserMediaSource>,
    pub display_media: Arc<dyn DisplayMediaSource>,
    pub encoder_factory: Arc<dyn EncoderFactory>,
    pub preview: Arc<dyn PreviewSurface>,
    pub playback: Arc<dyn PlaybackSurface>,
    pub error_indicator: Arc<dyn ErrorIndicator>,
    pub blob_host: Arc<dyn BlobHost>,
    pub downloads: Arc<dyn DownloadSink>,
}

/// Mutable controller state, shared with the chunk pump task
struct Inner {
    state: RecordingState,
    cancel_requested: bool,
    session_id: Option<Uuid>,
    chunks: Vec<Vec<u8>>,
    stream: Option<CompositeStream>,
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
    artifact: Option<Arc<Artifact>>,
    artifact_url: Option<ObjectUrl>,
    summary: Option<SessionSummary>,
}

impl Inner {
    fn new() -> Self {
        Self {
            state: RecordingState::Idle,
            cancel_requested: false,
            session_id: None,
            chunks: Vec::new(),
            stream: None,
            started_at: None,
            stopped_at: None,
            artifact: None,
            artifact_url: None,
            summary: None,
        }
    }

    fn elapsed_ms(&self) -> f64 {
        match (self.started_at, self.stopped_at) {
            (Some(start), Some(end)) => end.duration_since(start).as_secs_f64() * 1000.0,
            (Some(start), None) => start.elapsed().as_secs_f64() * 1000.0,
            _ => 0.0,
        }
    }
}

/// Coordinates one recording session at a time
pub struct RecordingController {
    ports: HostPorts,
    media_type: MediaType,
    inner: Arc<Mutex<Inner>>,
    encoder: tokio::sync::Mutex<Option<Box<dyn Encoder>>>,
    event_tx: broadcast::Sender<RecorderEvent>,
}

impl RecordingController {
    /// Create a controller producing WebM output
    pub fn new(ports: HostPorts) -> Self {
        Self::with_media_type(ports, MediaType::default())
    }

    pub fn with_media_type(ports: HostPorts, media_type: MediaType) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            ports,
            media_type,
            inner: Arc::new(Mutex::new(Inner::new())),
            encoder: tokio::sync::Mutex::new(None),
            event_tx,
        }
    }

    /// Get the current recording state
    pub fn state(&self) -> RecordingState {
        self.inner.lock().state
    }

    /// Subscribe to recording events
    pub fn subscribe(&self) -> broadcast::Receiver<RecorderEvent> {
        self.event_tx.subscribe()
    }

    /// Elapsed recording time in milliseconds, frozen once stopped
    pub fn duration_ms(&self) -> f64 {
        self.inner.lock().elapsed_ms()
    }

    /// Summary of the most recently finalized session
    pub fn last_summary(&self) -> Option<SessionSummary> {
        self.inner.lock().summary.clone()
    }

    /// The finalized artifact, if one exists
    pub fn artifact(&self) -> Option<Arc<Artifact>> {
        self.inner.lock().artifact.clone()
    }

    /// Start a recording session
    ///
    /// Valid from `Idle` or `Stopped`; starting from `Stopped` discards the
    /// previous artifact. Options are validated before any source request:
    /// with nothing enabled the error indicator is shown, no tracks are
    /// requested, and the state is unchanged.
    pub async fn start(&self, options: CaptureOptions) -> RecorderResult<()> {
        let leftover_url = {
            let mut inner = self.inner.lock();
            if !matches!(
                inner.state,
                RecordingState::Idle | RecordingState::Stopped
            ) {
                return Err(RecorderError::AlreadyRecording);
            }
            if !options.any_enabled() {
                drop(inner);
                self.ports
                    .error_indicator
                    .show("select at least one capture source");
                return Err(RecorderError::NoSourceSelected);
            }
            inner.state = RecordingState::Acquiring;
            inner.cancel_requested = false;
            inner.artifact = None;
            inner.summary = None;
            inner.artifact_url.take()
        };
        self.ports.error_indicator.hide();
        if let Some(url) = leftover_url {
            self.ports.blob_host.revoke_url(&url);
            self.ports.playback.clear();
        }

        tracing::info!(?options, "Starting recording");

        let mut sources: Vec<SourceStream> = Vec::new();

        if options.wants_user_media() {
            let constraints = MediaConstraints {
                audio: options.microphone,
                video: options.camera,
            };
            match self.ports.user_media.acquire(constraints).await {
                Ok(stream) => sources.push(stream),
                Err(cause) => {
                    return self.fail_acquisition(SourceKind::UserMedia, cause, &sources)
                }
            }
        }

        if self.cancel_requested() {
            return self.abort_cancelled(&sources);
        }

        if options.wants_display_media() {
            let constraints = DisplayConstraints { video: true };
            match self.ports.display_media.acquire(constraints).await {
                Ok(stream) => sources.push(stream),
                Err(cause) => {
                    return self.fail_acquisition(SourceKind::DisplayMedia, cause, &sources)
                }
            }
        }

        if self.cancel_requested() {
            return self.abort_cancelled(&sources);
        }

        let stream = CompositeStream::from_sources(sources);
        if stream.is_empty() {
            self.inner.lock().state = RecordingState::Idle;
            return Err(RecorderError::EmptyStream);
        }

        self.ports.preview.show_live(&stream);

        let pipeline = match self.ports.encoder_factory.open(&stream, self.media_type) {
            Ok(pipeline) => pipeline,
            Err(e) => return self.fail_encoder(stream, e.to_string()),
        };
        let EncoderPipeline {
            mut controls,
            events,
        } = pipeline;
        if let Err(e) = controls.start().await {
            return self.fail_encoder(stream, e.to_string());
        }

        let session_id = Uuid::new_v4();
        {
            let mut inner = self.inner.lock();
            inner.session_id = Some(session_id);
            inner.chunks = Vec::new();
            inner.stream = Some(stream);
            inner.started_at = Some(Instant::now());
            inner.stopped_at = None;
            inner.state = RecordingState::Recording;
        }
        *self.encoder.lock().await = Some(controls);
        self.spawn_pump(session_id, events);

        let _ = self.event_tx.send(RecorderEvent::Started);
        tracing::info!(session = %session_id, "Recording started");
        Ok(())
    }

    /// Stop the active recording session
    ///
    /// Signals the encoder to finalize, stops every track synchronously and
    /// clears the live preview. The artifact is materialized later, when
    /// the encoder's finalize notification arrives. Called while acquiring,
    /// it requests cancellation instead; called from any other state it is
    /// a safe no-op that reports `NotRecording`.
    pub async fn stop(&self) -> RecorderResult<()> {
        {
            let mut inner = self.inner.lock();
            match inner.state {
                RecordingState::Acquiring => {
                    inner.cancel_requested = true;
                    tracing::info!("Stop requested during acquisition; cancelling");
                    return Ok(());
                }
                RecordingState::Recording => {
                    inner.state = RecordingState::Finalizing;
                    inner.stopped_at = Some(Instant::now());
                }
                _ => return Err(RecorderError::NotRecording),
            }
        }

        tracing::info!("Stopping recording");

        if let Some(mut encoder) = self.encoder.lock().await.take() {
            if let Err(e) = encoder.stop().await {
                tracing::warn!("Encoder stop failed: {}", e);
            }
        }

        // Devices are released with the stop call, independent of how long
        // the encoder takes to flush.
        let stream = self.inner.lock().stream.take();
        if let Some(stream) = stream {
            stream.stop_all();
        }
        self.ports.preview.clear();

        let _ = self.event_tx.send(RecorderEvent::Stopping);
        Ok(())
    }

    /// Download the finalized artifact as a named file
    ///
    /// Returns the filename on success, or `None` when no artifact exists
    /// (stale trigger). The object URL is revoked only after the sink has
    /// produced the download; the artifact itself is retained, so repeated
    /// calls save again under a fresh timestamped name.
    pub async fn download(&self) -> RecorderResult<Option<String>> {
        let (artifact, url) = {
            let inner = self.inner.lock();
            if inner.state != RecordingState::Stopped {
                return Ok(None);
            }
            match inner.artifact.clone() {
                Some(artifact) => (artifact, inner.artifact_url.clone()),
                None => return Ok(None),
            }
        };

        let filename = artifact.download_filename();
        self.ports.downloads.save(&filename, &artifact)?;

        // Revoke the handle captured above, never a cleared field.
        self.inner.lock().artifact_url = None;
        if let Some(url) = url {
            self.ports.blob_host.revoke_url(&url);
            self.ports.playback.clear();
        }

        tracing::info!("Downloaded {}", filename);
        let _ = self.event_tx.send(RecorderEvent::Downloaded(filename.clone()));
        Ok(Some(filename))
    }

    /// Drive the controller from a stream of UI trigger events
    ///
    /// Runs until the trigger channel closes. Rejected triggers (stale or
    /// duplicate presses) are logged, never fatal.
    pub async fn run(&self, mut triggers: mpsc::Receiver<ControlEvent>) {
        while let Some(event) = triggers.recv().await {
            let result = match event {
                ControlEvent::Start(options) => self.start(options).await,
                ControlEvent::Stop => self.stop().await,
                ControlEvent::Download => self.download().await.map(|_| ()),
            };
            if let Err(e) = result {
                tracing::warn!("Control trigger rejected: {}", e);
            }
        }
    }

    fn cancel_requested(&self) -> bool {
        self.inner.lock().cancel_requested
    }

    fn abort_cancelled(&self, sources: &[SourceStream]) -> RecorderResult<()> {
        release_sources(sources);
        {
            let mut inner = self.inner.lock();
            inner.cancel_requested = false;
            inner.state = RecordingState::Idle;
        }
        tracing::info!("Acquisition cancelled; released acquired tracks");
        let _ = self.event_tx.send(RecorderEvent::Cancelled);
        Ok(())
    }

    fn fail_acquisition(
        &self,
        source: SourceKind,
        cause: CaptureError,
        sources: &[SourceStream],
    ) -> RecorderResult<()> {
        release_sources(sources);
        self.inner.lock().state = RecordingState::Idle;
        let error = RecorderError::Acquisition { source, cause };
        tracing::error!("Acquisition failed: {}", error);
        let _ = self.event_tx.send(RecorderEvent::Error(error.to_string()));
        Err(error)
    }

    fn fail_encoder(&self, stream: CompositeStream, message: String) -> RecorderResult<()> {
        self.ports.preview.clear();
        stream.stop_all();
        self.inner.lock().state = RecordingState::Idle;
        tracing::error!("Encoder setup failed: {}", message);
        let _ = self.event_tx.send(RecorderEvent::Error(message.clone()));
        Err(RecorderError::Encoding(message))
    }

    fn spawn_pump(&self, session_id: Uuid, events: mpsc::Receiver<EncoderEvent>) {
        let pump = ChunkPump {
            session_id,
            inner: Arc::clone(&self.inner),
            preview: Arc::clone(&self.ports.preview),
            playback: Arc::clone(&self.ports.playback),
            blob_host: Arc::clone(&self.ports.blob_host),
            event_tx: self.event_tx.clone(),
            media_type: self.media_type,
        };
        tokio::spawn(pump.run(events));
    }
}

fn release_sources(sources: &[SourceStream]) {
    for source in sources {
        for track in source.tracks() {
            track.stop();
        }
    }
}

/// Consumes encoder events for one session, strictly in delivery order
struct ChunkPump {
    session_id: Uuid,
    inner: Arc<Mutex<Inner>>,
    preview: Arc<dyn PreviewSurface>,
    playback: Arc<dyn PlaybackSurface>,
    blob_host: Arc<dyn BlobHost>,
    event_tx: broadcast::Sender<RecorderEvent>,
    media_type: MediaType,
}

impl ChunkPump {
    async fn run(self, mut events: mpsc::Receiver<EncoderEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                EncoderEvent::Data(chunk) => {
                    let mut inner = self.inner.lock();
                    if inner.session_id == Some(self.session_id) {
                        inner.chunks.push(chunk);
                    }
                }
                EncoderEvent::Finalized => {
                    self.materialize();
                    break;
                }
                EncoderEvent::Error(message) => {
                    self.abandon(message);
                    break;
                }
            }
        }
    }

    /// Concatenate the session's chunks into the downloadable artifact and
    /// rebind the playback surface to it
    fn materialize(&self) {
        let (chunks, duration_ms) = {
            let mut inner = self.inner.lock();
            // A pump from a replaced session must not touch current state.
            if inner.session_id != Some(self.session_id) {
                return;
            }
            (std::mem::take(&mut inner.chunks), inner.elapsed_ms())
        };

        let chunk_count = chunks.len();
        let artifact = Arc::new(Artifact::from_chunks(chunks, self.media_type));
        let summary = SessionSummary {
            duration_ms,
            chunk_count,
            total_bytes: artifact.len(),
            media_type: self.media_type,
        };

        let url = self.blob_host.create_url(&artifact);
        self.playback.play(&url);

        {
            let mut inner = self.inner.lock();
            inner.artifact = Some(artifact);
            inner.artifact_url = Some(url);
            inner.summary = Some(summary.clone());
            inner.state = RecordingState::Stopped;
        }

        tracing::info!(
            "Recording finalized: {} chunks, {} bytes",
            summary.chunk_count,
            summary.total_bytes
        );
        let _ = self.event_tx.send(RecorderEvent::Finalized(summary));
    }

    /// Abandon the session after a mid-recording encoder failure
    fn abandon(&self, message: String) {
        let stream = {
            let mut inner = self.inner.lock();
            if inner.session_id != Some(self.session_id) {
                return;
            }
            inner.chunks.clear();
            inner.session_id = None;
            inner.state = RecordingState::Idle;
            inner.stream.take()
        };
        if let Some(stream) = stream {
            stream.stop_all();
        }
        self.preview.clear();

        tracing::error!("Encoder failed mid-session: {}", message);
        let _ = self.event_tx.send(RecorderEvent::Error(message));
    }
}

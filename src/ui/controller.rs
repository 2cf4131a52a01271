// Scan loop controller - The QR scanner control's state machine
//
// This module contains the ScanLoopController which coordinates between:
// - A camera source (opened through a CameraProvider)
// - A QR decoder (one per scan session, from a DecoderFactory)
// - A preview surface the camera renders into
// - The Dispatcher work queue that paces the scan loop
//
// It handles:
// - Camera open on surface attach → scanning once the camera is ready
// - One decode attempt per turn while scanning, retrying frames without a code
// - Success and fault notifications via ScannerNotifier

use crate::metrics::ScanMetrics;
use crate::models::{FaultPolicy, LuminanceBuffer, ScannerConfig, ScannerState};
use crate::services::camera::{CameraError, CameraProvider, CameraSource};
use crate::services::decoding::{DecodeError, DecodeRequest, DecoderFactory, QR_ONLY_HINTS, QrDecoder};
use crate::services::surface::PreviewSurface;
use crate::state::{ScanError, ScannerEvent, ScannerNotifier};
use crate::ui::dispatcher::{Dispatcher, DispatcherHandle, Work};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Internal lifecycle, carrying the resources each phase owns.
///
/// Camera, luminance buffer and decoder only coexist inside `Scanning`, so
/// leaving that phase releases all three together.
enum Phase {
    Uninitialized,
    Initializing { camera: Box<dyn CameraSource> },
    Scanning(ScanSession),
    Stopped,
}

impl Phase {
    fn state(&self) -> ScannerState {
        match self {
            Phase::Uninitialized => ScannerState::Uninitialized,
            Phase::Initializing { .. } => ScannerState::Initializing,
            Phase::Scanning(_) => ScannerState::Scanning,
            Phase::Stopped => ScannerState::Stopped,
        }
    }
}

/// Resources of one Scanning phase
struct ScanSession {
    camera: Box<dyn CameraSource>,
    luminance: LuminanceBuffer,
    decoder: Box<dyn QrDecoder>,
    /// Distinguishes this session's queued attempts from stale ones
    epoch: u64,
}

/// Why a single attempt did not produce text
enum AttemptFailure {
    Frame(CameraError),
    Decode(DecodeError),
}

impl ScanSession {
    /// Focus (best-effort), grab a frame, decode it with the QR-only hint
    fn attempt(
        &mut self,
        autofocus: bool,
        metrics: &ScanMetrics,
    ) -> Result<String, AttemptFailure> {
        if autofocus && self.camera.is_focus_supported() {
            metrics.record_focus_request();
            if let Err(e) = self.camera.focus() {
                tracing::debug!("Autofocus request failed, continuing: {}", e);
            }
        }

        self.camera
            .fill_luminance(&mut self.luminance)
            .map_err(AttemptFailure::Frame)?;

        let request = DecodeRequest::new(&self.luminance, &QR_ONLY_HINTS);
        self.decoder.decode(&request).map_err(AttemptFailure::Decode)
    }
}

/// Camera-preview control that scans every frame for a QR code.
///
/// The controller is a single-threaded state machine:
///
/// ```text
/// Uninitialized ──attach_surface──▶ Initializing ──camera ready──▶ Scanning
///       ▲                               │                           │
///       └────── camera open failed ─────┘          decoded / stop / fault
///                                                                   ▼
///                         Initializing ◀──start_scanning / attach── Stopped
/// ```
///
/// Asynchronous inputs (camera completions, rescheduled attempts, commands
/// from a [`DispatcherHandle`]) are queued and processed one per turn by
/// [`run_turn`](Self::run_turn) or [`pump`](Self::pump). Outcomes are
/// published as [`ScannerEvent`]s; see [`subscribe`](Self::subscribe).
///
/// # Example
/// ```ignore
/// let mut controller = ScanLoopController::new(config, cameras, RqrrDecoderFactory);
/// let mut events = controller.subscribe();
/// controller.attach_surface(Box::new(surface));
///
/// loop {
///     controller.run_turn().await;
///     if let Ok(ScannerEvent::ScanComplete { text }) = events.try_recv() {
///         break text;
///     }
/// }
/// ```
pub struct ScanLoopController {
    config: ScannerConfig,

    /// Opens cameras on attach and on restart
    cameras: Box<dyn CameraProvider>,

    /// Creates the decoder for each scan session
    decoders: Box<dyn DecoderFactory>,

    surface: Option<Box<dyn PreviewSurface>>,

    phase: Phase,

    /// Last state published through `StateChanged`
    published: ScannerState,

    /// Epoch of the most recently started session
    epoch: u64,

    dispatcher: Dispatcher,

    notifier: ScannerNotifier,

    metrics: Arc<ScanMetrics>,
}

impl ScanLoopController {
    /// Create a controller in the Uninitialized state
    ///
    /// # Arguments
    /// * `config` - Scanner settings (camera kind, autofocus, fault policy)
    /// * `cameras` - Opens the camera when a surface is attached
    /// * `decoders` - Supplies a fresh decoder for each scan session
    pub fn new(
        config: ScannerConfig,
        cameras: impl CameraProvider + 'static,
        decoders: impl DecoderFactory + 'static,
    ) -> Self {
        let metrics = Arc::new(ScanMetrics::new());
        let notifier = ScannerNotifier::new(config.event_capacity, metrics.clone());

        Self {
            config,
            cameras: Box::new(cameras),
            decoders: Box::new(decoders),
            surface: None,
            phase: Phase::Uninitialized,
            published: ScannerState::Uninitialized,
            epoch: 0,
            dispatcher: Dispatcher::new(),
            notifier,
            metrics,
        }
    }

    pub fn state(&self) -> ScannerState {
        self.phase.state()
    }

    pub fn is_scanning(&self) -> bool {
        self.state().is_scanning()
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<ScanMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Subscribe to scanner notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ScannerEvent> {
        self.notifier.subscribe()
    }

    /// Handle for posting commands to this controller from other tasks
    pub fn handle(&self) -> DispatcherHandle {
        self.dispatcher.handle()
    }

    /// True when no work is queued for the next turn
    pub fn is_idle(&self) -> bool {
        self.dispatcher.is_idle()
    }

    /// Bind the controller to a rendering surface.
    ///
    /// Opens the camera if none is open. With a camera already open the new
    /// surface is bound to it and nothing else changes.
    pub fn attach_surface(&mut self, surface: Box<dyn PreviewSurface>) {
        self.surface = Some(surface);

        if matches!(self.phase, Phase::Uninitialized | Phase::Stopped) {
            self.open_camera();
            return;
        }

        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        match &self.phase {
            Phase::Initializing { camera } => surface.set_source(camera.as_ref()),
            Phase::Scanning(session) => {
                surface.set_source(session.camera.as_ref());
                surface.set_rotation(session.camera.orientation());
            }
            Phase::Uninitialized | Phase::Stopped => {}
        }
    }

    /// Start or restart scanning.
    ///
    /// A no-op unless the camera has been initialized and scanning is not
    /// already running. Restarting from Stopped reopens the camera; scanning
    /// resumes once it reports ready.
    pub fn start_scanning(&mut self) {
        match self.phase {
            Phase::Stopped => {
                tracing::info!("Restarting scanner");
                self.open_camera();
            }
            Phase::Scanning(_) => tracing::debug!("start_scanning ignored: already scanning"),
            Phase::Uninitialized | Phase::Initializing { .. } => {
                tracing::debug!("start_scanning ignored: camera not initialized ({})", self.state())
            }
        }
    }

    /// Stop scanning and release the decoder, luminance buffer and camera.
    ///
    /// A no-op unless scanning. Attempts already queued are discarded when
    /// they come up.
    pub fn stop_scanning(&mut self) {
        if !self.is_scanning() {
            tracing::debug!("stop_scanning ignored: not scanning ({})", self.state());
            return;
        }

        self.transition(Phase::Stopped);
        tracing::info!("Scanning stopped, camera released");
    }

    /// Process at most `max_turns` queued work items without waiting.
    ///
    /// Returns the number of items processed.
    pub fn pump(&mut self, max_turns: usize) -> usize {
        let mut turns = 0;
        while turns < max_turns {
            let Some(work) = self.dispatcher.try_next() else {
                break;
            };
            self.dispatch(work);
            turns += 1;
        }
        turns
    }

    /// Wait for the next work item, process it, then yield to the runtime.
    pub async fn run_turn(&mut self) {
        if let Some(work) = self.dispatcher.next().await {
            self.dispatch(work);
        }
        tokio::task::yield_now().await;
    }

    fn dispatch(&mut self, work: Work) {
        match work {
            Work::CameraOpened(result) => self.on_camera_opened(result),
            Work::Scan { epoch } => self.scan(epoch),
            Work::Start => self.start_scanning(),
            Work::Stop => self.stop_scanning(),
        }
    }

    /// Replace the phase and publish the new state if it changed
    fn transition(&mut self, phase: Phase) {
        self.phase = phase;

        let state = self.phase.state();
        if state != self.published {
            tracing::debug!("Scanner state {} -> {}", self.published, state);
            self.published = state;
            self.notifier.state_changed(state);
        }
    }

    fn open_camera(&mut self) {
        let kind = self.config.camera;
        let mut camera = match self.cameras.create(kind) {
            Ok(camera) => camera,
            Err(e) => {
                self.fail_camera_init(e);
                return;
            }
        };

        self.metrics.record_camera_open();
        if let Some(surface) = self.surface.as_mut() {
            surface.set_source(camera.as_ref());
        }

        tracing::info!("Opening {:?} camera", kind);
        camera.open(self.dispatcher.handle().camera_completion());
        self.transition(Phase::Initializing { camera });
    }

    fn fail_camera_init(&mut self, error: CameraError) {
        tracing::error!("Camera initialization failed: {}", error);
        self.transition(Phase::Uninitialized);
        self.notifier.error(ScanError::CameraInit(error));
    }

    fn on_camera_opened(&mut self, result: Result<(), CameraError>) {
        let camera = match std::mem::replace(&mut self.phase, Phase::Uninitialized) {
            Phase::Initializing { camera } => camera,
            other => {
                tracing::debug!("Ignoring camera completion in state {}", other.state());
                self.phase = other;
                return;
            }
        };

        if let Err(e) = result {
            drop(camera);
            self.fail_camera_init(e);
            return;
        }

        if let Some(surface) = self.surface.as_mut() {
            surface.set_rotation(camera.orientation());
        }

        let resolution = camera.preview_resolution();
        let luminance = match LuminanceBuffer::new(resolution) {
            Ok(buffer) => buffer,
            Err(e) => {
                drop(camera);
                self.fail_camera_init(e);
                return;
            }
        };

        self.epoch += 1;
        let epoch = self.epoch;
        let decoder = self.decoders.create();
        tracing::info!("Camera ready at {}, scanning (session {})", resolution, epoch);

        self.transition(Phase::Scanning(ScanSession {
            camera,
            luminance,
            decoder,
            epoch,
        }));
        self.scan(epoch);
    }

    /// One scan attempt for session `epoch`
    fn scan(&mut self, epoch: u64) {
        let Phase::Scanning(session) = &mut self.phase else {
            tracing::trace!("Dropping scan attempt for session {}: not scanning", epoch);
            return;
        };
        if session.epoch != epoch {
            tracing::trace!(
                "Dropping stale scan attempt for session {} (current {})",
                epoch,
                session.epoch
            );
            return;
        }

        self.metrics.record_attempt();
        match session.attempt(self.config.autofocus, &self.metrics) {
            Ok(text) if !text.is_empty() => {
                self.metrics.record_decoded();
                tracing::info!("QR code decoded ({} chars)", text.chars().count());
                self.stop_scanning();
                self.notifier.scan_complete(text);
            }
            Ok(_) => {
                tracing::trace!("Decoder returned empty text, treating as not found");
                self.retry(epoch);
            }
            Err(AttemptFailure::Decode(e)) if e.is_retryable() => {
                tracing::trace!("Session {}: {}", epoch, e);
                self.retry(epoch);
            }
            Err(AttemptFailure::Decode(e)) => {
                self.on_fault(epoch, ScanError::Decode(e.to_string()));
            }
            Err(AttemptFailure::Frame(e)) => {
                self.on_fault(epoch, ScanError::Runtime(e.to_string()));
            }
        }
    }

    /// Queue the next attempt for a later turn
    fn retry(&mut self, epoch: u64) {
        self.metrics.record_not_found();
        self.dispatcher.post(Work::Scan { epoch });
    }

    fn on_fault(&mut self, epoch: u64, error: ScanError) {
        self.metrics.record_fault();

        match self.config.decode_fault {
            FaultPolicy::Stop => {
                tracing::warn!("Scan attempt faulted, stopping: {}", error);
                self.stop_scanning();
            }
            FaultPolicy::Retry => {
                tracing::warn!("Scan attempt faulted, retrying: {}", error);
                self.dispatcher.post(Work::Scan { epoch });
            }
        }

        self.notifier.error(error);
    }
}

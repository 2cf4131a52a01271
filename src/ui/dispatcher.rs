// Dispatcher - The host event loop's work queue for a scanner control
//
// Every asynchronous input to the controller arrives as a Work item on one queue:
// 1. Camera open completions from the camera driver
// 2. Rescheduled scan attempts posted by the scan loop itself
// 3. Start/stop commands from other tasks
//
// The controller drains one item per turn, so a retry never runs synchronously
// inside the attempt that scheduled it.

use crate::services::camera::CameraError;
use tokio::sync::mpsc;

/// A unit of work for the controller's next turn
#[derive(Debug, Clone, PartialEq)]
pub enum Work {
    /// The camera finished opening
    CameraOpened(Result<(), CameraError>),

    /// Run one scan attempt for the session with this epoch
    Scan { epoch: u64 },

    /// Host command: start scanning
    Start,

    /// Host command: stop scanning
    Stop,
}

/// Work queue owned by a [`ScanLoopController`](crate::ui::ScanLoopController).
///
/// Unbounded: the scan loop keeps at most one `Scan` item in flight per
/// session, and dropping one would stall the loop.
pub struct Dispatcher {
    work_tx: mpsc::UnboundedSender<Work>,
    work_rx: mpsc::UnboundedReceiver<Work>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (work_tx, work_rx) = mpsc::unbounded_channel();
        Self { work_tx, work_rx }
    }

    /// Queue work for a later turn
    pub fn post(&self, work: Work) {
        // The receiver lives in `self`, so the channel cannot be closed here
        let _ = self.work_tx.send(work);
    }

    /// Next queued item without waiting
    pub fn try_next(&mut self) -> Option<Work> {
        self.work_rx.try_recv().ok()
    }

    /// Wait for the next queued item
    pub async fn next(&mut self) -> Option<Work> {
        self.work_rx.recv().await
    }

    pub fn is_idle(&self) -> bool {
        self.work_rx.is_empty()
    }

    /// Cloneable handle for posting work from callbacks and other tasks
    pub fn handle(&self) -> DispatcherHandle {
        DispatcherHandle {
            work_tx: self.work_tx.clone(),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Lightweight handle that can be cloned and moved into callbacks
///
/// Posting after the controller has been dropped is logged and ignored.
#[derive(Clone, Debug)]
pub struct DispatcherHandle {
    work_tx: mpsc::UnboundedSender<Work>,
}

impl DispatcherHandle {
    /// Queue work; returns false if the controller is gone
    pub fn post(&self, work: Work) -> bool {
        match self.work_tx.send(work) {
            Ok(()) => true,
            Err(mpsc::error::SendError(work)) => {
                tracing::warn!("Dropping {:?} - scanner control has been dropped", work);
                false
            }
        }
    }

    pub fn start_scanning(&self) -> bool {
        self.post(Work::Start)
    }

    pub fn stop_scanning(&self) -> bool {
        self.post(Work::Stop)
    }

    /// One-shot completion for a camera open request
    pub fn camera_completion(&self) -> CameraCompletion {
        CameraCompletion {
            handle: self.clone(),
        }
    }
}

/// Reports the outcome of [`CameraSource::open`](crate::services::CameraSource::open).
///
/// Consumed on use, so a camera can only complete once. It is `Send`, so
/// drivers may complete from their own threads.
#[derive(Debug)]
pub struct CameraCompletion {
    handle: DispatcherHandle,
}

impl CameraCompletion {
    pub fn complete(self, result: Result<(), CameraError>) {
        self.handle.post(Work::CameraOpened(result));
    }

    pub fn succeeded(self) {
        self.complete(Ok(()));
    }

    pub fn failed(self, error: CameraError) {
        self.complete(Err(error));
    }
}

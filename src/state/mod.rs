// Scanner notification module
//
// This module defines the events a scanner control publishes to its host and
// the ScannerNotifier that broadcasts them over a tokio channel.

use crate::metrics::ScanMetrics;
use crate::models::ScannerState;
use crate::services::camera::CameraError;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Faults surfaced to the host through [`ScannerEvent::Error`].
///
/// "No code in this frame" never appears here; the scan loop absorbs it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Camera initialization failed: {0}")]
    CameraInit(#[source] CameraError),

    #[error("Decode fault: {0}")]
    Decode(String),

    #[error("Unexpected runtime fault: {0}")]
    Runtime(String),
}

/// Notifications published by a scanner control
///
/// Subscribers receive them in emission order. A `ScanComplete` is always
/// preceded by the `StateChanged { state: Stopped }` of the same scan.
#[derive(Clone, Debug, PartialEq)]
pub enum ScannerEvent {
    /// The control moved to a new lifecycle state
    StateChanged { state: ScannerState },

    /// A QR code was decoded; scanning has stopped
    ScanComplete { text: String },

    /// Camera initialization failed or a decode attempt faulted
    Error { error: ScanError },
}

/// Broadcasts [`ScannerEvent`]s to any number of subscribers.
///
/// Emitting with no subscribers is not an error; the event is dropped and
/// counted in [`ScanMetrics::notifications_unobserved`].
#[derive(Debug)]
pub struct ScannerNotifier {
    event_tx: broadcast::Sender<ScannerEvent>,
    metrics: Arc<ScanMetrics>,
}

impl ScannerNotifier {
    pub fn new(capacity: usize, metrics: Arc<ScanMetrics>) -> Self {
        // broadcast::channel panics on zero capacity
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        Self { event_tx, metrics }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScannerEvent> {
        self.event_tx.subscribe()
    }

    pub fn emit(&self, event: ScannerEvent) {
        let observed = self.event_tx.send(event).is_ok();
        if !observed {
            tracing::trace!("Scanner event emitted with no subscribers");
        }
        self.metrics.record_notification(observed);
    }

    pub fn state_changed(&self, state: ScannerState) {
        self.emit(ScannerEvent::StateChanged { state });
    }

    pub fn scan_complete(&self, text: String) {
        self.emit(ScannerEvent::ScanComplete { text });
    }

    pub fn error(&self, error: ScanError) {
        self.emit(ScannerEvent::Error { error });
    }
}

// Host loop - drives a ScanLoopController until it produces a result
//
// Used by the qrscan binary. The controller itself retries forever; the
// optional attempt limit here is host policy.

use crate::services::surface::PreviewSurface;
use crate::state::ScannerEvent;
use crate::ui::controller::ScanLoopController;
use anyhow::{Context, Result, bail};
use tokio::sync::broadcast::error::TryRecvError;

/// Attach `surface` and run turns until a code decodes or a fault is reported.
///
/// With `max_attempts`, at most that many decode attempts run. The limit is
/// checked before every turn, and scanning is stopped in place so no queued
/// retry runs past it.
///
/// # Errors
/// The reported [`ScanError`](crate::ScanError), an exhausted attempt limit, or
/// the controller going idle without scanning.
pub async fn scan_to_completion(
    controller: &mut ScanLoopController,
    surface: Box<dyn PreviewSurface>,
    max_attempts: Option<u64>,
) -> Result<String> {
    let mut events = controller.subscribe();
    let metrics = controller.metrics();

    controller.attach_surface(surface);

    loop {
        loop {
            match events.try_recv() {
                Ok(ScannerEvent::StateChanged { state }) => {
                    tracing::info!("Scanner {}", state);
                }
                Ok(ScannerEvent::ScanComplete { text }) => return Ok(text),
                Ok(ScannerEvent::Error { error }) => {
                    return Err(error).context("Scanning failed");
                }
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!("Missed {} scanner events", missed);
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        let attempts = metrics.attempts();
        if max_attempts.is_some_and(|limit| attempts >= limit) {
            tracing::warn!("Attempt limit reached, stopping");
            controller.stop_scanning();
            bail!("No QR code found after {} attempts", attempts);
        }

        if controller.is_idle() && !controller.is_scanning() {
            bail!("Scanner went idle in state {}", controller.state());
        }

        controller.run_turn().await;
    }
}

// Scan metrics module
//
// Lightweight counters for how the scan loop is behaving

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Per-control scan metrics
///
/// Uses atomic operations so a host can read the counters from another task
/// while the controller keeps updating them. Counters are cumulative across
/// scan sessions of the same control.
#[derive(Debug)]
pub struct ScanMetrics {
    /// Scan attempts performed (one per frame)
    pub scan_attempts: AtomicU64,

    /// Attempts where no readable code was in the frame
    pub frames_not_found: AtomicU64,

    /// Successful decodes
    pub codes_decoded: AtomicU64,

    /// Faults surfaced through the error notification
    pub faults: AtomicU64,

    /// Autofocus requests issued before attempts
    pub focus_requests: AtomicU64,

    /// Camera handles created
    pub camera_opens: AtomicU64,

    /// Notifications delivered to at least one subscriber
    pub notifications_sent: AtomicU64,

    /// Notifications emitted while nobody was subscribed
    pub notifications_unobserved: AtomicU64,

    /// Metrics creation time
    start_time: Instant,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self {
            scan_attempts: AtomicU64::new(0),
            frames_not_found: AtomicU64::new(0),
            codes_decoded: AtomicU64::new(0),
            faults: AtomicU64::new(0),
            focus_requests: AtomicU64::new(0),
            camera_opens: AtomicU64::new(0),
            notifications_sent: AtomicU64::new(0),
            notifications_unobserved: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_attempt(&self) {
        self.scan_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_found(&self) {
        self.frames_not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decoded(&self) {
        self.codes_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fault(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_focus_request(&self) {
        self.focus_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_camera_open(&self) {
        self.camera_opens.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification(&self, observed: bool) {
        if observed {
            self.notifications_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.notifications_unobserved.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn attempts(&self) -> u64 {
        self.scan_attempts.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Fraction of attempts that decoded a code, 0.0 when nothing was attempted
    pub fn hit_rate(&self) -> f64 {
        let attempts = self.scan_attempts.load(Ordering::Relaxed);
        if attempts > 0 {
            self.codes_decoded.load(Ordering::Relaxed) as f64 / attempts as f64
        } else {
            0.0
        }
    }

    /// Attempts per second since creation
    pub fn attempts_per_sec(&self) -> f64 {
        let secs = self.uptime().as_secs_f64();
        if secs > 0.0 {
            self.scan_attempts.load(Ordering::Relaxed) as f64 / secs
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Scan Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Attempts: {} ({:.1}/s), not found: {}, decoded: {}, faults: {}",
            self.scan_attempts.load(Ordering::Relaxed),
            self.attempts_per_sec(),
            self.frames_not_found.load(Ordering::Relaxed),
            self.codes_decoded.load(Ordering::Relaxed),
            self.faults.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Camera opens: {}, focus requests: {}",
            self.camera_opens.load(Ordering::Relaxed),
            self.focus_requests.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Notifications: {} sent, {} unobserved",
            self.notifications_sent.load(Ordering::Relaxed),
            self.notifications_unobserved.load(Ordering::Relaxed)
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = ScanMetrics::new();
        assert_eq!(metrics.attempts(), 0);
        assert_eq!(metrics.codes_decoded.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_outcomes() {
        let metrics = ScanMetrics::new();

        for _ in 0..4 {
            metrics.record_attempt();
        }
        metrics.record_not_found();
        metrics.record_not_found();
        metrics.record_fault();
        metrics.record_decoded();

        assert_eq!(metrics.attempts(), 4);
        assert_eq!(metrics.frames_not_found.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.faults.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.hit_rate(), 0.25);
    }

    #[test]
    fn test_hit_rate_no_attempts() {
        let metrics = ScanMetrics::new();
        assert_eq!(metrics.hit_rate(), 0.0);
    }

    #[test]
    fn test_notification_counters() {
        let metrics = ScanMetrics::new();

        metrics.record_notification(true);
        metrics.record_notification(false);
        metrics.record_notification(false);
        metrics.record_camera_open();
        metrics.record_focus_request();

        assert_eq!(metrics.notifications_sent.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.notifications_unobserved.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.camera_opens.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.focus_requests.load(Ordering::Relaxed), 1);
    }
}

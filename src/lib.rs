// qrscan - Camera preview control that scans every frame for a QR code
//
// This is the library crate containing the scanner state machine, its service
// seams (camera, decoder, preview surface) and bundled implementations.
// The binary crate (main.rs) runs the control headless over image files.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::ScanMetrics;
pub use models::{
    CameraKind, FaultPolicy, LuminanceBuffer, Resolution, ScannerConfig, ScannerState,
};
pub use state::{ScanError, ScannerEvent, ScannerNotifier};
pub use ui::{DispatcherHandle, ScanLoopController};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

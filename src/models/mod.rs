//! Data models for the scanner control.
//!
//! This module contains the plain data the controller works with:
//! - [`ScannerState`]: The public lifecycle state of a control
//! - [`Resolution`]: Preview resolution reported by a camera
//! - [`LuminanceBuffer`]: Grayscale frame storage sized to the preview resolution
//! - [`ScannerConfig`]: User settings loaded from `qrscan.yaml`
//!
//! # Architecture Note
//!
//! The models carry no behavior beyond validation. State transitions are owned by
//! [`ScanLoopController`](crate::ui::ScanLoopController) and configuration I/O by
//! [`ConfigManager`](crate::config::ConfigManager).

pub mod config;
pub mod scanner;

pub use config::{CameraKind, FaultPolicy, ScannerConfig};
pub use scanner::{LuminanceBuffer, Resolution, ScannerState};

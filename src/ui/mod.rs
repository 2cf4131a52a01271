// UI module - The scanner control and its event loop plumbing
//
// This module contains:
// - Dispatcher: The work queue that paces the scan loop and receives async completions
// - ScanLoopController: The control's state machine
// - scan_to_completion: The host loop the qrscan binary runs

pub mod controller;
pub mod dispatcher;
pub mod runner;

pub use controller::ScanLoopController;
pub use dispatcher::{CameraCompletion, Dispatcher, DispatcherHandle, Work};
pub use runner::scan_to_completion;

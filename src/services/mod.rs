//! Services module - The external collaborators of the scanner control.
//!
//! The controller consumes three black-box services and implements none of their
//! internals. Each is a trait so platform integrations and tests can supply their own:
//!
//! - [`CameraSource`] / [`CameraProvider`]: opening a camera, reading preview frames,
//!   autofocus and orientation
//! - [`QrDecoder`] / [`DecoderFactory`]: turning a luminance frame into decoded text
//! - [`PreviewSurface`]: the video sink the camera preview renders into
//!
//! # Bundled implementations
//!
//! - [`RqrrDecoder`]: binarization, finder-pattern detection and error-corrected
//!   decoding provided by the `rqrr` crate
//! - [`StillImageCamera`]: replays image files as preview frames (headless runs, tests)
//! - [`TracingSurface`]: a surface that only logs
//!
//! # Usage Example
//!
//! ```ignore
//! use qrscan::services::{RqrrDecoderFactory, StillImageCameraProvider, TracingSurface};
//! use qrscan::{ScanLoopController, ScannerConfig};
//!
//! let mut controller = ScanLoopController::new(
//!     ScannerConfig::default(),
//!     StillImageCameraProvider::new("frames"),
//!     RqrrDecoderFactory,
//! );
//! controller.attach_surface(Box::new(TracingSurface::default()));
//! ```

pub mod camera;
pub mod decoding;
pub mod still_camera;
pub mod surface;

pub use camera::{CameraError, CameraProvider, CameraSource};
pub use decoding::{
    BarcodeFormat, DecodeError, DecodeHints, DecodeRequest, DecoderFactory, QR_ONLY_HINTS,
    QrDecoder, RqrrDecoder, RqrrDecoderFactory,
};
pub use still_camera::{StillImageCamera, StillImageCameraProvider};
pub use surface::{PreviewSurface, TracingSurface};

//! Camera collaborator traits.
//!
//! The controller never talks to camera drivers directly. A platform integration
//! implements [`CameraSource`] for a single opened camera and [`CameraProvider`]
//! to construct one on demand. Dropping the boxed source releases the camera.

use crate::models::{CameraKind, LuminanceBuffer, Resolution};
use crate::ui::dispatcher::CameraCompletion;
use thiserror::Error;

/// Errors reported by camera sources
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("No camera hardware available")]
    NoCameraHardware,

    #[error("Camera unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid preview resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Failed to read preview frame: {0}")]
    Frame(String),

    #[error("Autofocus not supported")]
    FocusUnsupported,

    #[error("Autofocus failed: {0}")]
    Focus(String),
}

/// A single camera handle.
///
/// `open` is asynchronous: the implementation must eventually call
/// [`CameraCompletion::complete`] exactly once, typically from a driver callback.
/// Frames and focus are only requested after a successful open.
#[cfg_attr(test, mockall::automock)]
pub trait CameraSource {
    /// Begin opening the camera; report the outcome through `completion`
    fn open(&mut self, completion: CameraCompletion);

    /// Preview resolution, fixed for the lifetime of the handle
    fn preview_resolution(&self) -> Resolution;

    /// Sensor orientation in degrees, applied as the surface rotation
    fn orientation(&self) -> f64;

    fn is_focus_supported(&self) -> bool;

    /// Fire-and-forget autofocus request
    fn focus(&mut self) -> Result<(), CameraError>;

    /// Copy the latest preview frame's luma plane into `buffer`
    fn fill_luminance(&mut self, buffer: &mut LuminanceBuffer) -> Result<(), CameraError>;
}

/// Creates camera handles for the controller.
pub trait CameraProvider {
    fn create(&mut self, kind: CameraKind) -> Result<Box<dyn CameraSource>, CameraError>;
}

impl<F> CameraProvider for F
where
    F: FnMut(CameraKind) -> Result<Box<dyn CameraSource>, CameraError>,
{
    fn create(&mut self, kind: CameraKind) -> Result<Box<dyn CameraSource>, CameraError> {
        self(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_provider() {
        let mut provider = |kind: CameraKind| -> Result<Box<dyn CameraSource>, CameraError> {
            assert_eq!(kind, CameraKind::FrontFacing);
            Err(CameraError::NoCameraHardware)
        };

        let err = provider.create(CameraKind::FrontFacing).err();
        assert_eq!(err, Some(CameraError::NoCameraHardware));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CameraError::InvalidResolution {
                width: 0,
                height: 480
            }
            .to_string(),
            "Invalid preview resolution 0x480"
        );
        assert_eq!(
            CameraError::NoCameraHardware.to_string(),
            "No camera hardware available"
        );
    }
}

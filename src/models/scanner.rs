use crate::services::camera::CameraError;
use std::fmt;

/// Lifecycle state of a scanner control.
///
/// Exactly one value exists per control and only the controller mutates it.
/// Hosts observe it through [`ScanLoopController::state`](crate::ui::ScanLoopController::state)
/// or the [`ScannerEvent::StateChanged`](crate::state::ScannerEvent::StateChanged) notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScannerState {
    /// No camera has been opened, or opening it failed
    #[default]
    Uninitialized,

    /// A camera handle exists and is waiting for its open completion
    Initializing,

    /// Camera, luminance buffer and decoder are live; the scan loop is running
    Scanning,

    /// Scanning ended (decoded, stopped by the host, or terminated by a fault)
    Stopped,
}

impl ScannerState {
    pub fn is_scanning(self) -> bool {
        matches!(self, ScannerState::Scanning)
    }
}

impl fmt::Display for ScannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScannerState::Uninitialized => "uninitialized",
            ScannerState::Initializing => "initializing",
            ScannerState::Scanning => "scanning",
            ScannerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Camera preview resolution in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of luma samples in one frame
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Grayscale sample buffer for one preview frame.
///
/// Allocated once per scan session with the camera's preview resolution and
/// refilled in place on every attempt. Resolution changes mid-session are not
/// supported; a new session allocates a new buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct LuminanceBuffer {
    resolution: Resolution,
    samples: Vec<u8>,
}

impl LuminanceBuffer {
    /// Allocate a zeroed buffer for `resolution`.
    ///
    /// # Errors
    /// Returns [`CameraError::InvalidResolution`] if either dimension is zero.
    pub fn new(resolution: Resolution) -> Result<Self, CameraError> {
        if resolution.is_empty() {
            return Err(CameraError::InvalidResolution {
                width: resolution.width,
                height: resolution.height,
            });
        }

        Ok(Self {
            resolution,
            samples: vec![0; resolution.pixel_count()],
        })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn width(&self) -> usize {
        self.resolution.width as usize
    }

    pub fn height(&self) -> usize {
        self.resolution.height as usize
    }

    /// Row-major luma samples, `width * height` bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.samples
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    /// Sample at column `x`, row `y`
    pub fn sample(&self, x: usize, y: usize) -> u8 {
        self.samples[y * self.width() + x]
    }
}

// Frame contents are noise in logs
impl fmt::Debug for LuminanceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuminanceBuffer")
            .field("resolution", &self.resolution)
            .field("len", &self.samples.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_uninitialized() {
        assert_eq!(ScannerState::default(), ScannerState::Uninitialized);
        assert!(!ScannerState::default().is_scanning());
        assert!(ScannerState::Scanning.is_scanning());
    }

    #[test]
    fn test_buffer_sized_to_resolution() {
        let buffer = LuminanceBuffer::new(Resolution::new(640, 480)).unwrap();
        assert_eq!(buffer.as_slice().len(), 640 * 480);
        assert_eq!(buffer.width(), 640);
        assert_eq!(buffer.height(), 480);
    }

    #[test]
    fn test_buffer_rejects_empty_resolution() {
        let err = LuminanceBuffer::new(Resolution::new(0, 480)).unwrap_err();
        assert_eq!(
            err,
            CameraError::InvalidResolution {
                width: 0,
                height: 480
            }
        );
        assert!(LuminanceBuffer::new(Resolution::new(640, 0)).is_err());
    }

    #[test]
    fn test_sample_is_row_major() {
        let mut buffer = LuminanceBuffer::new(Resolution::new(4, 3)).unwrap();
        buffer.as_mut_slice()[2 * 4 + 1] = 200;
        assert_eq!(buffer.sample(1, 2), 200);
        assert_eq!(buffer.sample(2, 1), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Resolution::new(640, 480).to_string(), "640x480");
        assert_eq!(ScannerState::Stopped.to_string(), "stopped");
    }
}

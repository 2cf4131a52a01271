//! Camera source that replays still images as preview frames.
//!
//! Stands in for a physical camera in the headless `qrscan` binary and in tests.
//! Frames are converted to 8-bit luma once at load time; every frame is scaled
//! to the resolution of the first one so the preview resolution stays fixed.

use crate::models::{CameraKind, LuminanceBuffer, Resolution};
use crate::services::camera::{CameraError, CameraProvider, CameraSource};
use crate::ui::dispatcher::CameraCompletion;
use camino::{Utf8Path, Utf8PathBuf};
use image::GrayImage;
use image::imageops::{self, FilterType};
use std::fs;

/// File extensions picked up by [`StillImageCamera::from_dir`]
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

pub struct StillImageCamera {
    frames: Vec<GrayImage>,
    resolution: Resolution,
    orientation: f64,
    next_frame: usize,
}

impl StillImageCamera {
    /// Build a camera from already decoded frames.
    ///
    /// # Errors
    /// [`CameraError::NoCameraHardware`] if `frames` is empty, and
    /// [`CameraError::InvalidResolution`] if the first frame has no pixels.
    pub fn from_frames(frames: Vec<GrayImage>) -> Result<Self, CameraError> {
        let Some(first) = frames.first() else {
            return Err(CameraError::NoCameraHardware);
        };

        let resolution = Resolution::new(first.width(), first.height());
        if resolution.is_empty() {
            return Err(CameraError::InvalidResolution {
                width: resolution.width,
                height: resolution.height,
            });
        }

        let frames = frames
            .into_iter()
            .map(|frame| {
                if frame.dimensions() == (resolution.width, resolution.height) {
                    frame
                } else {
                    imageops::resize(
                        &frame,
                        resolution.width,
                        resolution.height,
                        FilterType::Triangle,
                    )
                }
            })
            .collect();

        Ok(Self {
            frames,
            resolution,
            orientation: 0.0,
            next_frame: 0,
        })
    }

    /// Load every image in `dir` (sorted by file name) as one frame.
    pub fn from_dir(dir: &Utf8Path) -> Result<Self, CameraError> {
        let entries = fs::read_dir(dir)
            .map_err(|e| CameraError::Unavailable(format!("{}: {}", dir, e)))?;

        let mut paths: Vec<Utf8PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| Utf8PathBuf::try_from(entry.path()).ok())
            .filter(|path| {
                path.extension()
                    .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            let frame = image::open(path)
                .map_err(|e| CameraError::Unavailable(format!("{}: {}", path, e)))?
                .to_luma8();
            tracing::debug!("Loaded frame {} ({}x{})", path, frame.width(), frame.height());
            frames.push(frame);
        }

        tracing::info!("Loaded {} still frame(s) from {}", frames.len(), dir);
        Self::from_frames(frames)
    }

    pub fn with_orientation(mut self, degrees: f64) -> Self {
        self.orientation = degrees;
        self
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl CameraSource for StillImageCamera {
    fn open(&mut self, completion: CameraCompletion) {
        // No driver to wait on; the completion is still delivered on a later turn
        completion.complete(Ok(()));
    }

    fn preview_resolution(&self) -> Resolution {
        self.resolution
    }

    fn orientation(&self) -> f64 {
        self.orientation
    }

    fn is_focus_supported(&self) -> bool {
        false
    }

    fn focus(&mut self) -> Result<(), CameraError> {
        Err(CameraError::FocusUnsupported)
    }

    fn fill_luminance(&mut self, buffer: &mut LuminanceBuffer) -> Result<(), CameraError> {
        if buffer.resolution() != self.resolution {
            return Err(CameraError::Frame(format!(
                "buffer is {}, preview is {}",
                buffer.resolution(),
                self.resolution
            )));
        }

        let frame = &self.frames[self.next_frame];
        buffer.as_mut_slice().copy_from_slice(frame.as_raw());
        self.next_frame = (self.next_frame + 1) % self.frames.len();
        Ok(())
    }
}

/// [`CameraProvider`] that opens a [`StillImageCamera`] over a frame directory.
#[derive(Debug, Clone)]
pub struct StillImageCameraProvider {
    frame_dir: Utf8PathBuf,
}

impl StillImageCameraProvider {
    pub fn new(frame_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            frame_dir: frame_dir.into(),
        }
    }
}

impl CameraProvider for StillImageCameraProvider {
    fn create(&mut self, kind: CameraKind) -> Result<Box<dyn CameraSource>, CameraError> {
        if kind != CameraKind::Primary {
            tracing::debug!("Still image camera ignores camera kind {:?}", kind);
        }
        Ok(Box::new(StillImageCamera::from_dir(&self.frame_dir)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use tempfile::TempDir;

    fn solid(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    #[test]
    fn test_empty_frame_list_has_no_hardware() {
        let err = StillImageCamera::from_frames(Vec::new()).err();
        assert_eq!(err, Some(CameraError::NoCameraHardware));
    }

    #[test]
    fn test_frames_cycle() {
        let mut camera =
            StillImageCamera::from_frames(vec![solid(4, 4, 10), solid(4, 4, 20)]).unwrap();
        let mut buffer = LuminanceBuffer::new(camera.preview_resolution()).unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            camera.fill_luminance(&mut buffer).unwrap();
            seen.push(buffer.sample(0, 0));
        }

        assert_eq!(seen, vec![10, 20, 10]);
    }

    #[test]
    fn test_frames_scaled_to_first_resolution() {
        let camera =
            StillImageCamera::from_frames(vec![solid(8, 6, 0), solid(16, 12, 0)]).unwrap();
        assert_eq!(camera.preview_resolution(), Resolution::new(8, 6));
        assert_eq!(camera.frame_count(), 2);
    }

    #[test]
    fn test_mismatched_buffer_is_frame_error() {
        let mut camera = StillImageCamera::from_frames(vec![solid(8, 6, 0)]).unwrap();
        let mut buffer = LuminanceBuffer::new(Resolution::new(4, 4)).unwrap();

        let err = camera.fill_luminance(&mut buffer).unwrap_err();
        assert!(matches!(err, CameraError::Frame(_)));
    }

    #[test]
    fn test_from_dir_loads_images_only() {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

        solid(10, 10, 50).save(dir.join("a.png")).unwrap();
        solid(10, 10, 90).save(dir.join("b.png")).unwrap();
        fs::write(dir.join("notes.txt"), "not a frame").unwrap();

        let mut camera = StillImageCamera::from_dir(&dir).unwrap();
        assert_eq!(camera.frame_count(), 2);

        let mut buffer = LuminanceBuffer::new(camera.preview_resolution()).unwrap();
        camera.fill_luminance(&mut buffer).unwrap();
        assert_eq!(buffer.sample(5, 5), 50);
    }

    #[test]
    fn test_missing_dir_is_unavailable() {
        let mut provider = StillImageCameraProvider::new("/definitely/not/here");
        let err = provider.create(CameraKind::Primary).err();
        assert!(matches!(err, Some(CameraError::Unavailable(_))));
    }

    #[test]
    fn test_focus_unsupported() {
        let mut camera = StillImageCamera::from_frames(vec![solid(2, 2, 0)])
            .unwrap()
            .with_orientation(90.0);
        assert!(!camera.is_focus_supported());
        assert_eq!(camera.focus(), Err(CameraError::FocusUnsupported));
        assert_eq!(camera.orientation(), 90.0);
    }
}

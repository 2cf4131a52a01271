use crate::services::camera::CameraSource;

/// Video output sink the camera preview is rendered into.
///
/// The controller only binds the camera as the surface's source and rotates the
/// surface to match the camera orientation; drawing is the platform's business.
pub trait PreviewSurface {
    fn set_source(&mut self, camera: &dyn CameraSource);

    fn set_rotation(&mut self, degrees: f64);
}

/// Surface that renders nothing and logs what it is asked to do.
///
/// Used by the headless `qrscan` binary.
#[derive(Debug, Default)]
pub struct TracingSurface {
    rotation: f64,
    bound: bool,
}

impl TracingSurface {
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }
}

impl PreviewSurface for TracingSurface {
    fn set_source(&mut self, camera: &dyn CameraSource) {
        self.bound = true;
        tracing::debug!(
            "Preview surface bound to camera (orientation {} deg)",
            camera.orientation()
        );
    }

    fn set_rotation(&mut self, degrees: f64) {
        self.rotation = degrees;
        tracing::debug!("Preview surface rotated to {} deg", degrees);
    }
}

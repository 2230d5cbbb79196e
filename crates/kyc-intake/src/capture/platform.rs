//! The system camera backend.
//!
//! On Linux this opens V4L2 devices through `kyc-intake-linux`. Elsewhere
//! every acquisition fails with [`AcquisitionErrorKind::Unsupported`] and
//! the file input is the only way to fill a photo slot.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use super::device::{CameraDevice, FacingMode};
use crate::config::CameraConfig;
use crate::error::{AcquisitionErrorKind, Error, Result};

/// A camera found on this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CameraInfo {
    /// Device node.
    pub path: PathBuf,
    /// Driver-reported name.
    pub name: String,
    /// Whether this is the camera an acquisition would pick.
    pub selected: bool,
}

/// The machine's camera.
#[derive(Debug, Clone, Default)]
pub struct SystemCamera {
    device: Option<PathBuf>,
}

impl SystemCamera {
    /// Use `device` if given, otherwise pick one by facing at acquisition time.
    #[must_use]
    pub fn new(device: Option<PathBuf>) -> Self {
        Self { device }
    }

    /// Build from the `[camera]` configuration section.
    #[must_use]
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.device.clone())
    }

    /// The explicitly configured device, if any.
    #[must_use]
    pub fn device(&self) -> Option<&Path> {
        self.device.as_deref()
    }
}

#[async_trait]
impl CameraDevice for SystemCamera {
    type Stream = SystemStream;

    async fn acquire(&self, facing: FacingMode) -> Result<SystemStream> {
        let explicit = self.device.clone();
        tokio::task::spawn_blocking(move || imp::open_stream(explicit, facing))
            .await
            .map_err(|e| {
                Error::acquisition(
                    AcquisitionErrorKind::Other,
                    format!("camera task failed: {e}"),
                )
            })?
    }
}

pub use imp::{list_cameras, platform_name, streaming_supported, SystemStream};

#[cfg(target_os = "linux")]
mod imp {
    use std::path::PathBuf;

    use image::RgbImage;
    use kyc_intake_linux::{list_devices, select_device, CameraError, Facing, V4l2Camera};
    use tokio::runtime::{Handle, RuntimeFlavor};
    use tracing::debug;

    use super::CameraInfo;
    use crate::capture::device::{FacingMode, LiveStream};
    use crate::error::{AcquisitionErrorKind, Error, Result};

    /// A live V4L2 stream.
    #[derive(Debug)]
    pub struct SystemStream {
        camera: V4l2Camera,
    }

    impl LiveStream for SystemStream {
        fn resolution(&self) -> (u32, u32) {
            self.camera.resolution()
        }

        fn grab_frame(&mut self) -> Result<RgbImage> {
            let camera = &mut self.camera;
            off_worker(|| camera.grab()).map_err(|e| Error::conversion(e.to_string()))
        }

        fn stop(&mut self) -> Result<()> {
            self.camera
                .stop()
                .map_err(|e| Error::acquisition(acquisition_kind(&e), e.to_string()))
        }
    }

    /// Run blocking device I/O so other tasks keep running.
    ///
    /// On a multi-thread runtime the current worker hands its tasks off
    /// first. Anywhere else `f` simply runs in place.
    pub(super) fn off_worker<T>(f: impl FnOnce() -> T) -> T {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(f)
            }
            _ => f(),
        }
    }

    /// Get platform name
    #[must_use]
    pub fn platform_name() -> &'static str {
        kyc_intake_linux::platform_name()
    }

    /// Check if this build can stream from cameras.
    #[must_use]
    pub fn streaming_supported() -> bool {
        kyc_intake_linux::streaming_supported()
    }

    /// List cameras, marking the one `facing` selects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the device list cannot be read.
    pub fn list_cameras(facing: FacingMode) -> Result<Vec<CameraInfo>> {
        let devices = list_devices()?;
        let selected = select_device(&devices, linux_facing(facing)).map(|d| d.index);

        Ok(devices
            .into_iter()
            .map(|d| CameraInfo {
                selected: Some(d.index) == selected,
                path: d.path,
                name: d.name,
            })
            .collect())
    }

    pub(super) fn open_stream(explicit: Option<PathBuf>, facing: FacingMode) -> Result<SystemStream> {
        let path = match explicit {
            Some(path) => path,
            None => {
                let devices = list_devices().map_err(|e| {
                    Error::acquisition(
                        AcquisitionErrorKind::Other,
                        format!("cannot list video devices: {e}"),
                    )
                })?;
                let device = select_device(&devices, linux_facing(facing)).ok_or_else(|| {
                    Error::acquisition(AcquisitionErrorKind::NotFound, "no video capture device")
                })?;
                debug!(device = %device.path.display(), name = %device.name, %facing, "Selected camera");
                device.path.clone()
            }
        };

        let camera = V4l2Camera::open(&path)
            .map_err(|e| Error::acquisition(acquisition_kind(&e), e.to_string()))?;
        Ok(SystemStream { camera })
    }

    fn linux_facing(facing: FacingMode) -> Facing {
        match facing {
            FacingMode::Environment => Facing::Environment,
            FacingMode::User => Facing::User,
        }
    }

    pub(super) fn acquisition_kind(err: &CameraError) -> AcquisitionErrorKind {
        match err {
            CameraError::PermissionDenied { .. } => AcquisitionErrorKind::PermissionDenied,
            CameraError::NotFound { .. } => AcquisitionErrorKind::NotFound,
            CameraError::Busy { .. } => AcquisitionErrorKind::Busy,
            CameraError::Unsupported { .. } => AcquisitionErrorKind::Unsupported,
            CameraError::Io { .. } | CameraError::Decode { .. } | CameraError::Stopped => {
                AcquisitionErrorKind::Other
            }
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod imp {
    use std::path::PathBuf;

    use image::RgbImage;

    use super::CameraInfo;
    use crate::capture::device::{FacingMode, LiveStream};
    use crate::error::{AcquisitionErrorKind, Error, Result};

    /// No live streams exist on this platform.
    #[derive(Debug)]
    pub enum SystemStream {}

    impl LiveStream for SystemStream {
        fn resolution(&self) -> (u32, u32) {
            match *self {}
        }

        fn grab_frame(&mut self) -> Result<RgbImage> {
            match *self {}
        }

        fn stop(&mut self) -> Result<()> {
            match *self {}
        }
    }

    /// Get platform name
    #[must_use]
    pub fn platform_name() -> &'static str {
        std::env::consts::OS
    }

    /// Camera streaming is never available here.
    #[must_use]
    pub fn streaming_supported() -> bool {
        false
    }

    /// No cameras are discoverable on this platform.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn list_cameras(_facing: FacingMode) -> Result<Vec<CameraInfo>> {
        Ok(Vec::new())
    }

    pub(super) fn open_stream(_explicit: Option<PathBuf>, _facing: FacingMode) -> Result<SystemStream> {
        Err(Error::acquisition(
            AcquisitionErrorKind::Unsupported,
            format!("camera capture is not available on {}", platform_name()),
        ))
    }
}

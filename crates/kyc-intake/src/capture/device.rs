//! Device-layer abstraction for capture widgets.
//!
//! Platform backends implement [`CameraDevice`] to hand out live streams;
//! widgets only ever hold a stream through a [`StreamGuard`], which stops it
//! exactly once no matter how the widget leaves the streaming state.

use std::fmt;

use async_trait::async_trait;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Which way the requested camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Rear camera, pointing away from the user. Preferred for documents.
    #[default]
    Environment,
    /// Front camera, pointing at the user.
    User,
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => write!(f, "environment"),
            Self::User => write!(f, "user"),
        }
    }
}

/// A live camera feed.
pub trait LiveStream: Send {
    /// Native resolution of the feed as `(width, height)`.
    fn resolution(&self) -> (u32, u32);

    /// Grab one still frame at the feed's native resolution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaptureConversion`] if no frame could be produced.
    fn grab_frame(&mut self) -> Result<RgbImage>;

    /// Stop the feed and give the hardware back.
    ///
    /// Implementations must accept being called on a stream that already
    /// stopped on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the device reported a failure while stopping.
    fn stop(&mut self) -> Result<()>;
}

/// A source of live camera streams.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// The stream type handed out by this device.
    type Stream: LiveStream;

    /// Request a live stream, preferring a camera facing `facing`.
    ///
    /// This is the only suspending step of a capture session: it may wait on
    /// hardware initialisation or on a permission prompt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceAcquisition`] if no stream can be granted.
    async fn acquire(&self, facing: FacingMode) -> Result<Self::Stream>;
}

/// Scoped owner of a live stream.
///
/// The stream is stopped by [`StreamGuard::release`] or, failing that, when
/// the guard is dropped. Release is idempotent and never fails: stop errors
/// are logged and swallowed.
pub struct StreamGuard<S: LiveStream> {
    stream: Option<S>,
}

impl<S: LiveStream> StreamGuard<S> {
    /// Take ownership of a freshly acquired stream.
    #[must_use]
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    /// Check if the guard still holds a live stream.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.stream.is_some()
    }

    /// Native resolution of the held stream.
    #[must_use]
    pub fn resolution(&self) -> Option<(u32, u32)> {
        self.stream.as_ref().map(S::resolution)
    }

    /// Grab a still frame and check it matches the feed's native resolution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaptureConversion`] if the stream was released, the
    /// grab failed, or the frame came back at a different size.
    pub fn grab_still(&mut self) -> Result<RgbImage> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::conversion("stream already released"))?;

        let expected = stream.resolution();
        let frame = stream.grab_frame()?;

        if frame.dimensions() != expected {
            return Err(Error::conversion(format!(
                "frame is {}x{} but the feed is {}x{}",
                frame.width(),
                frame.height(),
                expected.0,
                expected.1
            )));
        }

        Ok(frame)
    }

    /// Stop the stream if it is still held.
    pub fn release(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };

        match stream.stop() {
            Ok(()) => debug!("Camera stream released"),
            Err(e) => warn!(error = %e, "Camera stream did not stop cleanly"),
        }
    }
}

impl<S: LiveStream> Drop for StreamGuard<S> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<S: LiveStream> fmt::Debug for StreamGuard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamGuard")
            .field("live", &self.is_live())
            .field("resolution", &self.resolution())
            .finish()
    }
}

//! V4L2 streaming.
//!
//! Streaming needs the `v4l2` feature. Without it [`V4l2Camera::open`]
//! always fails with [`CameraError::Unsupported`], while discovery and frame
//! decoding keep working.

use std::io;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use thiserror::Error;

/// `EBUSY` on Linux.
const EBUSY: i32 = 16;

/// Errors from the camera layer.
#[derive(Error, Debug)]
pub enum CameraError {
    /// Access to the device node was denied.
    #[error("permission denied opening {}", path.display())]
    PermissionDenied {
        /// The device node.
        path: PathBuf,
    },

    /// The device node does not exist.
    #[error("no camera at {}", path.display())]
    NotFound {
        /// The device node.
        path: PathBuf,
    },

    /// Another process holds the device.
    #[error("{} is in use by another process", path.display())]
    Busy {
        /// The device node.
        path: PathBuf,
    },

    /// Streaming is not available in this build, or the device cannot
    /// produce a format we decode.
    #[error("camera streaming unsupported: {reason}")]
    Unsupported {
        /// Why.
        reason: String,
    },

    /// Any other device I/O failure.
    #[error("camera I/O error on {}: {source}", path.display())]
    Io {
        /// The device node.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A frame could not be decoded.
    #[error("cannot decode {fourcc} frame: {message}")]
    Decode {
        /// Pixel format of the frame.
        fourcc: String,
        /// What went wrong.
        message: String,
    },

    /// The stream was already stopped.
    #[error("camera stream stopped")]
    Stopped,
}

impl CameraError {
    /// Classify an I/O error raised while using the device at `path`.
    #[must_use]
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::NotFound => Self::NotFound { path },
            _ if err.raw_os_error() == Some(EBUSY) => Self::Busy { path },
            _ => Self::Io { path, source: err },
        }
    }
}

fn fourcc_name(fourcc: [u8; 4]) -> String {
    String::from_utf8_lossy(&fourcc).into_owned()
}

/// Decode one raw frame in `fourcc` format into RGB.
///
/// # Errors
///
/// Returns [`CameraError::Decode`] for unknown formats and malformed frames.
pub fn decode_frame(
    fourcc: [u8; 4],
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<RgbImage, CameraError> {
    let decode_err = |message: String| CameraError::Decode {
        fourcc: fourcc_name(fourcc),
        message,
    };

    match &fourcc {
        b"MJPG" => image::load_from_memory_with_format(data, ImageFormat::Jpeg)
            .map(|frame| frame.to_rgb8())
            .map_err(|e| decode_err(e.to_string())),
        b"YUYV" => yuyv_to_rgb(data, width, height).ok_or_else(|| {
            decode_err(format!(
                "{} bytes is too short for {width}x{height}",
                data.len()
            ))
        }),
        _ => Err(decode_err("unsupported pixel format".to_string())),
    }
}

/// Convert packed YUYV 4:2:2 to RGB using BT.601 coefficients.
fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Option<RgbImage> {
    let pixels = (width as usize).checked_mul(height as usize)?;
    if width % 2 != 0 || yuyv.len() < pixels * 2 {
        return None;
    }

    let clamp = |v: i32| v.clamp(0, 255) as u8;
    let mut rgb = Vec::with_capacity(pixels * 3);
    for chunk in yuyv[..pixels * 2].chunks_exact(4) {
        let u = i32::from(chunk[1]) - 128;
        let v = i32::from(chunk[3]) - 128;
        for y in [chunk[0], chunk[2]] {
            let c = 298 * (i32::from(y) - 16);
            rgb.push(clamp((c + 409 * v + 128) >> 8));
            rgb.push(clamp((c - 100 * u - 208 * v + 128) >> 8));
            rgb.push(clamp((c + 516 * u + 128) >> 8));
        }
    }

    RgbImage::from_raw(width, height, rgb)
}

#[cfg(feature = "v4l2")]
mod stream {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use image::RgbImage;
    use tracing::{debug, info, warn};
    use v4l::buffer::Type;
    use v4l::io::mmap::Stream as MmapStream;
    use v4l::io::traits::{CaptureStream, Stream as _};
    use v4l::video::Capture;
    use v4l::{Device, Format, FourCC};

    use super::{decode_frame, fourcc_name, CameraError};

    const BUFFER_COUNT: u32 = 4;
    /// Frames dropped after STREAMON while exposure settles.
    const WARMUP_FRAMES: usize = 5;
    /// Longest wait for a single frame before dequeue fails with `TimedOut`.
    const FRAME_TIMEOUT: Duration = Duration::from_secs(3);
    const DECODABLE: [&[u8; 4]; 2] = [b"MJPG", b"YUYV"];

    /// A streaming V4L2 capture device.
    pub struct V4l2Camera {
        path: PathBuf,
        fourcc: [u8; 4],
        width: u32,
        height: u32,
        // Declared before the device so it is torn down first.
        stream: Option<MmapStream<'static>>,
        _device: Device,
    }

    impl V4l2Camera {
        /// Open `path` at its native resolution and start streaming.
        ///
        /// # Errors
        ///
        /// Returns a [`CameraError`] if the device cannot be opened, offers
        /// no decodable format, or refuses to stream.
        pub fn open(path: &Path) -> Result<Self, CameraError> {
            let io_err = |e| CameraError::from_io(path, e);

            let device = Device::with_path(path).map_err(io_err)?;
            let current = device.format().map_err(io_err)?;
            let format = negotiate(&device, path, current)?;

            let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)
                .map_err(io_err)?;
            stream.set_timeout(FRAME_TIMEOUT);

            // The first dequeue queues every buffer and issues STREAMON.
            for _ in 0..WARMUP_FRAMES {
                stream.next().map_err(io_err)?;
            }

            info!(
                device = %path.display(),
                fourcc = %fourcc_name(format.fourcc.repr),
                width = format.width,
                height = format.height,
                "V4L2 stream started"
            );

            Ok(Self {
                path: path.to_path_buf(),
                fourcc: format.fourcc.repr,
                width: format.width,
                height: format.height,
                stream: Some(stream),
                _device: device,
            })
        }

        /// Native resolution as `(width, height)`.
        #[must_use]
        pub fn resolution(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        /// Dequeue and decode the newest frame.
        ///
        /// Blocks for at most a few frame timeouts.
        ///
        /// # Errors
        ///
        /// Returns [`CameraError::Stopped`] after [`V4l2Camera::stop`], an
        /// I/O error (including a timed out dequeue) or a decode error.
        pub fn grab(&mut self) -> Result<RgbImage, CameraError> {
            let stream = self.stream.as_mut().ok_or(CameraError::Stopped)?;
            let io_err = |e| CameraError::from_io(&self.path, e);

            // Buffers filled while nobody dequeued hold stale frames.
            for _ in 1..BUFFER_COUNT {
                stream.next().map_err(io_err)?;
            }
            let (buf, meta) = stream.next().map_err(io_err)?;

            let used = (meta.bytesused as usize).min(buf.len());
            let data = if used == 0 { buf } else { &buf[..used] };
            decode_frame(self.fourcc, data, self.width, self.height)
        }

        /// Stop streaming. Calling this again does nothing.
        ///
        /// # Errors
        ///
        /// Returns an I/O error if the driver refused to stop.
        pub fn stop(&mut self) -> Result<(), CameraError> {
            let Some(mut stream) = self.stream.take() else {
                return Ok(());
            };
            stream
                .stop()
                .map_err(|e| CameraError::from_io(&self.path, e))?;
            debug!(device = %self.path.display(), "V4L2 stream stopped");
            Ok(())
        }
    }

    impl Drop for V4l2Camera {
        fn drop(&mut self) {
            if let Err(e) = self.stop() {
                warn!(device = %self.path.display(), error = %e, "V4L2 stream did not stop cleanly");
            }
        }
    }

    impl std::fmt::Debug for V4l2Camera {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("V4l2Camera")
                .field("path", &self.path)
                .field("fourcc", &fourcc_name(self.fourcc))
                .field("width", &self.width)
                .field("height", &self.height)
                .field("streaming", &self.stream.is_some())
                .finish()
        }
    }

    /// Keep the current format if we can decode it, otherwise ask for MJPG
    /// and then YUYV at the same size.
    fn negotiate(device: &Device, path: &Path, current: Format) -> Result<Format, CameraError> {
        if DECODABLE.contains(&&current.fourcc.repr) {
            return Ok(current);
        }

        for fourcc in DECODABLE {
            let wanted = Format::new(current.width, current.height, FourCC::new(fourcc));
            match device.set_format(&wanted) {
                Ok(actual) if actual.fourcc.repr == *fourcc => return Ok(actual),
                Ok(_) => {}
                Err(e) => debug!(
                    device = %path.display(),
                    fourcc = %fourcc_name(*fourcc),
                    error = %e,
                    "Format rejected"
                ),
            }
        }

        Err(CameraError::Unsupported {
            reason: format!(
                "{} only offers {}",
                path.display(),
                fourcc_name(current.fourcc.repr)
            ),
        })
    }
}

#[cfg(not(feature = "v4l2"))]
mod stream {
    use std::convert::Infallible;
    use std::path::Path;

    use image::RgbImage;

    use super::CameraError;

    /// Placeholder for builds without the `v4l2` feature. It cannot be
    /// constructed.
    #[derive(Debug)]
    pub struct V4l2Camera {
        never: Infallible,
    }

    impl V4l2Camera {
        /// Always fails: this build has no V4L2 streaming.
        ///
        /// # Errors
        ///
        /// Always returns [`CameraError::Unsupported`].
        pub fn open(path: &Path) -> Result<Self, CameraError> {
            Err(CameraError::Unsupported {
                reason: format!(
                    "built without the v4l2 feature, cannot open {}",
                    path.display()
                ),
            })
        }

        /// Native resolution as `(width, height)`.
        #[must_use]
        pub fn resolution(&self) -> (u32, u32) {
            match self.never {}
        }

        /// Dequeue and decode one frame.
        ///
        /// # Errors
        ///
        /// Never returns.
        pub fn grab(&mut self) -> Result<RgbImage, CameraError> {
            match self.never {}
        }

        /// Stop streaming.
        ///
        /// # Errors
        ///
        /// Never returns.
        pub fn stop(&mut self) -> Result<(), CameraError> {
            match self.never {}
        }
    }
}

pub use stream::V4l2Camera;

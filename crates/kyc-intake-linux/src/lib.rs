//! Linux camera support for kyc-intake.
//!
//! Discovers V4L2 video nodes through sysfs and, with the `v4l2` feature,
//! streams frames from them.

#![cfg(target_os = "linux")]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod camera;
pub mod discovery;

pub use camera::{decode_frame, CameraError, V4l2Camera};
pub use discovery::{list_devices, list_devices_in, select_device, Facing, VideoDevice};

/// Get platform name
#[must_use]
pub fn platform_name() -> &'static str {
    "Linux"
}

/// Check if this build can stream from cameras.
#[must_use]
pub fn streaming_supported() -> bool {
    cfg!(feature = "v4l2")
}

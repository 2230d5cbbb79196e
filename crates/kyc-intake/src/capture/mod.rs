//! Camera capture for the photo slots.
//!
//! [`device`] defines the seam to the hardware, [`widget`] the per-slot
//! session state machine and [`platform`] the system camera backend.

pub mod device;
pub mod platform;
pub mod widget;

pub use device::{CameraDevice, FacingMode, LiveStream, StreamGuard};
pub use platform::SystemCamera;
pub use widget::{
    capture_channel, CaptureOptions, CaptureReceiver, CaptureSender, CaptureStatus,
    CaptureWidget, CapturedPhoto, Preview,
};

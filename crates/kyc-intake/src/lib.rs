//! `kyc-intake` - KYC document intake with camera capture
//!
//! This library provides the intake form controller, the per-slot camera
//! capture widget, and the multipart transport that submits a completed form.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod artifact;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use artifact::{ArtifactOrigin, ImageArtifact};
pub use capture::{
    CameraDevice, CaptureOptions, CaptureStatus, CaptureWidget, CapturedPhoto, FacingMode,
    SystemCamera,
};
pub use config::Config;
pub use error::{AcquisitionErrorKind, Error, Result};
pub use form::{FormController, FormState, PhotoField};
pub use logging::init_logging;
pub use transport::{HttpTransport, MultipartPayload, Transport, UploadReceipt};

//! Error types for kyc-intake.
//!
//! Every failure in the form, the capture widget and the upload path is
//! converted into one of these variants at its call site. None of them are
//! fatal: each leaves the form or widget in a state the user can retry from.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::capture::CaptureStatus;

/// Why the device layer refused to hand out a live stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquisitionErrorKind {
    /// The user or the OS denied camera access.
    PermissionDenied,
    /// No suitable camera exists.
    NotFound,
    /// The camera is held by another process.
    Busy,
    /// Camera capture is not available in this build or on this platform.
    Unsupported,
    /// Anything else the device layer reported.
    Other,
}

impl fmt::Display for AcquisitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission_denied"),
            Self::NotFound => write!(f, "not_found"),
            Self::Busy => write!(f, "busy"),
            Self::Unsupported => write!(f, "unsupported"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// The main error type for kyc-intake operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Form Errors ===
    /// Required fields were empty at submit time.
    #[error("missing required fields: {}", missing.join(", "))]
    Validation {
        /// Wire keys of the missing fields, in form order.
        missing: Vec<&'static str>,
    },

    /// A file offered through the file input is not an image.
    #[error("{path} is not a supported image ({detected})")]
    UnsupportedMedia {
        /// The rejected file.
        path: PathBuf,
        /// What the sniffer saw instead.
        detected: String,
    },

    // === Capture Errors ===
    /// The camera could not be acquired.
    #[error("camera unavailable ({kind}): {message}")]
    DeviceAcquisition {
        /// Classified cause.
        kind: AcquisitionErrorKind,
        /// Human readable detail from the device layer.
        message: String,
    },

    /// A still frame could not be grabbed or turned into an artifact.
    #[error("capture conversion failed: {message}")]
    CaptureConversion {
        /// Description of what went wrong.
        message: String,
    },

    /// A widget action was requested in a status that does not allow it.
    #[error("cannot {action} while {status}")]
    InvalidAction {
        /// The requested action.
        action: &'static str,
        /// Status the widget was in.
        status: CaptureStatus,
    },

    // === Transport Errors ===
    /// The upload request failed or was rejected.
    #[error("upload failed: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
        /// HTTP status, when the server answered.
        status: Option<u16>,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for kyc-intake operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a device acquisition error.
    #[must_use]
    pub fn acquisition(kind: AcquisitionErrorKind, message: impl Into<String>) -> Self {
        Self::DeviceAcquisition {
            kind,
            message: message.into(),
        }
    }

    /// Create a capture conversion error.
    #[must_use]
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::CaptureConversion {
            message: message.into(),
        }
    }

    /// Create a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Transport {
            message: message.into(),
            status,
        }
    }

    /// Check if this error blocked a submission for missing fields.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error came from camera acquisition.
    #[must_use]
    pub fn is_acquisition(&self) -> bool {
        matches!(self, Self::DeviceAcquisition { .. })
    }

    /// Check if this error came from still-frame conversion.
    #[must_use]
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::CaptureConversion { .. })
    }

    /// Check if this error came from the upload.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// The acquisition kind, for device acquisition errors.
    #[must_use]
    pub fn acquisition_kind(&self) -> Option<AcquisitionErrorKind> {
        match self {
            Self::DeviceAcquisition { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

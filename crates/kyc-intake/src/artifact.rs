//! Image artifacts: the binary payloads that fill the form's photo slots.
//!
//! An artifact looks the same whether it came from the file input or from a
//! confirmed camera capture, so the form and the transport never care about
//! its origin.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::{ImageFormat, RgbImage};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// MIME type of every camera-produced artifact.
pub const JPEG_MIME: &str = "image/jpeg";

/// Where an artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactOrigin {
    /// Picked through the file input.
    File,
    /// Captured and confirmed in a capture widget.
    Camera,
}

impl fmt::Display for ArtifactOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Camera => write!(f, "camera"),
        }
    }
}

/// A binary image payload with the filename and MIME type it is uploaded under.
///
/// The bytes are shared, so cloning an artifact (for example to show it as
/// the initial preview of a capture widget) does not copy the image.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    file_name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
    digest: String,
    origin: ArtifactOrigin,
    acquired_at: DateTime<Utc>,
}

impl ImageArtifact {
    /// Wrap raw bytes in an artifact.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
        origin: ArtifactOrigin,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            digest: blake3::hash(&bytes).to_hex().to_string(),
            bytes,
            origin,
            acquired_at: Utc::now(),
        }
    }

    /// Read an image file the way a browser file input with `accept="image/*"`
    /// would: the original file name is kept and the MIME type is sniffed from
    /// the content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::UnsupportedMedia`] if it is not an image.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;

        let format = image::guess_format(&bytes).map_err(|e| Error::UnsupportedMedia {
            path: path.to_path_buf(),
            detected: e.to_string(),
        })?;

        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());

        debug!(
            path = %path.display(),
            format = ?format,
            size = bytes.len(),
            "Loaded image from file input"
        );

        Ok(Self::new(
            file_name,
            format.to_mime_type(),
            bytes,
            ArtifactOrigin::File,
        ))
    }

    /// Encode a still frame as a JPEG artifact named `file_name`.
    ///
    /// Encoding is CPU-bound and runs on the blocking pool. A shared frame is
    /// encoded in place without copying its pixels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaptureConversion`] if encoding fails.
    pub async fn from_still(
        file_name: impl Into<String>,
        still: impl Into<Arc<RgbImage>>,
        quality: u8,
    ) -> Result<Self> {
        let file_name = file_name.into();
        let still = still.into();
        let data = tokio::task::spawn_blocking(move || encode_jpeg(&still, quality))
            .await
            .map_err(|e| Error::conversion(format!("encoding task failed: {e}")))??;

        Ok(Self::new(file_name, JPEG_MIME, data, ArtifactOrigin::Camera))
    }

    /// Re-issue this artifact as a JPEG named `file_name`.
    ///
    /// JPEG payloads keep their bytes; anything else is decoded and
    /// re-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaptureConversion`] if the payload cannot be decoded
    /// or encoded.
    pub async fn to_jpeg_named(&self, file_name: impl Into<String>, quality: u8) -> Result<Self> {
        let file_name = file_name.into();

        if self.is_jpeg() {
            return Ok(Self {
                file_name,
                mime_type: JPEG_MIME.to_string(),
                origin: ArtifactOrigin::Camera,
                acquired_at: Utc::now(),
                ..self.clone()
            });
        }

        let bytes = Arc::clone(&self.bytes);
        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| Error::conversion(format!("decoding task failed: {e}")))?
            .map_err(|e| Error::conversion(format!("cannot decode {}: {e}", self.mime_type)))?;

        Self::from_still(file_name, decoded.to_rgb8(), quality).await
    }

    /// The filename used for the multipart part.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The MIME type used for the multipart part.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The raw payload.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// BLAKE3 hex digest of the payload.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// How this artifact was produced.
    #[must_use]
    pub fn origin(&self) -> ArtifactOrigin {
        self.origin
    }

    /// When this artifact was produced.
    #[must_use]
    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// Check if the payload is a JPEG.
    #[must_use]
    pub fn is_jpeg(&self) -> bool {
        self.mime_type == JPEG_MIME
    }
}

impl fmt::Debug for ImageArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageArtifact")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .field("digest", &self.digest)
            .field("origin", &self.origin)
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}

/// Encode an RGB frame as JPEG at the given quality.
///
/// # Errors
///
/// Returns [`Error::CaptureConversion`] if the encoder rejects the frame.
pub fn encode_jpeg(still: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    if still.width() == 0 || still.height() == 0 {
        return Err(Error::conversion("still frame has no pixels"));
    }

    let mut buffer = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .encode(
            still.as_raw(),
            still.width(),
            still.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| Error::conversion(format!("JPEG encoding failed: {e}")))?;

    Ok(buffer)
}

/// Sniff the image format of a payload, if it is one.
#[must_use]
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

//! Upload transport.
//!
//! The form hands a [`MultipartPayload`] to a [`Transport`]; the HTTP
//! implementation turns it into a single `multipart/form-data` POST.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Url};
use serde::Serialize;
use tracing::{debug, info};

use crate::artifact::ImageArtifact;
use crate::config::Config;
use crate::error::{Error, Result};

/// The body of one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartBody {
    /// A plain text field.
    Text(String),
    /// A file field.
    File(ImageArtifact),
}

/// One named part of a multipart payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Field name.
    pub name: String,
    /// Field body.
    pub body: PartBody,
}

/// An ordered list of multipart parts, independent of any HTTP client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartPayload {
    parts: Vec<Part>,
}

impl MultipartPayload {
    /// Create an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text part.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part {
            name: name.into(),
            body: PartBody::Text(value.into()),
        });
        self
    }

    /// Append a file part.
    #[must_use]
    pub fn file(mut self, name: impl Into<String>, artifact: ImageArtifact) -> Self {
        self.parts.push(Part {
            name: name.into(),
            body: PartBody::File(artifact),
        });
        self
    }

    /// All parts, in order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// The first part called `name`.
    #[must_use]
    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Describe every part without its payload.
    #[must_use]
    pub fn summary(&self) -> Vec<PartSummary> {
        self.parts.iter().map(PartSummary::from).collect()
    }

    fn into_form(self) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();
        for part in self.parts {
            form = match part.body {
                PartBody::Text(value) => form.text(part.name, value),
                PartBody::File(artifact) => {
                    let file = multipart::Part::bytes(artifact.bytes().to_vec())
                        .file_name(artifact.file_name().to_string())
                        .mime_str(artifact.mime_type())
                        .map_err(|e| {
                            Error::transport(
                                format!("invalid MIME type '{}': {e}", artifact.mime_type()),
                                None,
                            )
                        })?;
                    form.part(part.name, file)
                }
            };
        }
        Ok(form)
    }
}

/// A part as reported back to the user after upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartSummary {
    /// Field name.
    pub name: String,
    /// Uploaded filename, for file parts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// MIME type, for file parts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Body size in bytes.
    pub size: usize,
    /// BLAKE3 digest, for file parts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl From<&Part> for PartSummary {
    fn from(part: &Part) -> Self {
        match &part.body {
            PartBody::Text(value) => Self {
                name: part.name.clone(),
                file_name: None,
                mime_type: None,
                size: value.len(),
                digest: None,
            },
            PartBody::File(artifact) => Self {
                name: part.name.clone(),
                file_name: Some(artifact.file_name().to_string()),
                mime_type: Some(artifact.mime_type().to_string()),
                size: artifact.len(),
                digest: Some(artifact.digest().to_string()),
            },
        }
    }
}

/// The outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    /// Where the form was posted.
    pub endpoint: String,
    /// HTTP status returned by the server.
    pub status: u16,
    /// What was sent.
    pub parts: Vec<PartSummary>,
}

/// Delivers a payload to the backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Where payloads go.
    fn endpoint(&self) -> &str;

    /// Send `payload` exactly once and return the response status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the request fails or the server
    /// answers with a non-success status.
    async fn send(&self, payload: MultipartPayload) -> Result<u16>;
}

/// `multipart/form-data` over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if `endpoint` is not a URL, and
    /// [`Error::Transport`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| Error::ConfigValidation {
            message: format!("invalid upload endpoint '{endpoint}': {e}"),
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::transport(format!("cannot build HTTP client: {e}"), None))?;

        Ok(Self { client, endpoint })
    }

    /// Create a transport from the `[upload]` configuration section.
    ///
    /// # Errors
    ///
    /// See [`HttpTransport::new`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.upload.endpoint, config.upload_timeout())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    async fn send(&self, payload: MultipartPayload) -> Result<u16> {
        let parts = payload.parts().len();
        let form = payload.into_form()?;

        debug!(endpoint = %self.endpoint, parts, "Posting multipart form");
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::transport(format!("request failed: {e}"), None))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::transport(
                format!("server answered {status}: {}", body.trim()),
                Some(status.as_u16()),
            ));
        }

        info!(endpoint = %self.endpoint, status = status.as_u16(), "Upload accepted");
        Ok(status.as_u16())
    }
}

//! The intake form controller.
//!
//! Owns the three form values, collects photos from the file input and from
//! capture widgets, and submits everything as one multipart request.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::artifact::ImageArtifact;
use crate::capture::{
    capture_channel, CameraDevice, CaptureOptions, CaptureReceiver, CaptureSender, CaptureWidget,
    CapturedPhoto,
};
use crate::error::{Error, Result};
use crate::transport::{MultipartPayload, Transport, UploadReceipt};

/// Wire name of the name field.
pub const NAME_FIELD: &str = "userName";

/// The two photo slots of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PhotoField {
    /// Front side of the Aadhar card.
    #[serde(rename = "aadharFrontPhoto")]
    Front,
    /// Back side of the Aadhar card.
    #[serde(rename = "aadharBackPhoto")]
    Back,
}

impl PhotoField {
    /// Both slots, in form order.
    pub const ALL: [Self; 2] = [Self::Front, Self::Back];

    /// Wire name of the slot.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Front => "aadharFrontPhoto",
            Self::Back => "aadharBackPhoto",
        }
    }

    /// Human readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Front => "Aadhar card front",
            Self::Back => "Aadhar card back",
        }
    }

    /// Filename given to a confirmed capture.
    #[must_use]
    pub fn capture_file_name(self) -> String {
        format!("{}.jpg", self.key())
    }
}

impl fmt::Display for PhotoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The values of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    /// Applicant name as entered.
    pub name: String,
    /// Front photo.
    pub front_image: Option<ImageArtifact>,
    /// Back photo.
    pub back_image: Option<ImageArtifact>,
}

impl FormState {
    /// The artifact in `field`, if any.
    #[must_use]
    pub fn image(&self, field: PhotoField) -> Option<&ImageArtifact> {
        match field {
            PhotoField::Front => self.front_image.as_ref(),
            PhotoField::Back => self.back_image.as_ref(),
        }
    }

    fn slot_mut(&mut self, field: PhotoField) -> &mut Option<ImageArtifact> {
        match field {
            PhotoField::Front => &mut self.front_image,
            PhotoField::Back => &mut self.back_image,
        }
    }

    /// Wire names of every empty required field, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push(NAME_FIELD);
        }
        missing.extend(
            PhotoField::ALL
                .into_iter()
                .filter(|f| self.image(*f).is_none())
                .map(PhotoField::key),
        );
        missing
    }

    /// Check if every required field is filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Drives one KYC submission.
pub struct FormController<T: Transport> {
    state: FormState,
    transport: T,
    capture_tx: CaptureSender,
    capture_rx: CaptureReceiver,
}

impl<T: Transport> FormController<T> {
    /// Create an empty form that submits through `transport`.
    #[must_use]
    pub fn new(transport: T) -> Self {
        let (capture_tx, capture_rx) = capture_channel();
        Self {
            state: FormState::default(),
            transport,
            capture_tx,
            capture_rx,
        }
    }

    /// Current form values.
    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Set the applicant name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.state.name = name.into();
    }

    /// Put `artifact` into `field`, replacing whatever was there.
    pub fn set_image(&mut self, field: PhotoField, artifact: ImageArtifact) {
        info!(
            field = %field,
            file_name = artifact.file_name(),
            origin = %artifact.origin(),
            size = artifact.len(),
            acquired_at = %artifact.acquired_at(),
            "Photo slot filled"
        );
        if let Some(previous) = self.state.slot_mut(field).replace(artifact) {
            info!(field = %field, replaced = previous.file_name(), "Replaced previous photo");
        }
    }

    /// Fill `field` from an image file, as the file input does.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not an image; the
    /// slot keeps its previous value.
    pub async fn attach_file(&mut self, field: PhotoField, path: &Path) -> Result<()> {
        let artifact = ImageArtifact::from_file(path).await.map_err(|e| {
            warn!(field = %field, path = %path.display(), error = %e, "File input rejected");
            e
        })?;
        self.set_image(field, artifact);
        Ok(())
    }

    /// A sender capture widgets can report confirmed photos on.
    #[must_use]
    pub fn capture_sender(&self) -> CaptureSender {
        self.capture_tx.clone()
    }

    /// Create a capture widget for `field` wired to this form.
    #[must_use]
    pub fn capture_widget<D: CameraDevice>(
        &self,
        field: PhotoField,
        device: D,
        options: CaptureOptions,
    ) -> CaptureWidget<D> {
        CaptureWidget::new(field, device, self.capture_sender(), options)
    }

    /// Move every photo confirmed so far into its slot. Returns how many
    /// arrived.
    pub fn apply_captures(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(CapturedPhoto { field, artifact }) = self.capture_rx.try_recv() {
            self.set_image(field, artifact);
            applied += 1;
        }
        applied
    }

    /// Validate the form and build the upload payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] listing every empty required field.
    pub fn build_payload(&self) -> Result<MultipartPayload> {
        let missing = self.state.missing_fields();
        if !missing.is_empty() {
            return Err(Error::Validation { missing });
        }

        let mut payload = MultipartPayload::new().text(NAME_FIELD, self.state.name.clone());
        for field in PhotoField::ALL {
            if let Some(artifact) = self.state.image(field) {
                payload = payload.file(field.key(), artifact.clone());
            }
        }
        Ok(payload)
    }

    /// Validate and send the form once.
    ///
    /// Photos confirmed by capture widgets are applied first. On any failure
    /// the form keeps its values so the user can fix them and submit again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything if a required
    /// field is empty, or [`Error::Transport`] if the upload failed.
    pub async fn submit(&mut self) -> Result<UploadReceipt> {
        self.apply_captures();

        let payload = self.build_payload().map_err(|e| {
            warn!(error = %e, "Submission blocked");
            e
        })?;
        let parts = payload.summary();

        match self.transport.send(payload).await {
            Ok(status) => {
                info!(endpoint = self.transport.endpoint(), status, "Form submitted");
                Ok(UploadReceipt {
                    endpoint: self.transport.endpoint().to_string(),
                    status,
                    parts,
                })
            }
            Err(e) => {
                error!(endpoint = self.transport.endpoint(), error = %e, "Form submission failed");
                Err(e)
            }
        }
    }
}

impl<T: Transport + fmt::Debug> fmt::Debug for FormController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("state", &self.state)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

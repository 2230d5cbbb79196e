//! The capture widget: one camera session per photo slot.
//!
//! A widget walks through `Idle → Requesting → Streaming → PreviewReady` and
//! back to `Idle` on confirm, retake or cancel. All session state lives in a
//! single session value and every change goes through one transition
//! function, which releases whatever the outgoing state owned. The only way
//! out of a widget is a [`CapturedPhoto`] sent on the channel handed in at
//! construction.

use std::fmt;
use std::sync::Arc;

use image::RgbImage;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::device::{CameraDevice, FacingMode, LiveStream, StreamGuard};
use crate::artifact::ImageArtifact;
use crate::config::CameraConfig;
use crate::error::{AcquisitionErrorKind, Error, Result};
use crate::form::PhotoField;

/// Sending half of the completion channel.
pub type CaptureSender = mpsc::UnboundedSender<CapturedPhoto>;

/// Receiving half of the completion channel.
pub type CaptureReceiver = mpsc::UnboundedReceiver<CapturedPhoto>;

/// Create a completion channel.
#[must_use]
pub fn capture_channel() -> (CaptureSender, CaptureReceiver) {
    mpsc::unbounded_channel()
}

/// The completion event: a confirmed photo for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    /// The slot the photo belongs to.
    pub field: PhotoField,
    /// The final JPEG artifact.
    pub artifact: ImageArtifact,
}

/// Observable status of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStatus {
    /// Dormant, no camera and no preview.
    Idle,
    /// Waiting for the device layer to grant a stream.
    Requesting,
    /// A live stream is held.
    Streaming,
    /// A still preview is held and the camera is off.
    PreviewReady,
    /// The widget was unmounted.
    Closed,
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Requesting => write!(f, "requesting"),
            Self::Streaming => write!(f, "streaming"),
            Self::PreviewReady => write!(f, "preview ready"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// A preview waiting for the user's decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// A frame grabbed from the live stream. Clones share the pixels.
    Still(Arc<RgbImage>),
    /// The artifact the slot already had when the camera was opened.
    Existing(ImageArtifact),
}

/// Per-widget capture settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Preferred camera facing.
    pub facing: FacingMode,
    /// JPEG quality for confirmed stills.
    pub jpeg_quality: u8,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::from(&CameraConfig::default())
    }
}

impl From<&CameraConfig> for CaptureOptions {
    fn from(config: &CameraConfig) -> Self {
        Self {
            facing: config.facing,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

enum Session<S: LiveStream> {
    Idle,
    Requesting,
    Streaming(StreamGuard<S>),
    PreviewReady(Preview),
    Closed,
}

impl<S: LiveStream> Session<S> {
    fn status(&self) -> CaptureStatus {
        match self {
            Self::Idle => CaptureStatus::Idle,
            Self::Requesting => CaptureStatus::Requesting,
            Self::Streaming(_) => CaptureStatus::Streaming,
            Self::PreviewReady(_) => CaptureStatus::PreviewReady,
            Self::Closed => CaptureStatus::Closed,
        }
    }
}

/// Camera capture for a single photo slot.
pub struct CaptureWidget<D: CameraDevice> {
    field: PhotoField,
    device: D,
    options: CaptureOptions,
    sink: CaptureSender,
    session: Session<D::Stream>,
}

impl<D: CameraDevice> CaptureWidget<D> {
    /// Create a dormant widget for `field` that reports confirmed photos on
    /// `sink`.
    #[must_use]
    pub fn new(field: PhotoField, device: D, sink: CaptureSender, options: CaptureOptions) -> Self {
        Self {
            field,
            device,
            options,
            sink,
            session: Session::Idle,
        }
    }

    /// The slot this widget fills.
    #[must_use]
    pub fn field(&self) -> PhotoField {
        self.field
    }

    /// Current session status.
    #[must_use]
    pub fn status(&self) -> CaptureStatus {
        self.session.status()
    }

    /// Check if the widget currently holds a live device stream.
    #[must_use]
    pub fn has_live_stream(&self) -> bool {
        matches!(&self.session, Session::Streaming(guard) if guard.is_live())
    }

    /// Native resolution of the live stream, while streaming.
    #[must_use]
    pub fn stream_resolution(&self) -> Option<(u32, u32)> {
        match &self.session {
            Session::Streaming(guard) => guard.resolution(),
            _ => None,
        }
    }

    /// The preview awaiting a decision, if any.
    #[must_use]
    pub fn preview(&self) -> Option<&Preview> {
        match &self.session {
            Session::PreviewReady(preview) => Some(preview),
            _ => None,
        }
    }

    /// Open the camera.
    ///
    /// When the slot already holds `existing`, the widget shows it as the
    /// preview without touching the camera. Otherwise it requests a live
    /// stream from the device layer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAction`] unless the widget is idle, and
    /// [`Error::DeviceAcquisition`] if the camera could not be acquired, in
    /// which case the widget is idle again.
    pub async fn open_camera(&mut self, existing: Option<&ImageArtifact>) -> Result<()> {
        self.require(CaptureStatus::Idle, "open the camera")?;

        if let Some(artifact) = existing {
            info!(
                field = %self.field,
                file_name = artifact.file_name(),
                "Showing existing photo before capture"
            );
            self.transition(Session::PreviewReady(Preview::Existing(artifact.clone())));
            return Ok(());
        }

        self.start_stream().await
    }

    /// Freeze the live feed into a still preview and turn the camera off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAction`] unless streaming, and
    /// [`Error::CaptureConversion`] if no frame could be grabbed; the stream
    /// stays live so the user can try again.
    pub fn capture(&mut self) -> Result<()> {
        let Session::Streaming(guard) = &mut self.session else {
            return Err(self.invalid("capture"));
        };

        let still = guard.grab_still().map_err(|e| {
            warn!(field = %self.field, error = %e, "Still frame capture failed");
            e
        })?;

        info!(
            field = %self.field,
            width = still.width(),
            height = still.height(),
            "Captured still frame"
        );
        self.transition(Session::PreviewReady(Preview::Still(Arc::new(still))));
        Ok(())
    }

    /// Discard the preview and go live again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAction`] unless a preview is shown, and
    /// [`Error::DeviceAcquisition`] if the camera could not be re-acquired.
    pub async fn retake(&mut self) -> Result<()> {
        self.require(CaptureStatus::PreviewReady, "retake")?;
        debug!(field = %self.field, "Discarding preview for retake");
        self.start_stream().await
    }

    /// Accept the preview: convert it to `<field>.jpg`, report it once, and
    /// tear the session down.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAction`] unless a preview is shown, and
    /// [`Error::CaptureConversion`] if the preview cannot be converted; the
    /// preview is kept so the user can retry or retake.
    pub async fn confirm(&mut self) -> Result<()> {
        let Session::PreviewReady(preview) = &self.session else {
            return Err(self.invalid("use the photo"));
        };

        let file_name = self.field.capture_file_name();
        let quality = self.options.jpeg_quality;
        // Both variants share their payload, so the clone copies no pixels.
        let converted = match preview.clone() {
            Preview::Still(still) => ImageArtifact::from_still(file_name, still, quality).await,
            Preview::Existing(artifact) => artifact.to_jpeg_named(file_name, quality).await,
        };

        let artifact = converted.map_err(|e| {
            warn!(field = %self.field, error = %e, "Keeping preview after failed conversion");
            e
        })?;

        info!(
            field = %self.field,
            file_name = artifact.file_name(),
            size = artifact.len(),
            digest = artifact.digest(),
            "Photo confirmed"
        );

        let event = CapturedPhoto {
            field: self.field,
            artifact,
        };
        if self.sink.send(event).is_err() {
            warn!(field = %self.field, "Form is gone, confirmed photo dropped");
        }

        self.transition(Session::Idle);
        Ok(())
    }

    /// Abandon the session: release the camera, drop any preview, report
    /// nothing. Safe to call in any status.
    pub fn cancel(&mut self) {
        if matches!(self.session, Session::Closed) {
            return;
        }
        self.transition(Session::Idle);
    }

    /// Tear the widget down for good. Safe to call more than once.
    pub fn unmount(&mut self) {
        if matches!(self.session, Session::Closed) {
            return;
        }
        self.transition(Session::Closed);
    }

    async fn start_stream(&mut self) -> Result<()> {
        self.transition(Session::Requesting);

        match self.device.acquire(self.options.facing).await {
            Ok(stream) => {
                let guard = StreamGuard::new(stream);
                info!(
                    field = %self.field,
                    facing = %self.options.facing,
                    resolution = ?guard.resolution(),
                    "Camera acquired"
                );
                self.transition(Session::Streaming(guard));
                Ok(())
            }
            Err(e) => {
                let err = if e.is_acquisition() {
                    e
                } else {
                    Error::acquisition(AcquisitionErrorKind::Other, e.to_string())
                };
                warn!(field = %self.field, error = %err, "Camera acquisition failed");
                self.transition(Session::Idle);
                Err(err)
            }
        }
    }

    /// Replace the session, releasing anything the old one held.
    fn transition(&mut self, next: Session<D::Stream>) {
        let to = next.status();
        let previous = std::mem::replace(&mut self.session, next);
        let from = previous.status();

        if let Session::Streaming(mut guard) = previous {
            guard.release();
        }

        debug!(field = %self.field, %from, %to, "Capture session transition");
    }

    fn require(&self, status: CaptureStatus, action: &'static str) -> Result<()> {
        if self.status() == status {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> Error {
        Error::InvalidAction {
            action,
            status: self.status(),
        }
    }
}

impl<D: CameraDevice> Drop for CaptureWidget<D> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<D: CameraDevice> fmt::Debug for CaptureWidget<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureWidget")
            .field("field", &self.field)
            .field("status", &self.status())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactOrigin, JPEG_MIME};
    use crate::testing::FakeCamera;

    fn widget(
        field: PhotoField,
        camera: &FakeCamera,
    ) -> (CaptureWidget<FakeCamera>, CaptureReceiver) {
        crate::logging::init_test_logging();
        let (tx, rx) = capture_channel();
        let widget = CaptureWidget::new(field, camera.clone(), tx, CaptureOptions::default());
        (widget, rx)
    }

    #[tokio::test]
    async fn test_starts_idle_without_stream() {
        let camera = FakeCamera::new(640, 480);
        let (widget, _rx) = widget(PhotoField::Front, &camera);

        assert_eq!(widget.status(), CaptureStatus::Idle);
        assert!(!widget.has_live_stream());
        assert!(widget.preview().is_none());
        assert_eq!(camera.acquired(), 0);
    }

    #[tokio::test]
    async fn test_open_camera_streams_with_environment_preference() {
        let camera = FakeCamera::new(1280, 720);
        let (mut widget, _rx) = widget(PhotoField::Front, &camera);

        widget.open_camera(None).await.unwrap();

        assert_eq!(widget.status(), CaptureStatus::Streaming);
        assert!(widget.has_live_stream());
        assert_eq!(widget.stream_resolution(), Some((1280, 720)));
        assert_eq!(camera.last_facing(), Some(FacingMode::Environment));
    }

    #[tokio::test]
    async fn test_capture_releases_stream_exactly_once() {
        let camera = FakeCamera::new(1920, 1080);
        let (mut widget, _rx) = widget(PhotoField::Front, &camera);

        widget.open_camera(None).await.unwrap();
        widget.capture().unwrap();

        assert_eq!(widget.status(), CaptureStatus::PreviewReady);
        assert!(!widget.has_live_stream());
        assert_eq!(camera.released(), 1);
        assert_eq!(camera.live(), 0);

        match widget.preview() {
            Some(Preview::Still(still)) => assert_eq!(still.dimensions(), (1920, 1080)),
            other => panic!("expected still preview, got {other:?}"),
        }

        widget.cancel();
        drop(widget);
        assert_eq!(camera.released(), 1);
    }

    #[tokio::test]
    async fn test_preview_clones_share_the_captured_frame() {
        let camera = FakeCamera::new(1920, 1080);
        let (mut widget, mut rx) = widget(PhotoField::Front, &camera);

        widget.open_camera(None).await.unwrap();
        widget.capture().unwrap();

        let (Some(Preview::Still(a)), Some(Preview::Still(b))) =
            (widget.preview().cloned(), widget.preview().cloned())
        else {
            panic!("expected still preview");
        };
        assert!(Arc::ptr_eq(&a, &b));

        widget.confirm().await.unwrap();
        assert_eq!(rx.try_recv().unwrap().artifact.file_name(), "aadharFrontPhoto.jpg");
    }

    #[tokio::test]
    async fn test_confirm_reports_once_with_jpeg_name() {
        let camera = FakeCamera::new(320, 240);
        let (mut widget, mut rx) = widget(PhotoField::Back, &camera);

        widget.open_camera(None).await.unwrap();
        widget.capture().unwrap();
        widget.confirm().await.unwrap();

        let photo = rx.try_recv().unwrap();
        assert_eq!(photo.field, PhotoField::Back);
        assert_eq!(photo.artifact.file_name(), "aadharBackPhoto.jpg");
        assert_eq!(photo.artifact.mime_type(), JPEG_MIME);
        assert_eq!(photo.artifact.origin(), ArtifactOrigin::Camera);
        assert!(rx.try_recv().is_err());

        assert_eq!(widget.status(), CaptureStatus::Idle);
        assert!(!widget.has_live_stream());
        assert!(widget.preview().is_none());
    }

    #[tokio::test]
    async fn test_second_confirm_is_rejected() {
        let camera = FakeCamera::new(320, 240);
        let (mut widget, mut rx) = widget(PhotoField::Front, &camera);

        widget.open_camera(None).await.unwrap();
        widget.capture().unwrap();
        widget.confirm().await.unwrap();

        let err = widget.confirm().await.unwrap_err();
        assert!(matches!(err, Error::InvalidAction { .. }));
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_while_streaming_reports_nothing() {
        let camera = FakeCamera::new(640, 480);
        let (mut widget, mut rx) = widget(PhotoField::Front, &camera);

        widget.open_camera(None).await.unwrap();
        widget.cancel();

        assert_eq!(widget.status(), CaptureStatus::Idle);
        assert!(!widget.has_live_stream());
        assert_eq!(camera.live(), 0);
        assert_eq!(camera.released(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let camera = FakeCamera::new(640, 480);
        let (mut widget, _rx) = widget(PhotoField::Front, &camera);

        widget.cancel();
        widget.open_camera(None).await.unwrap();
        widget.cancel();
        widget.cancel();

        assert_eq!(camera.released(), 1);
        assert_eq!(widget.status(), CaptureStatus::Idle);
    }

    #[tokio::test]
    async fn test_retake_discards_preview_and_streams_again() {
        let camera = FakeCamera::new(640, 480);
        let (mut widget, mut rx) = widget(PhotoField::Front, &camera);

        widget.open_camera(None).await.unwrap();
        widget.capture().unwrap();
        widget.retake().await.unwrap();

        assert_eq!(widget.status(), CaptureStatus::Streaming);
        assert!(widget.preview().is_none());
        assert!(widget.has_live_stream());
        assert_eq!(camera.acquired(), 2);
        assert_eq!(camera.live(), 1);
        assert_eq!(camera.max_live(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_open_with_existing_artifact_skips_camera() {
        let camera = FakeCamera::new(640, 480);
        let (mut widget, _rx) = widget(PhotoField::Front, &camera);
        let existing = ImageArtifact::new("fileA.jpg", JPEG_MIME, vec![1, 2, 3], ArtifactOrigin::File);

        widget.open_camera(Some(&existing)).await.unwrap();

        assert_eq!(widget.status(), CaptureStatus::PreviewReady);
        assert!(!widget.has_live_stream());
        assert_eq!(camera.acquired(), 0);
        assert_eq!(widget.preview(), Some(&Preview::Existing(existing)));
    }

    #[tokio::test]
    async fn test_retake_from_existing_preview_goes_live() {
        let camera = FakeCamera::new(640, 480);
        let (mut widget, _rx) = widget(PhotoField::Front, &camera);
        let existing = ImageArtifact::new("fileA.jpg", JPEG_MIME, vec![1, 2, 3], ArtifactOrigin::File);

        widget.open_camera(Some(&existing)).await.unwrap();
        widget.retake().await.unwrap();

        assert_eq!(widget.status(), CaptureStatus::Streaming);
        assert_eq!(camera.acquired(), 1);
    }

    #[tokio::test]
    async fn test_acquisition_failure_returns_to_idle() {
        let camera = FakeCamera::new(640, 480);
        camera.deny_next(AcquisitionErrorKind::PermissionDenied);
        let (mut widget, mut rx) = widget(PhotoField::Front, &camera);

        let err = widget.open_camera(None).await.unwrap_err();

        assert_eq!(
            err.acquisition_kind(),
            Some(AcquisitionErrorKind::PermissionDenied)
        );
        assert_eq!(widget.status(), CaptureStatus::Idle);
        assert!(!widget.has_live_stream());
        assert!(rx.try_recv().is_err());

        widget.open_camera(None).await.unwrap();
        assert_eq!(widget.status(), CaptureStatus::Streaming);
    }

    #[tokio::test]
    async fn test_retake_acquisition_failure_returns_to_idle() {
        let camera = FakeCamera::new(640, 480);
        let (mut widget, _rx) = widget(PhotoField::Back, &camera);

        widget.open_camera(None).await.unwrap();
        widget.capture().unwrap();
        camera.deny_next(AcquisitionErrorKind::Busy);

        let err = widget.retake().await.unwrap_err();
        assert_eq!(err.acquisition_kind(), Some(AcquisitionErrorKind::Busy));
        assert_eq!(widget.status(), CaptureStatus::Idle);
        assert!(widget.preview().is_none());
    }

    #[tokio::test]
    async fn test_dropped_acquisition_leaves_requesting_until_cancel() {
        let camera = FakeCamera::new(640, 480);
        let (mut widget, _rx) = widget(PhotoField::Front, &camera);

        camera.stall_acquire(true);
        let outcome =
            tokio::time::timeout(std::time::Duration::from_millis(20), widget.open_camera(None))
                .await;
        assert!(outcome.is_err());
        camera.stall_acquire(false);
        assert_eq!(widget.status(), CaptureStatus::Requesting);
        assert_eq!(camera.acquired(), 0);

        widget.cancel();
        assert_eq!(widget.status(), CaptureStatus::Idle);
        widget.open_camera(None).await.unwrap();
        assert_eq!(widget.status(), CaptureStatus::Streaming);
    }

    #[tokio::test]
    async fn test_failed_grab_keeps_streaming() {
        let camera = FakeCamera::new(640, 480);
        let (mut widget, _rx) = widget(PhotoField::Front, &camera);

        widget.open_camera(None).await.unwrap();
        camera.fail_grabs(true);

        assert!(widget.capture().unwrap_err().is_conversion());
        assert_eq!(widget.status(), CaptureStatus::Streaming);
        assert!(widget.has_live_stream());

        camera.fail_grabs(false);
        widget.capture().unwrap();
        assert_eq!(widget.status(), CaptureStatus::PreviewReady);
    }

    #[tokio::test]
    async fn test_failed_conversion_keeps_preview() {
        let camera = FakeCamera::new(640, 480);
        let (mut widget, mut rx) = widget(PhotoField::Front, &camera);
        let corrupt = ImageArtifact::new("scan.png", "image/png", vec![0u8; 8], ArtifactOrigin::File);

        widget.open_camera(Some(&corrupt)).await.unwrap();
        let err = widget.confirm().await.unwrap_err();

        assert!(err.is_conversion());
        assert_eq!(widget.status(), CaptureStatus::PreviewReady);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_actions_rejected_in_wrong_status() {
        let camera = FakeCamera::new(640, 480);
        let (mut widget, _rx) = widget(PhotoField::Front, &camera);

        assert!(matches!(
            widget.capture(),
            Err(Error::InvalidAction {
                status: CaptureStatus::Idle,
                ..
            })
        ));
        assert!(widget.retake().await.is_err());
        assert!(widget.confirm().await.is_err());

        widget.open_camera(None).await.unwrap();
        assert!(matches!(
            widget.open_camera(None).await,
            Err(Error::InvalidAction {
                status: CaptureStatus::Streaming,
                ..
            })
        ));
        assert_eq!(camera.acquired(), 1);
        assert_eq!(camera.max_live(), 1);
    }

    #[tokio::test]
    async fn test_unmount_releases_and_closes() {
        let camera = FakeCamera::new(640, 480);
        let (mut widget, mut rx) = widget(PhotoField::Front, &camera);

        widget.open_camera(None).await.unwrap();
        widget.unmount();
        widget.unmount();

        assert_eq!(widget.status(), CaptureStatus::Closed);
        assert_eq!(camera.live(), 0);
        assert_eq!(camera.released(), 1);
        assert!(rx.try_recv().is_err());
        assert!(widget.open_camera(None).await.is_err());

        widget.cancel();
        assert_eq!(widget.status(), CaptureStatus::Closed);
    }

    #[tokio::test]
    async fn test_drop_while_streaming_releases() {
        let camera = FakeCamera::new(640, 480);
        let (mut widget, mut rx) = widget(PhotoField::Back, &camera);

        widget.open_camera(None).await.unwrap();
        drop(widget);

        assert_eq!(camera.live(), 0);
        assert_eq!(camera.released(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_every_exit_path_leaves_no_stream() {
        type Step = fn(&mut CaptureWidget<FakeCamera>);
        let exits: [(&str, Step); 2] = [
            ("cancel", |w| w.cancel()),
            ("unmount", |w| w.unmount()),
        ];

        for (name, exit) in exits {
            let camera = FakeCamera::new(640, 480);
            let (mut streaming, _rx1) = widget(PhotoField::Front, &camera);
            streaming.open_camera(None).await.unwrap();
            exit(&mut streaming);
            assert!(!streaming.has_live_stream(), "{name} from streaming");

            let (mut previewing, _rx2) = widget(PhotoField::Back, &camera);
            previewing.open_camera(None).await.unwrap();
            previewing.capture().unwrap();
            exit(&mut previewing);
            assert!(!previewing.has_live_stream(), "{name} from preview");

            assert_eq!(camera.live(), 0, "{name}");
            assert_eq!(camera.acquired(), camera.released(), "{name}");
        }
    }

    #[tokio::test]
    async fn test_confirm_with_dropped_form_still_tears_down() {
        let camera = FakeCamera::new(64, 64);
        let (mut widget, rx) = widget(PhotoField::Front, &camera);
        drop(rx);

        widget.open_camera(None).await.unwrap();
        widget.capture().unwrap();
        widget.confirm().await.unwrap();

        assert_eq!(widget.status(), CaptureStatus::Idle);
        assert_eq!(camera.live(), 0);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(CaptureStatus::PreviewReady.to_string(), "preview ready");
        assert_eq!(CaptureStatus::Closed.to_string(), "closed");
    }

    #[test]
    fn test_options_from_config() {
        let config = CameraConfig {
            device: None,
            facing: FacingMode::User,
            jpeg_quality: 70,
        };
        let options = CaptureOptions::from(&config);
        assert_eq!(options.facing, FacingMode::User);
        assert_eq!(options.jpeg_quality, 70);
    }
}

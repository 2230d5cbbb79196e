//! In-memory fakes for the camera and the upload transport.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use image::{Rgb, RgbImage};

use crate::capture::{CameraDevice, FacingMode, LiveStream};
use crate::error::{AcquisitionErrorKind, Error, Result};
use crate::transport::{MultipartPayload, Transport};

#[derive(Debug, Default)]
struct CameraState {
    width: u32,
    height: u32,
    acquired: usize,
    released: usize,
    max_live: usize,
    deny_next: Option<AcquisitionErrorKind>,
    stall_acquire: bool,
    fail_grabs: bool,
    fail_stops: bool,
    frame_size: Option<(u32, u32)>,
    last_facing: Option<FacingMode>,
}

impl CameraState {
    fn live(&self) -> usize {
        self.acquired - self.released
    }
}

/// A camera that counts acquisitions and releases.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeCamera {
    state: Arc<Mutex<CameraState>>,
}

impl FakeCamera {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(CameraState {
                width,
                height,
                ..CameraState::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, CameraState> {
        self.state.lock().unwrap()
    }

    /// Fail the next acquisition with `kind`.
    pub(crate) fn deny_next(&self, kind: AcquisitionErrorKind) {
        self.state().deny_next = Some(kind);
    }

    /// Make acquisitions wait forever, as if a permission prompt never
    /// closed.
    pub(crate) fn stall_acquire(&self, stall: bool) {
        self.state().stall_acquire = stall;
    }

    pub(crate) fn fail_grabs(&self, fail: bool) {
        self.state().fail_grabs = fail;
    }

    pub(crate) fn fail_stops(&self, fail: bool) {
        self.state().fail_stops = fail;
    }

    /// Hand out frames at `size` instead of the native resolution.
    pub(crate) fn scale_frames_to(&self, size: Option<(u32, u32)>) {
        self.state().frame_size = size;
    }

    pub(crate) fn acquired(&self) -> usize {
        self.state().acquired
    }

    pub(crate) fn released(&self) -> usize {
        self.state().released
    }

    pub(crate) fn live(&self) -> usize {
        self.state().live()
    }

    /// Highest number of simultaneously live streams seen.
    pub(crate) fn max_live(&self) -> usize {
        self.state().max_live
    }

    pub(crate) fn last_facing(&self) -> Option<FacingMode> {
        self.state().last_facing
    }
}

#[async_trait]
impl CameraDevice for FakeCamera {
    type Stream = FakeStream;

    async fn acquire(&self, facing: FacingMode) -> Result<FakeStream> {
        let stall = self.state().stall_acquire;
        if stall {
            std::future::pending::<()>().await;
        }
        tokio::task::yield_now().await;

        let mut state = self.state();
        state.last_facing = Some(facing);
        if let Some(kind) = state.deny_next.take() {
            return Err(Error::acquisition(kind, "denied by fake camera"));
        }

        state.acquired += 1;
        state.max_live = state.max_live.max(state.live());

        Ok(FakeStream {
            state: Arc::clone(&self.state),
            resolution: (state.width, state.height),
            stopped: false,
        })
    }
}

/// A stream handed out by [`FakeCamera`].
#[derive(Debug)]
pub(crate) struct FakeStream {
    state: Arc<Mutex<CameraState>>,
    resolution: (u32, u32),
    stopped: bool,
}

impl LiveStream for FakeStream {
    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn grab_frame(&mut self) -> Result<RgbImage> {
        let state = self.state.lock().unwrap();
        if self.stopped || state.fail_grabs {
            return Err(Error::conversion("fake camera produced no frame"));
        }

        let (width, height) = state.frame_size.unwrap_or(self.resolution);
        Ok(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 96])
        }))
    }

    fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;

        let mut state = self.state.lock().unwrap();
        state.released += 1;
        if state.fail_stops {
            return Err(Error::acquisition(AcquisitionErrorKind::Other, "stop failed"));
        }
        Ok(())
    }
}

/// A transport that keeps every payload it is asked to send.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingTransport {
    requests: Arc<Mutex<Vec<MultipartPayload>>>,
    fail_with: Arc<Mutex<Option<u16>>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answer every following request with HTTP `status`.
    pub(crate) fn fail_with(&self, status: u16) {
        *self.fail_with.lock().unwrap() = Some(status);
    }

    pub(crate) fn requests(&self) -> Vec<MultipartPayload> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn endpoint(&self) -> &str {
        "memory://recording"
    }

    async fn send(&self, payload: MultipartPayload) -> Result<u16> {
        self.requests.lock().unwrap().push(payload);
        match *self.fail_with.lock().unwrap() {
            Some(status) => Err(Error::transport(format!("HTTP {status}"), Some(status))),
            None => Ok(200),
        }
    }
}

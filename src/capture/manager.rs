//! Device stream ownership
//!
//! The capture manager requests the camera/microphone stream once, publishes
//! it to the preview surface and the recorder, and is the only place that
//! closes it.

use super::traits::{MediaConstraints, MediaHost};
use crate::utils::error::AppResult;

/// Lifecycle of the device stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// Acquisition requested or not yet attempted
    Pending,
    /// Stream acquired and live
    Ready,
    /// Acquisition failed; capture stays disabled for this session
    Failed,
    /// Stream tracks stopped at teardown
    Released,
}

pub struct CaptureManager<H: MediaHost> {
    host: H,
    constraints: MediaConstraints,
    stream: Option<H::Stream>,
    status: CaptureStatus,
}

impl<H: MediaHost> CaptureManager<H> {
    pub fn new(host: H, constraints: MediaConstraints) -> Self {
        Self {
            host,
            constraints,
            stream: None,
            status: CaptureStatus::Pending,
        }
    }

    /// Request a stream from the host.
    ///
    /// This is an associated function so callers that keep the manager behind
    /// a `RefCell` can await it without holding a borrow.
    pub async fn acquire(host: &H, constraints: &MediaConstraints) -> AppResult<H::Stream> {
        tracing::info!(
            "Requesting device stream ({}x{}, echo cancellation required: {})",
            constraints.video.width,
            constraints.video.height,
            constraints.audio.echo_cancellation
        );
        host.get_user_media(constraints).await
    }

    /// Record the outcome of [`CaptureManager::acquire`].
    ///
    /// Failures are logged and absorbed. There is no retry.
    pub fn publish(&mut self, result: AppResult<H::Stream>) -> bool {
        if self.status != CaptureStatus::Pending {
            tracing::warn!("Ignoring capture result, status is {:?}", self.status);
            if let Ok(stream) = result {
                self.host.stop_stream(&stream);
            }
            return false;
        }

        match result {
            Ok(stream) => {
                self.host.bind_live_preview(&stream);
                self.stream = Some(stream);
                self.status = CaptureStatus::Ready;
                tracing::info!("Device stream acquired");
                true
            }
            Err(e) => {
                tracing::error!(code = e.code(), "Failed to acquire device stream: {}", e);
                self.status = CaptureStatus::Failed;
                false
            }
        }
    }

    /// Acquire and publish in one step.
    pub async fn initialize(&mut self) -> bool {
        let result = Self::acquire(&self.host, &self.constraints).await;
        self.publish(result)
    }

    pub fn stream(&self) -> Option<&H::Stream> {
        self.stream.as_ref()
    }

    pub fn status(&self) -> CaptureStatus {
        self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == CaptureStatus::Ready
    }

    pub fn constraints(&self) -> &MediaConstraints {
        &self.constraints
    }

    /// Stop all tracks. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.host.stop_stream(&stream);
            self.status = CaptureStatus::Released;
            tracing::info!("Device stream released");
        }
    }
}

impl<H: MediaHost> Drop for CaptureManager<H> {
    fn drop(&mut self) {
        self.release();
    }
}

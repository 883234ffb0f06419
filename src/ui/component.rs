//! The recorder component
//!
//! `WebcamRecorder` owns the capture manager, recording controller and
//! playback manager for one mounted instance. Button handlers never return
//! errors: failures are logged and the view simply keeps the affected
//! controls disabled.

use super::view::ViewModel;
use crate::capture::{CaptureManager, CaptureStatus, MediaConstraints, MediaHost};
use crate::config::RecorderConfig;
use crate::export::PlaybackManager;
use crate::recorder::{RecordingController, RecordingSession, RecordingState};
use crate::utils::error::{AppError, AppResult};
use tokio::sync::watch;

pub struct WebcamRecorder<H: MediaHost> {
    host: H,
    config: RecorderConfig,
    capture: CaptureManager<H>,
    controller: RecordingController<H>,
    playback: PlaybackManager<H>,
    /// Playback surface shown; cleared on every start and stop
    playback_visible: bool,
    view_tx: watch::Sender<ViewModel>,
    torn_down: bool,
}

impl<H: MediaHost> WebcamRecorder<H> {
    pub fn new(host: H, config: RecorderConfig) -> Self {
        let (view_tx, _) = watch::channel(ViewModel::default());
        Self {
            capture: CaptureManager::new(host.clone(), config.constraints.clone()),
            controller: RecordingController::new(
                host.clone(),
                Some(config.format.mime_type().to_string()),
                config.timeslice_ms,
            ),
            playback: PlaybackManager::new(host.clone(), config.format, config.download_grace()),
            host,
            config,
            playback_visible: false,
            view_tx,
            torn_down: false,
        }
    }

    /// Construct and request the device stream.
    pub async fn mount(host: H, config: RecorderConfig) -> Self {
        let mut recorder = Self::new(host, config);
        recorder.initialize().await;
        recorder
    }

    pub async fn initialize(&mut self) {
        self.capture.initialize().await;
        self.publish();
    }

    /// Host and constraints needed to run [`CaptureManager::acquire`] outside
    /// a borrow of the component; hand the result to [`Self::on_capture`].
    pub fn capture_request(&self) -> (H, MediaConstraints) {
        (self.host.clone(), self.config.constraints.clone())
    }

    pub fn on_capture(&mut self, result: AppResult<H::Stream>) {
        if self.torn_down {
            if let Ok(stream) = result {
                self.host.stop_stream(&stream);
            }
            return;
        }
        self.capture.publish(result);
        self.publish();
    }

    /// Receive every change to the view
    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.view_tx.subscribe()
    }

    pub fn view(&self) -> ViewModel {
        ViewModel::project(
            self.controller.state(),
            self.capture.is_ready(),
            self.playback_visible,
            self.playback.preview_url(),
        )
    }

    /// Record button
    pub fn toggle_recording(&mut self) {
        if self.torn_down {
            return;
        }
        let Some(stream) = self.capture.stream().cloned() else {
            tracing::warn!("Record toggled without a device stream");
            return;
        };

        if self.controller.state().is_recording() {
            self.controller.stop();
            self.playback_visible = false;
        } else {
            match self.controller.start(&stream) {
                Ok(()) => self.playback_visible = false,
                Err(e @ (AppError::StopPending | AppError::AlreadyRecording)) => {
                    tracing::warn!(code = e.code(), "Not starting: {}", e);
                }
                Err(e) => {
                    tracing::error!(code = e.code(), "Failed to start recording: {}", e);
                    self.playback_visible = false;
                }
            }
        }

        self.publish();
    }

    /// Play button
    pub fn play(&mut self) {
        if self.torn_down || !self.controller.can_export() {
            tracing::debug!("Play ignored in state {:?}", self.controller.state());
            return;
        }

        let result = {
            let chunks = self.controller.chunks();
            self.playback.preview(&chunks)
        };
        match result {
            Ok(_) => self.playback_visible = true,
            Err(e) => tracing::error!(code = e.code(), "Failed to preview recording: {}", e),
        }

        self.publish();
    }

    /// Download button
    pub fn download(&mut self) {
        if self.torn_down || !self.controller.can_export() {
            tracing::debug!("Download ignored in state {:?}", self.controller.state());
            return;
        }

        let chunks = self.controller.chunks();
        if let Err(e) = self.playback.download(&chunks) {
            tracing::error!(code = e.code(), "Failed to download recording: {}", e);
        }
    }

    /// Release every resource the component holds. Runs once; also on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }

        self.controller.teardown();
        self.playback.release();
        self.capture.release();
        self.playback_visible = false;
        self.torn_down = true;
        self.publish();

        tracing::info!("Recorder torn down");
    }

    pub fn state(&self) -> RecordingState {
        self.controller.state()
    }

    pub fn capture_status(&self) -> CaptureStatus {
        self.capture.status()
    }

    pub fn buffered_bytes(&self) -> u64 {
        self.controller.buffered_bytes()
    }

    pub fn chunk_count(&self) -> usize {
        self.controller.chunks().len()
    }

    pub fn last_session(&self) -> Option<RecordingSession> {
        self.controller.last_session()
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    fn publish(&self) {
        let view = self.view();
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}

impl<H: MediaHost> Drop for WebcamRecorder<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

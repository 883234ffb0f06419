//! Recording controller
//!
//! Drives the Idle / Recording / Stopped state machine over the device stream
//! and owns the chunk buffer the recorder session writes into.

use super::chunks::{ChunkBuffer, ChunkSink, SharedChunks};
use super::state::{RecordingSession, RecordingState};
use crate::capture::traits::{MediaHost, RecorderSession};
use crate::utils::error::{AppError, AppResult};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

pub struct RecordingController<H: MediaHost> {
    host: H,

    /// Current recording state
    state: RecordingState,

    /// Active session, or the finished one until the next start or teardown.
    /// Kept so its final flush is still delivered and so it can be
    /// unsubscribed exactly once.
    recorder: Option<H::Recorder>,

    buffer: SharedChunks<H::Blob>,

    /// Metadata of the most recent session
    last_session: Option<RecordingSession>,

    /// Buffer generation the last session wrote under
    session_generation: u64,

    session_count: usize,

    mime_type: Option<String>,

    timeslice_ms: Option<u32>,
}

impl<H: MediaHost> RecordingController<H> {
    pub fn new(host: H, mime_type: Option<String>, timeslice_ms: Option<u32>) -> Self {
        Self {
            host,
            state: RecordingState::Idle,
            recorder: None,
            buffer: Rc::new(RefCell::new(ChunkBuffer::default())),
            last_session: None,
            session_generation: 0,
            session_count: 0,
            mime_type,
            timeslice_ms,
        }
    }

    /// Get the current recording state
    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn can_export(&self) -> bool {
        self.state.can_export()
    }

    /// True between a stop request and the session's final flush
    pub fn is_finalizing(&self) -> bool {
        self.state == RecordingState::Stopped && self.buffer.borrow().is_open()
    }

    /// Start recording a new session on `stream`
    pub fn start(&mut self, stream: &H::Stream) -> AppResult<()> {
        match self.state {
            RecordingState::Recording => return Err(AppError::AlreadyRecording),
            RecordingState::Stopped if self.is_finalizing() => {
                return Err(AppError::StopPending);
            }
            _ => {}
        }

        tracing::info!("Starting recording session {}", self.session_count);

        // Export becomes unavailable immediately, whatever happens next.
        self.state = RecordingState::Idle;
        self.discard_recorder();

        let mut recorder = match self.host.create_recorder(stream, self.mime_type.as_deref()) {
            Ok(recorder) => recorder,
            Err(e) => {
                self.buffer.borrow_mut().abandon();
                return Err(e);
            }
        };

        let generation = self.buffer.borrow_mut().restart();
        recorder.subscribe(ChunkSink::new(Rc::clone(&self.buffer), generation));

        if let Err(e) = recorder.start(self.timeslice_ms) {
            recorder.unsubscribe();
            self.buffer.borrow_mut().abandon();
            return Err(e);
        }

        self.recorder = Some(recorder);
        self.last_session = Some(RecordingSession::new(self.session_count));
        self.session_generation = generation;
        self.session_count += 1;
        self.state = RecordingState::Recording;

        tracing::info!("Recording started");
        Ok(())
    }

    /// Stop recording. Returns false when there was nothing to stop.
    ///
    /// The recorder flushes asynchronously; its last chunk still lands in the
    /// buffer after this returns.
    pub fn stop(&mut self) -> bool {
        if self.state != RecordingState::Recording {
            tracing::debug!("Stop requested while {:?}, ignoring", self.state);
            return false;
        }

        tracing::info!("Stopping recording");

        let stopped = match self.recorder.as_mut() {
            Some(recorder) => recorder.stop(),
            None => Ok(()),
        };
        if let Err(e) = stopped {
            tracing::warn!(code = e.code(), "Recorder did not stop cleanly: {}", e);
            self.buffer.borrow_mut().seal_current();
        }

        let (chunk_count, byte_count) = {
            let buffer = self.buffer.borrow();
            (buffer.len(), buffer.total_bytes())
        };
        if let Some(session) = self.last_session.as_mut() {
            session.end(chunk_count, byte_count);
            tracing::info!(
                "Recording stopped. Session {} lasted {}ms, {} bytes buffered",
                session.index,
                session.duration_ms(),
                byte_count
            );
        }

        self.state = RecordingState::Stopped;
        true
    }

    /// Start when idle or stopped, stop when recording
    pub fn toggle(&mut self, stream: &H::Stream) -> AppResult<RecordingState> {
        if self.state.is_recording() {
            self.stop();
        } else {
            self.start(stream)?;
        }
        Ok(self.state)
    }

    /// Chunks of the last session, in arrival order
    pub fn chunks(&self) -> Ref<'_, [H::Blob]> {
        Ref::map(self.buffer.borrow(), |buffer| buffer.chunks())
    }

    pub fn buffered_bytes(&self) -> u64 {
        self.buffer.borrow().total_bytes()
    }

    /// Metadata of the most recent session. Totals include chunks flushed
    /// after the stop request while that session's buffer is still current.
    pub fn last_session(&self) -> Option<RecordingSession> {
        let mut session = self.last_session.clone()?;
        let buffer = self.buffer.borrow();
        if self.state == RecordingState::Stopped && buffer.generation() == self.session_generation {
            session.chunk_count = buffer.len();
            session.byte_count = buffer.total_bytes();
        }
        Some(session)
    }

    /// Stop any running session and detach its subscription.
    pub fn teardown(&mut self) {
        if self.state.is_recording() {
            self.stop();
        }
        self.discard_recorder();
        self.buffer.borrow_mut().seal_current();
    }

    fn discard_recorder(&mut self) {
        if let Some(mut recorder) = self.recorder.take() {
            recorder.unsubscribe();
        }
    }
}

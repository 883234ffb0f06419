//! Recording state management
//!
//! Defines the recording state machine and session tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current state of the recording system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording made yet, or the last start failed
    #[default]
    Idle,
    /// Currently recording
    Recording,
    /// Recording finished; its chunks can be played back or downloaded
    Stopped,
}

impl RecordingState {
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording)
    }

    /// Play and Download are available only once a recording has stopped.
    pub fn can_export(&self) -> bool {
        matches!(self, RecordingState::Stopped)
    }
}

/// Information about a recording session
///
/// A new session is created each time recording starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSession {
    /// Session index (0, 1, 2, ...)
    pub index: usize,

    pub started_at: DateTime<Utc>,

    /// Set when stop was requested
    pub stopped_at: Option<DateTime<Utc>>,

    pub chunk_count: usize,

    pub byte_count: u64,
}

impl RecordingSession {
    /// Create a new session starting now
    pub fn new(index: usize) -> Self {
        Self {
            index,
            started_at: Utc::now(),
            stopped_at: None,
            chunk_count: 0,
            byte_count: 0,
        }
    }

    /// End the session
    pub fn end(&mut self, chunk_count: usize, byte_count: u64) {
        self.stopped_at = Some(Utc::now());
        self.chunk_count = chunk_count;
        self.byte_count = byte_count;
    }

    /// Duration in milliseconds, up to now while still running
    pub fn duration_ms(&self) -> i64 {
        let end = self.stopped_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds().max(0)
    }
}

//! Capture trait definitions
//!
//! The constraint profile used to open the camera, and the host runtime
//! seams the recorder is written against. The browser implementation lives
//! in `crate::web`; tests use an in-memory host.

use crate::recorder::ChunkSink;
use crate::utils::error::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Video resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Audio side of the constraint profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConstraints {
    /// Require echo cancellation (`{ exact: true }`), not merely prefer it
    #[serde(default = "default_true")]
    pub echo_cancellation: bool,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
        }
    }
}

/// Constraint profile for the device stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    #[serde(default)]
    pub audio: AudioConstraints,

    #[serde(default = "default_video")]
    pub video: Resolution,
}

fn default_true() -> bool {
    true
}

fn default_video() -> Resolution {
    Resolution {
        width: 1280,
        height: 720,
    }
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: AudioConstraints::default(),
            video: default_video(),
        }
    }
}

/// A fragment of encoded media, or an assembled artifact
pub trait RecordedChunk {
    /// Size of the data in bytes
    fn byte_len(&self) -> u64;
}

impl RecordedChunk for Vec<u8> {
    fn byte_len(&self) -> u64 {
        self.len() as u64
    }
}

/// An encode-to-chunks session bound to one device stream
pub trait RecorderSession {
    type Chunk;

    /// Route data notifications to `sink`, replacing any earlier subscriber.
    fn subscribe(&mut self, sink: ChunkSink<Self::Chunk>);

    /// Detach the data and stop notifications.
    fn unsubscribe(&mut self);

    /// Begin capture. With a timeslice the host emits chunks periodically.
    fn start(&mut self, timeslice_ms: Option<u32>) -> AppResult<()>;

    /// Ask the session to flush and finish. Completion is signalled through
    /// [`ChunkSink::finish`].
    fn stop(&mut self) -> AppResult<()>;
}

/// The host runtime's media and DOM capability surface
///
/// Every handle is a cheap reference-counted value, so implementations are
/// `Clone` and may be captured by deferred tasks.
#[async_trait(?Send)]
pub trait MediaHost: Clone + 'static {
    type Stream: Clone;
    type Blob: RecordedChunk + Clone;
    type Recorder: RecorderSession<Chunk = Self::Blob>;
    type Anchor;

    /// Request a live audio/video stream. May prompt the user for permission.
    async fn get_user_media(&self, constraints: &MediaConstraints) -> AppResult<Self::Stream>;

    /// Stop every track of the stream.
    fn stop_stream(&self, stream: &Self::Stream);

    /// Create a recorder for the stream, requesting `mime_type` when supported.
    fn create_recorder(
        &self,
        stream: &Self::Stream,
        mime_type: Option<&str>,
    ) -> AppResult<Self::Recorder>;

    /// Concatenate chunks, in order, into one blob.
    fn assemble(&self, chunks: &[Self::Blob], mime_type: Option<&str>) -> AppResult<Self::Blob>;

    fn create_object_url(&self, blob: &Self::Blob) -> AppResult<String>;

    fn revoke_object_url(&self, url: &str);

    /// Attach the live stream to the preview surface.
    fn bind_live_preview(&self, stream: &Self::Stream);

    /// Point the playback surface at `url`, show its controls and start playing.
    fn bind_playback(&self, url: &str) -> AppResult<()>;

    /// Insert a hidden download anchor for `url` and activate it.
    fn create_download_anchor(&self, url: &str, filename: &str) -> AppResult<Self::Anchor>;

    fn remove_anchor(&self, anchor: Self::Anchor);

    /// Run `task` once after `delay`.
    fn defer(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let constraints = MediaConstraints::default();
        assert!(constraints.audio.echo_cancellation);
        assert_eq!(constraints.video.width, 1280);
        assert_eq!(constraints.video.height, 720);
    }

    #[test]
    fn test_partial_profile_uses_defaults() {
        let constraints: MediaConstraints =
            serde_json::from_str(r#"{ "video": { "width": 640, "height": 480 } }"#).unwrap();
        assert!(constraints.audio.echo_cancellation);
        assert_eq!(
            constraints.video,
            Resolution {
                width: 640,
                height: 480
            }
        );
    }
}

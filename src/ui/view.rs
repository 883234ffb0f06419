//! View state
//!
//! Everything the page shows is derived from the recording state, whether a
//! stream exists, and whether a preview has been played.

use crate::recorder::RecordingState;
use serde::Serialize;

pub const START_LABEL: &str = "Start Recording";
pub const STOP_LABEL: &str = "Stop Recording";
pub const PLAY_LABEL: &str = "Play";
pub const DOWNLOAD_LABEL: &str = "Download";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub state: RecordingState,
    pub live_preview_visible: bool,
    pub playback_visible: bool,
    pub playback_url: Option<String>,
    pub record_button: ButtonView,
    pub play_button: ButtonView,
    pub download_button: ButtonView,
}

impl ViewModel {
    pub fn project(
        state: RecordingState,
        stream_ready: bool,
        playback_visible: bool,
        playback_url: Option<&str>,
    ) -> Self {
        let record_label = if state.is_recording() {
            STOP_LABEL
        } else {
            START_LABEL
        };

        Self {
            state,
            live_preview_visible: stream_ready,
            playback_visible: stream_ready && playback_visible,
            playback_url: playback_url.map(str::to_string),
            record_button: ButtonView {
                label: record_label,
                enabled: stream_ready,
            },
            play_button: ButtonView {
                label: PLAY_LABEL,
                enabled: state.can_export(),
            },
            download_button: ButtonView {
                label: DOWNLOAD_LABEL,
                enabled: state.can_export(),
            },
        }
    }
}

impl Default for ViewModel {
    fn default() -> Self {
        Self::project(RecordingState::Idle, false, false, None)
    }
}

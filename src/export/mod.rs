//! Clip export module
//!
//! Assembles the recorded chunks into a playable object, binds it to the
//! playback surface, or hands it to the browser as a file download.

pub mod playback;
pub mod types;

pub use playback::PlaybackManager;
pub use types::{ExportArtifact, ExportFormat, ObjectUrl};

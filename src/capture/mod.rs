//! Device capture
//!
//! Constraint profile, host runtime seams and the capture manager.

pub mod manager;
pub mod traits;

pub use manager::{CaptureManager, CaptureStatus};
pub use traits::{
    AudioConstraints, MediaConstraints, MediaHost, RecordedChunk, RecorderSession, Resolution,
};

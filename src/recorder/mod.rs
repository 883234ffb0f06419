//! Recording system module
//!
//! - RecordingController drives the Idle / Recording / Stopped state machine
//! - ChunkBuffer accumulates the encoded fragments of the last session
//! - ChunkSink is the write handle a recorder session delivers through

pub mod chunks;
pub mod controller;
pub mod state;

pub use chunks::{ChunkBuffer, ChunkOutcome, ChunkSink, SharedChunks};
pub use controller::RecordingController;
pub use state::{RecordingSession, RecordingState};

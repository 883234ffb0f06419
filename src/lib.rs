//! Webcam Recorder - capture, record and replay webcam clips in the browser.
//!
//! The component logic is written against the [`capture::MediaHost`] trait so
//! it can be driven by the browser (see the `web` module on wasm32) or by an
//! in-memory host in tests.

pub mod capture;
pub mod config;
pub mod export;
pub mod logging;
pub mod recorder;
pub mod ui;
pub mod utils;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(test)]
mod testing;

pub use config::RecorderConfig;
pub use ui::{ViewModel, WebcamRecorder};
pub use utils::error::{AppError, AppResult};

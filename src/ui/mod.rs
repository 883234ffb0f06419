//! Presentation layer
//!
//! The component that owns one recorder instance, and the view state it
//! projects for rendering.

pub mod component;
pub mod view;

pub use component::WebcamRecorder;
pub use view::{ButtonView, ViewModel};

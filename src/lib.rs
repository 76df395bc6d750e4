//! Drive a simulated vehicle with facial gestures captured from a webcam.
//!
//! Mouth open presses the throttle, a frown brakes, tilting the head steers
//! and nodding shifts gears.

pub mod app;
pub mod error;
pub mod face;
pub mod face_detection;
pub mod face_landmarks;
pub mod gesture;
pub mod overlay;
pub mod session;
pub mod settings;
pub mod simulator;
pub mod webcam;

pub use error::{Error, Result};

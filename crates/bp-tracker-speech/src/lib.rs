//! Speech-to-text bridge for spoken blood-pressure readings.
//!
//! This crate adapts a platform speech recognizer to the phrase parser in
//! `bp_tracker_core`. Devices without speech input get a failed preview
//! explaining that voice is unavailable, never a panic.

pub mod hints;
pub mod recognition;

pub use hints::*;
pub use recognition::*;

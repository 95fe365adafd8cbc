//! Error types for the brightness console.

use thiserror::Error;

/// Top-level error surfaced by the binary.
#[derive(Error, Debug)]
pub enum BrightError {
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("brightness sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("window error: {0}")]
    Window(String),
}

/// Camera acquisition errors.
#[derive(Error, Debug)]
pub enum CameraError {
    /// The device could not be opened at all.  Fatal: the loop never
    /// enters Running on this path.
    #[error("camera device {index} unavailable: {reason}")]
    Open { index: u32, reason: String },

    /// No frame was available this tick.  Transient: the tick skips
    /// processing and the loop continues.
    #[error("no frame available: {0}")]
    Grab(String),
}

/// Landmark provider errors.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("failed to start tracker helper: {0}")]
    Spawn(String),

    #[error("tracker protocol error: {0}")]
    Protocol(String),
}

/// Brightness sink errors.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to read brightness: {0}")]
    Read(String),

    #[error("failed to apply brightness: {0}")]
    Apply(String),
}

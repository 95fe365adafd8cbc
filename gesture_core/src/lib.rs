//! # gesture_core
//!
//! Pure gesture-to-control pipeline for the brightness console: the hand
//! landmark data model, the pinch-gesture interpreter, and the clamped
//! linear control mapper.
//!
//! ## Pipeline
//!
//! | Stage | Input | Output |
//! |---|---|---|
//! | Landmark provider (app crate) | camera frame | `Option<HandObservation>` |
//! | [`interpret`] | `Option<&HandObservation>` | [`GestureSample`] |
//! | [`ControlMapper::map`] | [`GestureSample`] | [`ControlUpdate`] |
//!
//! Everything here is a pure function of its inputs: no I/O, no hidden
//! state, no clock.  The app crate owns the camera, the tracker backends,
//! the brightness sink, and the frame loop.

pub mod interpret;
pub mod landmark;
pub mod mapper;

pub use interpret::{interpret, GestureSample};
pub use landmark::{fingers_up, HandObservation, Handedness, Point2, LANDMARK_COUNT};
pub use mapper::{ControlMapper, ControlUpdate};

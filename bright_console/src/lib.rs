//! # bright_console
//!
//! Gesture-driven display-brightness console.  A camera feed is sampled
//! at a fixed cadence; when a hand is seen with thumb and index extended,
//! the distance between the two fingertips is mapped onto a 0–100 %
//! brightness value and applied to the display immediately.  The
//! annotated feed (hand skeleton + brightness readout) is rendered in a
//! window.
//!
//! ## Pipeline (one tick)
//!
//! | Step | Component |
//! |---|---|
//! | Acquire frame | [`camera::CameraSource`] |
//! | Read current brightness (overlay only) | [`sink::BrightnessSink`] |
//! | Detect hand landmarks | [`tracker::LandmarkProvider`] |
//! | Interpret pinch + map to percent | `gesture_core` |
//! | Apply new value (if any) | [`sink::BrightnessSink`] |
//! | Render annotated frame | [`visualizer::Visualizer`] |
//!
//! Ticks never overlap; the loop re-presents the previous frame when
//! acquisition fails and holds the last brightness when no gesture is
//! active.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: a synthetic test-pattern camera and
//!   a mouse-driven pinch (hold the left button, move the cursor).
//! * `camera` — capture real frames from a webcam via `nokhwa`.
//! * `mediapipe` — hand landmarks from the Python helper subprocess
//!   (`scripts/hand_tracker.py`).
//!
//! ### Simulation controls
//!
//! | Input | Meaning |
//! |---|---|
//! | Hold left mouse button | Pinch active; cursor distance from frame centre = pinch width |
//! | `Escape` / close window | Quit |

pub mod app;
pub mod camera;
pub mod error;
pub mod sink;
pub mod tracker;
pub mod visualizer;

//! The frame-loop driver.
//!
//! `FrameLoop` owns the three collaborators (camera, landmark provider,
//! brightness sink) plus the pure mapping pipeline, and advances one
//! tick at a time: acquire → interpret → map → apply.  `run` wraps it
//! with the window, rendering, and the fixed-cadence scheduling.

use std::sync::mpsc;
use std::time::Duration;

use gesture_core::{interpret, ControlMapper, ControlUpdate, HandObservation};

use crate::camera::{CameraSource, Frame};
#[cfg(not(feature = "camera"))]
use crate::camera::SyntheticCamera;
#[cfg(feature = "camera")]
use crate::camera::NokhwaCamera;
use crate::error::BrightError;
use crate::sink::{open_sink, BrightnessSink};
use crate::tracker::{LandmarkProvider, SimPointer, TrackerConfig};
#[cfg(feature = "mediapipe")]
use crate::tracker::MediaPipeTracker;
#[cfg(not(feature = "mediapipe"))]
use crate::tracker::SimTracker;
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.  All values are fixed at
/// startup; invocation stays parameterless.
pub struct AppConfig {
    /// Camera device index (feature `camera`).
    pub device_index: u32,
    /// Frame size for the synthetic camera (the real camera reports its
    /// own).
    pub frame_width: usize,
    pub frame_height: usize,
    /// Fixed delay between ticks.  Not drift-corrected.
    pub tick_delay: Duration,
    pub tracker: TrackerConfig,
    pub mapper: ControlMapper,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            device_index: 0,
            frame_width: 640,
            frame_height: 480,
            tick_delay: Duration::from_millis(15),
            tracker: TrackerConfig::default(),
            mapper: ControlMapper::default(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Loop state
// ════════════════════════════════════════════════════════════════════════════

/// The driver's two states.  `Stopped` is terminal: entered when the
/// window closes (or Escape), it preempts scheduling of further ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

// ════════════════════════════════════════════════════════════════════════════
// TickReport
// ════════════════════════════════════════════════════════════════════════════

/// What one tick produced, handed to the renderer.
pub struct TickReport {
    /// The acquired frame, or `None` on a transient grab failure (the
    /// renderer re-presents the previous buffer).
    pub frame: Option<Frame>,
    pub observation: Option<HandObservation>,
    /// The percentage forwarded to the sink this tick, if the gesture
    /// produced one.
    pub applied: Option<f32>,
    /// Last brightness read from the sink, for overlay text only.
    pub overlay_pct: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameLoop
// ════════════════════════════════════════════════════════════════════════════

pub struct FrameLoop<C, T, S> {
    camera: C,
    tracker: T,
    sink: S,
    mapper: ControlMapper,
    /// Last value read from the sink.  Display state only; mapping is
    /// always derived fresh from the gesture, never from this.
    overlay_pct: f32,
}

impl<C, T, S> FrameLoop<C, T, S>
where
    C: CameraSource,
    T: LandmarkProvider,
    S: BrightnessSink,
{
    pub fn new(camera: C, tracker: T, mut sink: S, mapper: ControlMapper) -> Self {
        let overlay_pct = sink.current().unwrap_or(0.0);
        FrameLoop {
            camera,
            tracker,
            sink,
            mapper,
            overlay_pct,
        }
    }

    /// Advance one tick: acquire → read brightness → detect → interpret
    /// → map → apply.  Rendering and scheduling live in [`run`].
    ///
    /// * Grab failure → skip interpretation and mapping entirely, keep
    ///   the loop alive.
    /// * No valid gesture → `NoChange`, the sink is not touched.
    /// * Sink rejection → logged, not retried; the next tick tries again
    ///   naturally if the gesture persists.
    pub fn tick(&mut self) -> TickReport {
        let frame = match self.camera.grab() {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!("transient acquisition failure: {}", e);
                return TickReport {
                    frame: None,
                    observation: None,
                    applied: None,
                    overlay_pct: self.overlay_pct,
                };
            }
        };

        // Read-only brightness query for the overlay.
        match self.sink.current() {
            Ok(p) => self.overlay_pct = p,
            Err(e) => tracing::debug!("brightness read failed, overlay stale: {}", e),
        }

        let observation = self.tracker.detect(&frame);
        let sample = interpret(observation.as_ref());

        let applied = match self.mapper.map(sample) {
            ControlUpdate::Set(pct) => {
                // Apply immediately; force bypasses any OS fade.
                if let Err(e) = self.sink.apply(pct, true) {
                    tracing::warn!("brightness apply rejected: {}", e);
                }
                Some(pct)
            }
            ControlUpdate::NoChange => None,
        };

        TickReport {
            frame: Some(frame),
            observation,
            applied,
            overlay_pct: self.overlay_pct,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application: open the collaborators for the enabled
/// features, then drive tick + render at the configured cadence until
/// the window closes.
///
/// A camera that cannot be opened is fatal here, before the loop ever
/// enters `Running`; its handle (if any) is released on that path too.
pub fn run(config: AppConfig) -> Result<(), BrightError> {
    // ── Sim pointer channel (visualizer → sim tracker) ────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimPointer>();

    // ── Camera ────────────────────────────────────────────────────────────
    #[cfg(feature = "camera")]
    let camera = NokhwaCamera::open(config.device_index)?;
    #[cfg(not(feature = "camera"))]
    let camera = SyntheticCamera::new(config.frame_width, config.frame_height);

    // ── Landmark provider ─────────────────────────────────────────────────
    #[cfg(feature = "mediapipe")]
    let tracker = {
        drop(sim_rx); // pointer events are ignored in hardware mode
        MediaPipeTracker::spawn(config.tracker)?
    };
    #[cfg(not(feature = "mediapipe"))]
    let tracker = SimTracker::new(sim_rx);

    // ── Brightness sink (probes hardware, falls back to null) ─────────────
    let sink = open_sink();

    // ── Window ────────────────────────────────────────────────────────────
    let mut vis = Visualizer::new(
        camera.width(),
        camera.height(),
        config.tick_delay,
        sim_tx,
    )?;

    let mut frame_loop = FrameLoop::new(camera, tracker, sink, config.mapper);

    // ── Main loop — one mutable cursor of execution, no overlapping ticks ─
    let mut state = LoopState::Running;
    while state == LoopState::Running {
        if !vis.is_open() || !vis.poll_input() {
            state = LoopState::Stopped;
            continue;
        }

        let report = frame_loop.tick();
        vis.render(
            report.frame.as_ref(),
            report.observation.as_ref(),
            report.overlay_pct,
        );
    }

    tracing::info!("window closed, loop stopped");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CameraError, SinkError};
    use gesture_core::{
        landmark::{idx, LANDMARK_COUNT},
        GestureSample, Handedness, Point2,
    };
    use std::collections::VecDeque;

    // ── Fakes ─────────────────────────────────────────────────────────────

    struct ScriptedCamera {
        /// One entry per tick: a frame, or a transient failure.
        script: VecDeque<Option<Frame>>,
    }

    impl ScriptedCamera {
        fn frames(n: usize) -> Self {
            let frame = Frame::new(4, 4, vec![0; 48]);
            ScriptedCamera {
                script: (0..n).map(|_| Some(frame.clone())).collect(),
            }
        }
    }

    impl CameraSource for ScriptedCamera {
        fn grab(&mut self) -> Result<Frame, CameraError> {
            match self.script.pop_front() {
                Some(Some(f)) => Ok(f),
                _ => Err(CameraError::Grab("scripted miss".into())),
            }
        }
        fn width(&self) -> usize {
            4
        }
        fn height(&self) -> usize {
            4
        }
    }

    struct ScriptedTracker {
        script: VecDeque<Option<HandObservation>>,
        calls: usize,
    }

    impl LandmarkProvider for ScriptedTracker {
        fn detect(&mut self, _frame: &Frame) -> Option<HandObservation> {
            self.calls += 1;
            self.script.pop_front().flatten()
        }
    }

    struct RecordingSink {
        current: f32,
        fail_apply: bool,
        applied: Vec<(f32, bool)>,
        apply_attempts: usize,
    }

    impl RecordingSink {
        fn at(current: f32) -> Self {
            RecordingSink {
                current,
                fail_apply: false,
                applied: Vec::new(),
                apply_attempts: 0,
            }
        }
    }

    impl BrightnessSink for RecordingSink {
        fn current(&mut self) -> Result<f32, SinkError> {
            Ok(self.current)
        }
        fn apply(&mut self, percent: f32, force: bool) -> Result<(), SinkError> {
            self.apply_attempts += 1;
            if self.fail_apply {
                return Err(SinkError::Apply("scripted rejection".into()));
            }
            self.applied.push((percent, force));
            self.current = percent;
            Ok(())
        }
    }

    fn pinch_observation(distance: f32) -> HandObservation {
        let mut landmarks = [Point2::default(); LANDMARK_COUNT];
        landmarks[idx::THUMB_TIP] = Point2::new(50.0, 50.0);
        landmarks[idx::INDEX_TIP] = Point2::new(50.0 + distance, 50.0);
        HandObservation {
            landmarks,
            fingers: [true, true, false, false, false],
            handedness: Handedness::Right,
        }
    }

    fn frame_loop(
        camera: ScriptedCamera,
        tracker: ScriptedTracker,
        sink: RecordingSink,
    ) -> FrameLoop<ScriptedCamera, ScriptedTracker, RecordingSink> {
        FrameLoop::new(camera, tracker, sink, ControlMapper::default())
    }

    // ── End-to-end scenarios ──────────────────────────────────────────────

    #[test]
    fn pinch_100px_sets_expected_brightness() {
        let tracker = ScriptedTracker {
            script: VecDeque::from([Some(pinch_observation(100.0))]),
            calls: 0,
        };
        let mut fl = frame_loop(ScriptedCamera::frames(1), tracker, RecordingSink::at(50.0));

        let report = fl.tick();

        // (100 - 10) / 280 * 100 ≈ 32.142857
        let expect = (100.0 - 10.0) / 280.0 * 100.0;
        assert!((report.applied.unwrap() - expect).abs() < 1e-4);
        assert_eq!(fl.sink.applied.len(), 1);
        let (pct, force) = fl.sink.applied[0];
        assert!((pct - expect).abs() < 1e-4);
        assert!(force, "apply must bypass the OS fade");
    }

    #[test]
    fn five_empty_ticks_never_touch_the_sink() {
        let tracker = ScriptedTracker {
            script: VecDeque::from(vec![None; 5]),
            calls: 0,
        };
        let mut fl = frame_loop(ScriptedCamera::frames(5), tracker, RecordingSink::at(47.0));

        for _ in 0..5 {
            let report = fl.tick();
            assert!(report.applied.is_none());
            // Overlay keeps showing the value from the read, not a reset.
            assert_eq!(report.overlay_pct, 47.0);
        }
        assert_eq!(fl.sink.apply_attempts, 0);
    }

    #[test]
    fn grab_failure_skips_detection_and_mapping() {
        let tracker = ScriptedTracker {
            script: VecDeque::from([Some(pinch_observation(200.0))]),
            calls: 0,
        };
        let mut fl = frame_loop(
            ScriptedCamera {
                script: VecDeque::new(), // every grab misses
            },
            tracker,
            RecordingSink::at(60.0),
        );

        let report = fl.tick();

        assert!(report.frame.is_none());
        assert!(report.applied.is_none());
        assert_eq!(fl.tracker.calls, 0, "tracker must not run without a frame");
        assert_eq!(fl.sink.apply_attempts, 0);
        // Overlay still carries the value seeded at startup.
        assert_eq!(report.overlay_pct, 60.0);
    }

    #[test]
    fn loop_recovers_after_transient_miss() {
        let frame = Frame::new(4, 4, vec![0; 48]);
        let camera = ScriptedCamera {
            script: VecDeque::from([None, Some(frame)]),
        };
        let tracker = ScriptedTracker {
            script: VecDeque::from([Some(pinch_observation(290.0))]),
            calls: 0,
        };
        let mut fl = frame_loop(camera, tracker, RecordingSink::at(10.0));

        assert!(fl.tick().applied.is_none());
        let report = fl.tick();
        assert!((report.applied.unwrap() - 100.0).abs() < 1e-4);
    }

    #[test]
    fn sink_rejection_is_not_retried_within_a_tick() {
        let tracker = ScriptedTracker {
            script: VecDeque::from([Some(pinch_observation(150.0))]),
            calls: 0,
        };
        let mut sink = RecordingSink::at(50.0);
        sink.fail_apply = true;
        let mut fl = frame_loop(ScriptedCamera::frames(1), tracker, sink);

        let report = fl.tick();

        assert_eq!(fl.sink.apply_attempts, 1);
        assert!(fl.sink.applied.is_empty());
        // The tick still completes and reports the value it forwarded.
        assert!(report.applied.is_some());
    }

    #[test]
    fn folded_fingers_hold_the_previous_value() {
        let mut folded = pinch_observation(250.0);
        folded.fingers = [true, false, true, true, true];
        let tracker = ScriptedTracker {
            script: VecDeque::from([Some(pinch_observation(150.0)), Some(folded)]),
            calls: 0,
        };
        let mut fl = frame_loop(ScriptedCamera::frames(2), tracker, RecordingSink::at(0.0));

        let first = fl.tick();
        assert!((first.applied.unwrap() - 50.0).abs() < 1e-4);

        let second = fl.tick();
        assert!(second.applied.is_none());
        assert_eq!(fl.sink.applied.len(), 1, "no second write, value held");
    }

    #[test]
    fn applied_values_stay_within_bounds() {
        let tracker = ScriptedTracker {
            script: VecDeque::from([
                Some(pinch_observation(0.0)),
                Some(pinch_observation(5000.0)),
            ]),
            calls: 0,
        };
        let mut fl = frame_loop(ScriptedCamera::frames(2), tracker, RecordingSink::at(50.0));

        assert_eq!(fl.tick().applied.unwrap(), 0.0);
        assert_eq!(fl.tick().applied.unwrap(), 100.0);
        for &(pct, _) in &fl.sink.applied {
            assert!((0.0..=100.0).contains(&pct));
        }
    }

    #[test]
    fn mapping_never_reads_back_its_own_write() {
        // Two identical pinches must map identically even though the
        // first one changed the sink's value in between.
        let tracker = ScriptedTracker {
            script: VecDeque::from([
                Some(pinch_observation(150.0)),
                Some(pinch_observation(150.0)),
            ]),
            calls: 0,
        };
        let mut fl = frame_loop(ScriptedCamera::frames(2), tracker, RecordingSink::at(5.0));

        let a = fl.tick().applied.unwrap();
        let b = fl.tick().applied.unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn interpreter_sample_matches_mapper_input() {
        // Sanity on the shared pipeline types.
        let obs = pinch_observation(150.0);
        let sample = interpret(Some(&obs));
        assert_eq!(
            sample,
            GestureSample {
                distance_px: 150.0,
                valid: true
            }
        );
    }
}

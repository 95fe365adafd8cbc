//! Hand landmark providers — the MediaPipe helper subprocess
//! (feature = "mediapipe") or a mouse-driven simulation.
//!
//! The frame loop only sees the [`LandmarkProvider`] trait; it does not
//! know whether observations come from a real tracker or the simulator.

use std::sync::mpsc::Receiver;

#[cfg(any(feature = "mediapipe", test))]
use gesture_core::fingers_up;
use gesture_core::{
    landmark::{idx, LANDMARK_COUNT},
    HandObservation, Handedness, Point2,
};

use crate::camera::Frame;
#[cfg(feature = "mediapipe")]
use crate::error::TrackerError;

// ════════════════════════════════════════════════════════════════════════════
// TrackerConfig
// ════════════════════════════════════════════════════════════════════════════

/// Tracker parameters, fixed at startup.
#[derive(Clone, Copy, Debug)]
pub struct TrackerConfig {
    /// Minimum detection confidence (0.0–1.0).
    pub confidence: f32,
    /// Maximum hands tracked.  This core runs single-hand.
    pub max_hands: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            confidence: 0.5,
            max_hands: 1,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkProvider trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can turn a frame into zero or one hand observation.
///
/// `None` covers both "no hand in frame" and "malformed reply": a
/// detection the provider cannot fully validate fails open as no hand,
/// so the control value holds.
pub trait LandmarkProvider {
    fn detect(&mut self, frame: &Frame) -> Option<HandObservation>;
}

// ════════════════════════════════════════════════════════════════════════════
// SimTracker — mouse-driven pinch (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Pointer state sampled by the visualizer's input polling each tick.
#[derive(Clone, Copy, Debug)]
pub struct SimPointer {
    pub x: f32,
    pub y: f32,
    /// Left mouse button held = pinch gesture active.
    pub pinch: bool,
}

/// Landmark provider driven by [`SimPointer`] events from the window.
///
/// While the button is held it synthesizes a plausible 21-point hand:
/// thumb tip pinned at the frame centre, index tip following the cursor,
/// remaining fingers folded.  The pinch width therefore equals the
/// cursor's distance from the centre, which exercises the full mapping
/// range without any tracking hardware.
pub struct SimTracker {
    rx: Receiver<SimPointer>,
    last: Option<SimPointer>,
}

impl SimTracker {
    pub fn new(rx: Receiver<SimPointer>) -> Self {
        SimTracker { rx, last: None }
    }
}

impl LandmarkProvider for SimTracker {
    fn detect(&mut self, frame: &Frame) -> Option<HandObservation> {
        // Keep only the freshest pointer sample.
        while let Ok(p) = self.rx.try_recv() {
            self.last = Some(p);
        }

        let pointer = self.last?;
        if !pointer.pinch {
            return None;
        }

        let w = frame.width as f32;
        let h = frame.height as f32;
        let thumb_tip = Point2::new(w / 2.0, h / 2.0);
        let index_tip = Point2::new(pointer.x.clamp(0.0, w - 1.0), pointer.y.clamp(0.0, h - 1.0));
        Some(synthesize_hand(thumb_tip, index_tip, h))
    }
}

/// Build a synthetic observation around the two pinch tips.  The other
/// three fingers are folded; only the skeleton overlay looks at their
/// positions.
fn synthesize_hand(thumb_tip: Point2, index_tip: Point2, frame_h: f32) -> HandObservation {
    let mut lm = [Point2::default(); LANDMARK_COUNT];

    let wrist = Point2::new(
        (thumb_tip.x + index_tip.x) / 2.0,
        ((thumb_tip.y + index_tip.y) / 2.0 + 120.0).min(frame_h - 1.0),
    );
    lm[idx::WRIST] = wrist;

    let lerp = |a: Point2, b: Point2, t: f32| {
        Point2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    };

    // Thumb chain 1..4, index chain 5..8.
    for (j, t) in [(1, 0.3), (2, 0.55), (3, 0.8)] {
        lm[j] = lerp(wrist, thumb_tip, t);
    }
    lm[idx::THUMB_TIP] = thumb_tip;
    for (j, t) in [(5, 0.3), (6, 0.55), (7, 0.8)] {
        lm[j] = lerp(wrist, index_tip, t);
    }
    lm[idx::INDEX_TIP] = index_tip;

    // Middle/ring/pinky folded: joints rise from the knuckle row, tips
    // curl back below their PIPs.
    for (f, base) in [(0usize, 9usize), (1, 13), (2, 17)] {
        let knuckle = Point2::new(wrist.x + 14.0 * (f as f32 + 1.0), wrist.y - 40.0);
        lm[base] = knuckle;
        lm[base + 1] = Point2::new(knuckle.x, knuckle.y - 18.0);
        lm[base + 2] = Point2::new(knuckle.x + 4.0, knuckle.y - 8.0);
        lm[base + 3] = Point2::new(knuckle.x + 6.0, knuckle.y + 2.0);
    }

    HandObservation {
        landmarks: lm,
        fingers: [true, true, false, false, false],
        handedness: Handedness::Right,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MediaPipeTracker — Python helper subprocess (feature = "mediapipe")
// ════════════════════════════════════════════════════════════════════════════

/// One hand in the helper's JSON reply.  Landmark coordinates are
/// normalized to 0.0–1.0 of the frame.
#[cfg(any(feature = "mediapipe", test))]
#[derive(Debug, serde::Deserialize)]
struct WireHand {
    handedness: Handedness,
    score: f32,
    landmarks: Vec<WireLandmark>,
}

#[cfg(any(feature = "mediapipe", test))]
#[derive(Debug, serde::Deserialize)]
struct WireLandmark {
    x: f32,
    y: f32,
    #[serde(default)]
    #[allow(dead_code)]
    z: f32,
}

#[cfg(any(feature = "mediapipe", test))]
#[derive(Debug, serde::Deserialize)]
struct WireReply {
    hands: Vec<WireHand>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse one JSON reply line into an observation.
///
/// Fail-open contract: anything the helper sends that cannot be fully
/// validated — unparsable JSON, a reported error, a wrong landmark
/// count, non-finite coordinates, a sub-threshold score — degrades to
/// `None`, i.e. "no hand this tick", so the control value holds.
#[cfg(any(feature = "mediapipe", test))]
fn parse_reply(
    line: &str,
    frame_w: usize,
    frame_h: usize,
    config: TrackerConfig,
) -> Option<HandObservation> {
    let reply: WireReply = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("tracker reply unparsable: {}", e);
            return None;
        }
    };
    if let Some(err) = reply.error {
        tracing::warn!("tracker helper error: {}", err);
        return None;
    }

    // Single-hand mode: first sufficiently confident hand only.
    let hand = reply
        .hands
        .into_iter()
        .find(|h| h.score >= config.confidence)?;

    if hand.landmarks.len() != LANDMARK_COUNT {
        tracing::warn!(
            "tracker reply malformed: {} landmarks (expected {})",
            hand.landmarks.len(),
            LANDMARK_COUNT
        );
        return None;
    }

    let mut landmarks = [Point2::default(); LANDMARK_COUNT];
    for (i, wl) in hand.landmarks.iter().enumerate() {
        if !wl.x.is_finite() || !wl.y.is_finite() {
            tracing::warn!("tracker reply malformed: non-finite landmark {}", i);
            return None;
        }
        landmarks[i] = Point2::new(wl.x * frame_w as f32, wl.y * frame_h as f32);
    }

    let fingers = fingers_up(&landmarks, hand.handedness);

    Some(HandObservation {
        landmarks,
        fingers,
        handedness: hand.handedness,
    })
}

/// Landmark provider backed by `scripts/hand_tracker.py`.
///
/// Protocol, one exchange per frame:
/// * request — a `W H\n` header line followed by `W*H*3` raw RGB bytes;
/// * reply — one JSON line: `{"hands": [{handedness, score, landmarks}]}`.
///
/// Any malformed reply is logged and treated as no hand this tick.
#[cfg(feature = "mediapipe")]
pub struct MediaPipeTracker {
    child: std::process::Child,
    stdin: std::process::ChildStdin,
    reader: std::io::BufReader<std::process::ChildStdout>,
    config: TrackerConfig,
}

#[cfg(feature = "mediapipe")]
impl MediaPipeTracker {
    pub fn spawn(config: TrackerConfig) -> Result<Self, TrackerError> {
        use std::process::{Command, Stdio};

        let mut child = Command::new("python3")
            .arg("scripts/hand_tracker.py")
            .arg("--confidence")
            .arg(config.confidence.to_string())
            .arg("--max-hands")
            .arg(config.max_hands.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| TrackerError::Spawn(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TrackerError::Spawn("helper stdin not piped".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TrackerError::Spawn("helper stdout not piped".into()))?;

        tracing::info!(
            "hand tracker helper started (confidence {}, max hands {})",
            config.confidence,
            config.max_hands
        );

        Ok(MediaPipeTracker {
            child,
            stdin,
            reader: std::io::BufReader::new(stdout),
            config,
        })
    }

    fn exchange(&mut self, frame: &Frame) -> Result<String, TrackerError> {
        use std::io::{BufRead, Write};

        writeln!(self.stdin, "{} {}", frame.width, frame.height)
            .and_then(|_| self.stdin.write_all(&frame.data))
            .and_then(|_| self.stdin.flush())
            .map_err(|e| TrackerError::Protocol(format!("write: {}", e)))?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| TrackerError::Protocol(format!("read: {}", e)))?;
        if line.is_empty() {
            return Err(TrackerError::Protocol("helper closed its stdout".into()));
        }
        Ok(line)
    }

}

#[cfg(feature = "mediapipe")]
impl LandmarkProvider for MediaPipeTracker {
    fn detect(&mut self, frame: &Frame) -> Option<HandObservation> {
        match self.exchange(frame) {
            Ok(line) => parse_reply(&line, frame.width, frame.height, self.config),
            Err(e) => {
                // Fail open: a dropped exchange is this tick's "no hand".
                tracing::warn!("{}", e);
                None
            }
        }
    }
}

#[cfg(feature = "mediapipe")]
impl Drop for MediaPipeTracker {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

//! Pinch-gesture interpretation.
//!
//! Decides whether the "measure distance" gesture is active and, if so,
//! how far apart the thumb and index fingertips are.  Gating is
//! deliberately permissive: only the thumb and index flags are examined,
//! the remaining fingers may be in any state.

use crate::landmark::HandObservation;

// ════════════════════════════════════════════════════════════════════════════
// GestureSample
// ════════════════════════════════════════════════════════════════════════════

/// The per-tick gesture reading.
///
/// `valid` is true only when a hand was observed with thumb and index
/// both extended; `distance_px` is meaningful only then.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSample {
    pub distance_px: f32,
    pub valid: bool,
}

impl GestureSample {
    pub const INVALID: GestureSample = GestureSample {
        distance_px: 0.0,
        valid: false,
    };
}

// ════════════════════════════════════════════════════════════════════════════
// interpret
// ════════════════════════════════════════════════════════════════════════════

/// Interpret one tick's observation.  Pure function, no side effects.
///
/// * No observation → invalid sample (the caller holds its last value).
/// * Thumb or index folded → invalid sample.
/// * Both extended → valid sample carrying the thumb-tip↔index-tip
///   Euclidean distance in pixels.  Coincident tips give distance 0 and
///   the sample is still valid; the mapper owns the zero boundary.
/// * Non-finite tip coordinates are a tracker contract violation and
///   degrade to an invalid sample rather than poisoning the mapper.
pub fn interpret(observation: Option<&HandObservation>) -> GestureSample {
    let obs = match observation {
        Some(o) => o,
        None => return GestureSample::INVALID,
    };

    // Gating fingers: thumb and index.  Middle/ring/pinky are ignored.
    if !(obs.fingers[0] && obs.fingers[1]) {
        return GestureSample::INVALID;
    }

    let thumb = obs.thumb_tip();
    let index = obs.index_tip();
    if !thumb.is_finite() || !index.is_finite() {
        return GestureSample::INVALID;
    }

    GestureSample {
        distance_px: thumb.distance_to(index),
        valid: true,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

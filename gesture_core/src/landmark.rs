//! Hand landmark data model.
//!
//! Follows the MediaPipe 21-point hand convention: landmark 0 is the
//! wrist, then four joints per finger running thumb → pinky, base → tip.
//! Coordinates are in pixel space of the frame the hand was detected in.

use serde::Deserialize;

/// Number of landmarks in one hand observation.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices (MediaPipe hand model numbering).
pub mod idx {
    pub const WRIST: usize = 0;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;
}

// ════════════════════════════════════════════════════════════════════════════
// Point2
// ════════════════════════════════════════════════════════════════════════════

/// A 2D point in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Point2 { x, y }
    }

    /// Euclidean distance to another point.  Always ≥ 0.
    pub fn distance_to(&self, other: Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

/// Which hand the observation belongs to, as reported by the tracker.
/// Deserializes from the helper's `"Left"` / `"Right"` labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

// ════════════════════════════════════════════════════════════════════════════
// HandObservation
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand: 21 landmark points plus per-finger extension flags
/// (thumb, index, middle, ring, pinky).
///
/// Produced fresh each tick by a landmark provider and never mutated.
/// At most one observation exists per tick (single-hand mode).
#[derive(Clone, Debug)]
pub struct HandObservation {
    pub landmarks: [Point2; LANDMARK_COUNT],
    pub fingers: [bool; 5],
    pub handedness: Handedness,
}

impl HandObservation {
    pub fn thumb_tip(&self) -> Point2 {
        self.landmarks[idx::THUMB_TIP]
    }

    pub fn index_tip(&self) -> Point2 {
        self.landmarks[idx::INDEX_TIP]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// fingers_up
// ════════════════════════════════════════════════════════════════════════════

/// Derive per-finger extension flags from landmark geometry.
///
/// Image coordinates have y growing downward, so a finger counts as
/// extended when its tip sits above its PIP joint.  The thumb extends
/// sideways: its tip is compared against the IP joint along x, mirrored
/// by handedness (the frame is assumed unmirrored, tracker-side flipping
/// already applied).
///
/// Backends whose wire format carries only landmarks use this to fill
/// [`HandObservation::fingers`]; synthetic backends set flags directly.
pub fn fingers_up(landmarks: &[Point2; LANDMARK_COUNT], handedness: Handedness) -> [bool; 5] {
    let thumb = match handedness {
        Handedness::Right => landmarks[idx::THUMB_TIP].x > landmarks[idx::THUMB_IP].x,
        Handedness::Left => landmarks[idx::THUMB_TIP].x < landmarks[idx::THUMB_IP].x,
    };

    // (tip, pip) pairs for index..pinky
    let pairs = [
        (idx::INDEX_TIP, idx::INDEX_PIP),
        (idx::MIDDLE_TIP, idx::MIDDLE_PIP),
        (idx::RING_TIP, idx::RING_PIP),
        (idx::PINKY_TIP, idx::PINKY_PIP),
    ];

    let mut flags = [thumb, false, false, false, false];
    for (i, (tip, pip)) in pairs.iter().enumerate() {
        flags[i + 1] = landmarks[*tip].y < landmarks[*pip].y;
    }
    flags
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_hand() -> [Point2; LANDMARK_COUNT] {
        // Wrist at the bottom, all tips above their PIPs, thumb tip to the
        // left of its IP (a left hand with everything extended).
        let mut lm = [Point2::default(); LANDMARK_COUNT];
        lm[idx::WRIST] = Point2::new(100.0, 200.0);
        lm[idx::THUMB_IP] = Point2::new(60.0, 150.0);
        lm[idx::THUMB_TIP] = Point2::new(40.0, 140.0);
        for &(tip, pip) in &[
            (idx::INDEX_TIP, idx::INDEX_PIP),
            (idx::MIDDLE_TIP, idx::MIDDLE_PIP),
            (idx::RING_TIP, idx::RING_PIP),
            (idx::PINKY_TIP, idx::PINKY_PIP),
        ] {
            lm[pip] = Point2::new(100.0, 120.0);
            lm[tip] = Point2::new(100.0, 80.0);
        }
        lm
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn distance_of_coincident_points_is_zero() {
        let p = Point2::new(42.0, 17.0);
        assert_eq!(p.distance_to(p), 0.0);
    }

    #[test]
    fn all_fingers_up_on_open_hand() {
        let lm = flat_hand();
        // Thumb tip x < IP x → extended for a left hand.
        assert_eq!(fingers_up(&lm, Handedness::Left), [true; 5]);
    }

    #[test]
    fn curled_index_is_down() {
        let mut lm = flat_hand();
        lm[idx::INDEX_TIP] = Point2::new(100.0, 160.0); // below its PIP
        let flags = fingers_up(&lm, Handedness::Left);
        assert!(!flags[1]);
        assert!(flags[2] && flags[3] && flags[4]);
    }

    #[test]
    fn thumb_mirrors_with_handedness() {
        let lm = flat_hand();
        assert!(fingers_up(&lm, Handedness::Left)[0]);
        assert!(!fingers_up(&lm, Handedness::Right)[0]);
    }
}

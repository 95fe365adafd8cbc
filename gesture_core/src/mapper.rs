//! Distance → percentage control mapping.
//!
//! Clamped linear interpolation from a pixel-distance domain onto a
//! percentage range, with an explicit hold-last-value outcome for ticks
//! without a valid gesture.

use crate::interpret::GestureSample;

// ════════════════════════════════════════════════════════════════════════════
// ControlUpdate
// ════════════════════════════════════════════════════════════════════════════

/// Outcome of mapping one gesture sample.
///
/// `NoChange` is a stated policy, not an omitted call: a tick without a
/// valid gesture must leave the previous control value untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlUpdate {
    /// Apply this percentage (always within the mapper's range).
    Set(f32),
    /// Hold the last applied value.
    NoChange,
}

// ════════════════════════════════════════════════════════════════════════════
// ControlMapper
// ════════════════════════════════════════════════════════════════════════════

/// Maps raw pinch distances onto a bounded percentage.
///
/// Distances below `domain.0` saturate to `range.0`, above `domain.1` to
/// `range.1`, so gesture imprecision near the extremes does not need to
/// be pixel-exact.  Output is never rounded here; rounding belongs at the
/// presentation boundary only.
#[derive(Clone, Copy, Debug)]
pub struct ControlMapper {
    /// Input distance bounds in pixels (low, high).
    pub domain: (f32, f32),
    /// Output bounds in percent (low, high).
    pub range: (f32, f32),
}

impl Default for ControlMapper {
    fn default() -> Self {
        ControlMapper {
            domain: (10.0, 290.0),
            range: (0.0, 100.0),
        }
    }
}

impl ControlMapper {
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Self {
        ControlMapper { domain, range }
    }

    /// Map one sample.  Invalid samples hold the last value.
    pub fn map(&self, sample: GestureSample) -> ControlUpdate {
        if !sample.valid {
            return ControlUpdate::NoChange;
        }
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = ((sample.distance_px - d0) / (d1 - d0)).clamp(0.0, 1.0);
        ControlUpdate::Set(r0 + t * (r1 - r0))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn valid(d: f32) -> GestureSample {
        GestureSample {
            distance_px: d,
            valid: true,
        }
    }

    fn mapped(d: f32) -> f32 {
        match ControlMapper::default().map(valid(d)) {
            ControlUpdate::Set(p) => p,
            ControlUpdate::NoChange => panic!("valid sample must produce Set"),
        }
    }

    #[test]
    fn saturates_below_domain() {
        for d in [0.0, 5.0, 9.99] {
            assert_eq!(mapped(d), 0.0);
        }
    }

    #[test]
    fn saturates_above_domain() {
        for d in [290.01, 400.0, 10_000.0] {
            assert_eq!(mapped(d), 100.0);
        }
    }

    #[test]
    fn boundary_values() {
        assert!((mapped(10.0) - 0.0).abs() < EPS);
        assert!((mapped(290.0) - 100.0).abs() < EPS);
        assert!((mapped(150.0) - 50.0).abs() < EPS);
    }

    #[test]
    fn interior_is_linear() {
        // (d - 10) / 280 * 100 within tolerance
        for d in [20.0, 100.0, 137.0, 250.0] {
            let expect = (d - 10.0) / 280.0 * 100.0;
            assert!((mapped(d) - expect).abs() < EPS, "d={}", d);
        }
    }

    #[test]
    fn monotone_non_decreasing() {
        let mut prev = mapped(0.0);
        let mut d = 0.0;
        while d <= 300.0 {
            let cur = mapped(d);
            assert!(cur >= prev, "d={}", d);
            prev = cur;
            d += 1.0;
        }
    }

    #[test]
    fn invalid_sample_holds() {
        let mapper = ControlMapper::default();
        assert_eq!(mapper.map(GestureSample::INVALID), ControlUpdate::NoChange);
    }

    #[test]
    fn mapping_is_idempotent() {
        let mapper = ControlMapper::default();
        let s = valid(123.4);
        assert_eq!(mapper.map(s), mapper.map(s));
    }

    #[test]
    fn zero_distance_maps_to_range_floor() {
        assert_eq!(mapped(0.0), 0.0);
    }

    #[test]
    fn output_stays_within_range() {
        for d in [-50.0, 0.0, 10.0, 150.0, 290.0, 1e6] {
            let p = mapped(d);
            assert!((0.0..=100.0).contains(&p), "d={} p={}", d, p);
        }
    }

    #[test]
    fn custom_domain_and_range() {
        let mapper = ControlMapper::new((0.0, 200.0), (20.0, 80.0));
        match mapper.map(valid(100.0)) {
            ControlUpdate::Set(p) => assert!((p - 50.0).abs() < EPS),
            ControlUpdate::NoChange => panic!(),
        }
    }
}

//! Brightness sinks — the Linux sysfs backlight interface, with a null
//! fallback so the app still runs (and the overlay stays coherent) on
//! machines without a writable backlight device.

use std::fs;
use std::path::PathBuf;

use crate::error::SinkError;

// ════════════════════════════════════════════════════════════════════════════
// BrightnessSink trait
// ════════════════════════════════════════════════════════════════════════════

/// The display-brightness collaborator.
///
/// The frame loop only ever reads `current` for overlay text and
/// one-way writes via `apply`; it never reads back its own write to
/// decide the next one.  `percent` is always within [0, 100].
pub trait BrightnessSink {
    fn current(&mut self) -> Result<f32, SinkError>;

    /// Apply a new brightness.  `force` bypasses any OS-level gradual
    /// transition so the display tracks the gesture without lag.
    fn apply(&mut self, percent: f32, force: bool) -> Result<(), SinkError>;
}

impl<S: BrightnessSink + ?Sized> BrightnessSink for Box<S> {
    fn current(&mut self) -> Result<f32, SinkError> {
        (**self).current()
    }

    fn apply(&mut self, percent: f32, force: bool) -> Result<(), SinkError> {
        (**self).apply(percent, force)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SysfsBacklight
// ════════════════════════════════════════════════════════════════════════════

/// Backlight control through `/sys/class/backlight/<dev>/`.
///
/// Sysfs writes take effect immediately, so `force` is a no-op here; the
/// flag exists for sinks that animate transitions.
pub struct SysfsBacklight {
    device: PathBuf,
    max_raw: u32,
}

impl SysfsBacklight {
    const CLASS_DIR: &'static str = "/sys/class/backlight";

    /// Open one backlight device directory.
    pub fn open(device: PathBuf) -> Result<Self, SinkError> {
        let max_raw = read_u32(&device.join("max_brightness"))?;
        if max_raw == 0 {
            return Err(SinkError::Read(format!(
                "{}: max_brightness is zero",
                device.display()
            )));
        }
        Ok(SysfsBacklight { device, max_raw })
    }

    /// Probe for the first usable backlight device.
    pub fn probe() -> Result<Self, SinkError> {
        let entries = fs::read_dir(Self::CLASS_DIR)
            .map_err(|e| SinkError::Read(format!("{}: {}", Self::CLASS_DIR, e)))?;

        for entry in entries.flatten() {
            match Self::open(entry.path()) {
                Ok(sink) => {
                    tracing::info!("using backlight device {}", entry.path().display());
                    return Ok(sink);
                }
                Err(e) => tracing::debug!("skipping {}: {}", entry.path().display(), e),
            }
        }
        Err(SinkError::Read("no usable backlight device".into()))
    }
}

impl BrightnessSink for SysfsBacklight {
    fn current(&mut self) -> Result<f32, SinkError> {
        let raw = read_u32(&self.device.join("brightness"))?;
        Ok(raw as f32 * 100.0 / self.max_raw as f32)
    }

    fn apply(&mut self, percent: f32, _force: bool) -> Result<(), SinkError> {
        let raw = (percent.clamp(0.0, 100.0) / 100.0 * self.max_raw as f32).round() as u32;
        fs::write(self.device.join("brightness"), raw.to_string())
            .map_err(|e| SinkError::Apply(format!("{}: {}", self.device.display(), e)))
    }
}

fn read_u32(path: &std::path::Path) -> Result<u32, SinkError> {
    let text =
        fs::read_to_string(path).map_err(|e| SinkError::Read(format!("{}: {}", path.display(), e)))?;
    text.trim()
        .parse()
        .map_err(|e| SinkError::Read(format!("{}: {}", path.display(), e)))
}

// ════════════════════════════════════════════════════════════════════════════
// NullSink — fallback when no backlight device is writable
// ════════════════════════════════════════════════════════════════════════════

/// Accepts every write and remembers the last value so the overlay still
/// reads back something sensible.
pub struct NullSink {
    value: f32,
}

impl NullSink {
    pub fn new() -> Self {
        NullSink { value: 100.0 }
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new()
    }
}

impl BrightnessSink for NullSink {
    fn current(&mut self) -> Result<f32, SinkError> {
        Ok(self.value)
    }

    fn apply(&mut self, percent: f32, _force: bool) -> Result<(), SinkError> {
        self.value = percent.clamp(0.0, 100.0);
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// open_sink — probe hardware, fall back to null
// ════════════════════════════════════════════════════════════════════════════

/// Pick the best available sink.
pub fn open_sink() -> Box<dyn BrightnessSink> {
    match SysfsBacklight::probe() {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            tracing::warn!("{} — brightness changes will be simulated", e);
            Box::new(NullSink::new())
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sink_remembers_last_value() {
        let mut sink = NullSink::new();
        sink.apply(32.1, true).unwrap();
        assert!((sink.current().unwrap() - 32.1).abs() < 1e-6);
    }

    #[test]
    fn null_sink_clamps_input() {
        let mut sink = NullSink::new();
        sink.apply(250.0, false).unwrap();
        assert_eq!(sink.current().unwrap(), 100.0);
        sink.apply(-3.0, false).unwrap();
        assert_eq!(sink.current().unwrap(), 0.0);
    }

    #[test]
    fn sysfs_open_rejects_missing_device() {
        assert!(SysfsBacklight::open(PathBuf::from("/nonexistent/backlight0")).is_err());
    }
}

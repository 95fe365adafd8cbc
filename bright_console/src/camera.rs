//! Frame acquisition — real webcam (feature = "camera") or a synthetic
//! test pattern that needs no hardware.

use crate::error::CameraError;

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// One captured image: tightly packed RGB8, row-major.
///
/// Owned exclusively by the frame loop for the duration of one tick, then
/// handed to the renderer and discarded.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height * 3);
        Frame {
            width,
            height,
            data,
        }
    }

    /// RGB at (x, y); black outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> (u8, u8, u8) {
        if x >= self.width || y >= self.height {
            return (0, 0, 0);
        }
        let i = (y * self.width + x) * 3;
        (self.data[i], self.data[i + 1], self.data[i + 2])
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CameraSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can produce frames on demand.
///
/// `grab` is the only potentially slow call per tick and is treated as
/// synchronous and bounded.  A `Grab` error is transient; the tick skips
/// processing and the next tick tries again.
pub trait CameraSource {
    fn grab(&mut self) -> Result<Frame, CameraError>;
    fn width(&self) -> usize;
    fn height(&self) -> usize;
}

// ════════════════════════════════════════════════════════════════════════════
// SyntheticCamera — simulation mode (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Deterministic test-pattern source used when no webcam is wanted.
///
/// Renders a slowly shifting two-tone gradient so motion is visible in
/// the window.  Never fails.
pub struct SyntheticCamera {
    width: usize,
    height: usize,
    phase: u32,
}

impl SyntheticCamera {
    pub fn new(width: usize, height: usize) -> Self {
        SyntheticCamera {
            width,
            height,
            phase: 0,
        }
    }
}

impl CameraSource for SyntheticCamera {
    fn grab(&mut self) -> Result<Frame, CameraError> {
        self.phase = self.phase.wrapping_add(1);
        let mut data = Vec::with_capacity(self.width * self.height * 3);
        for y in 0..self.height {
            for x in 0..self.width {
                let g = ((x + self.phase as usize) * 255 / self.width.max(1)) as u8;
                let b = (y * 96 / self.height.max(1)) as u8 + 24;
                data.push(18);
                data.push(g / 4 + 20);
                data.push(b);
            }
        }
        Ok(Frame::new(self.width, self.height, data))
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }
}

// ════════════════════════════════════════════════════════════════════════════
// NokhwaCamera — real webcam (feature = "camera")
// ════════════════════════════════════════════════════════════════════════════

/// Webcam source backed by `nokhwa`.
///
/// The device handle is owned here and released by `Drop` on every exit
/// path, including the fatal-startup-failure path (the handle never
/// escapes `open` on error).
#[cfg(feature = "camera")]
pub struct NokhwaCamera {
    camera: nokhwa::Camera,
    width: usize,
    height: usize,
}

#[cfg(feature = "camera")]
impl NokhwaCamera {
    /// Open device `index` and start streaming.  Failure here is fatal:
    /// the caller must not enter the frame loop.
    pub fn open(index: u32) -> Result<Self, CameraError> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = nokhwa::Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| CameraError::Open {
                index,
                reason: e.to_string(),
            })?;
        camera.open_stream().map_err(|e| CameraError::Open {
            index,
            reason: e.to_string(),
        })?;

        let res = camera.resolution();
        let (width, height) = (res.width() as usize, res.height() as usize);
        tracing::info!("camera {} open at {}x{}", index, width, height);

        Ok(NokhwaCamera {
            camera,
            width,
            height,
        })
    }
}

#[cfg(feature = "camera")]
impl CameraSource for NokhwaCamera {
    fn grab(&mut self) -> Result<Frame, CameraError> {
        use nokhwa::pixel_format::RgbFormat;

        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::Grab(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::Grab(e.to_string()))?;
        let (w, h) = (decoded.width() as usize, decoded.height() as usize);
        Ok(Frame::new(w, h, decoded.into_raw()))
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }
}

#[cfg(feature = "camera")]
impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            tracing::debug!("stop_stream on drop: {}", e);
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
    fn synthetic_frames_are_well_formed() {
        let mut cam = SyntheticCamera::new(64, 48);
        let frame = cam.grab().unwrap();
        assert_eq!(frame.width, 64);
        assert_eq!(frame.height, 48);
        assert_eq!(frame.data.len(), 64 * 48 * 3);
    }

    #[test]
    fn synthetic_camera_never_fails() {
        let mut cam = SyntheticCamera::new(8, 8);
        for _ in 0..100 {
            assert!(cam.grab().is_ok());
        }
    }

    #[test]
    fn pixel_out_of_bounds_is_black() {
        let frame = Frame::new(2, 2, vec![255; 12]);
        assert_eq!(frame.pixel(5, 0), (0, 0, 0));
        assert_eq!(frame.pixel(0, 0), (255, 255, 255));
    }
}

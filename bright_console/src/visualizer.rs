//! Software-rendered feed window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │  BRIGHTNESS: 47%                          │
//! │                                           │
//! │            [camera feed with              │
//! │             hand skeleton overlay]        │
//! │                                           │
//! ├───────────────────────────────────────────┤
//! │ key legend                                │
//! └───────────────────────────────────────────┘
//! ```
//!
//! The window doubles as the simulation input device: mouse position and
//! left-button state are forwarded to the sim tracker each tick.

use std::sync::mpsc::Sender;
use std::time::Duration;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use gesture_core::HandObservation;

use crate::camera::Frame;
use crate::error::BrightError;
use crate::tracker::SimPointer;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const LEGEND_H: usize = 20;
const LEGEND_BG: u32 = 0xFF0F3460;
const TEXT_COLOR: u32 = 0xFFFFD700; // gold readout
const BONE_COLOR: u32 = 0xFF44DD88;
const PINCH_COLOR: u32 = 0xFFCC44CC;
const TIP_COLOR: u32 = 0xFFFF5555;
const OVERLAY_X: usize = 40;
const OVERLAY_Y: usize = 40;

/// Bone topology of the 21-point hand model, as (from, to) landmark pairs.
const HAND_BONES: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),          // thumb
    (0, 5), (5, 6), (6, 7), (7, 8),          // index
    (9, 10), (10, 11), (11, 12),             // middle
    (13, 14), (14, 15), (15, 16),            // ring
    (0, 17), (17, 18), (18, 19), (19, 20),   // pinky
    (5, 9), (9, 13), (13, 17),               // knuckle row
];

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf: Vec<u32>,
    frame_w: usize,
    frame_h: usize,
    sim_tx: Sender<SimPointer>,
}

impl Visualizer {
    /// Open the window at the camera's frame size plus a legend strip.
    /// `tick_delay` becomes the fixed presentation cadence; ticks are not
    /// drift-corrected.
    pub fn new(
        frame_w: usize,
        frame_h: usize,
        tick_delay: Duration,
        sim_tx: Sender<SimPointer>,
    ) -> Result<Self, BrightError> {
        let win_h = frame_h + LEGEND_H;
        let mut window = Window::new(
            "Brightness Control Console",
            frame_w,
            win_h,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| BrightError::Window(e.to_string()))?;

        window.limit_update_rate(Some(tick_delay));

        Ok(Visualizer {
            window,
            buf: vec![0xFF000000; frame_w * win_h],
            frame_w,
            frame_h,
            sim_tx,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Sample the window's input state.  Returns false once the window
    /// should stop (closed or Escape pressed); this preempts scheduling
    /// of any further tick.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }
        if self.window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            return false;
        }

        if let Some((x, y)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let _ = self.sim_tx.send(SimPointer {
                x,
                y,
                pinch: self.window.get_mouse_down(MouseButton::Left),
            });
        }
        true
    }

    /// Present one tick.  With no fresh frame the previous buffer is
    /// re-presented unchanged, so the feed freezes rather than blanks.
    pub fn render(
        &mut self,
        frame: Option<&Frame>,
        observation: Option<&HandObservation>,
        percent: f32,
    ) {
        if let Some(frame) = frame {
            self.blit(frame);

            if let Some(obs) = observation {
                self.draw_skeleton(obs);
            }

            // The only place the control value is rounded.
            let text = format!("BRIGHTNESS: {}%", percent.round() as i32);
            self.draw_label(&text, OVERLAY_X, OVERLAY_Y, 3, TEXT_COLOR);

            self.fill_rect(0, self.frame_h, self.frame_w, LEGEND_H, LEGEND_BG);
            self.draw_label(
                "HOLD LMB = PINCH   MOVE = WIDTH   ESC = QUIT",
                8,
                self.frame_h + 6,
                1,
                0xFF9FB8D8,
            );
        }

        if let Err(e) =
            self.window
                .update_with_buffer(&self.buf, self.frame_w, self.frame_h + LEGEND_H)
        {
            tracing::debug!("window update failed: {}", e);
        }
    }

    // ── Frame blit ────────────────────────────────────────────────────────

    fn blit(&mut self, frame: &Frame) {
        let w = self.frame_w.min(frame.width);
        let h = self.frame_h.min(frame.height);
        for y in 0..h {
            for x in 0..w {
                let (r, g, b) = frame.pixel(x, y);
                self.buf[y * self.frame_w + x] =
                    0xFF000000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
            }
        }
    }

    // ── Hand skeleton ─────────────────────────────────────────────────────

    fn draw_skeleton(&mut self, obs: &HandObservation) {
        for &(a, b) in &HAND_BONES {
            let pa = obs.landmarks[a];
            let pb = obs.landmarks[b];
            self.draw_line(pa.x, pa.y, pb.x, pb.y, BONE_COLOR);
        }

        // Pinch annotation: line between the gating fingertips with a
        // midpoint marker.
        let t = obs.thumb_tip();
        let i = obs.index_tip();
        self.draw_line(t.x, t.y, i.x, i.y, PINCH_COLOR);
        self.draw_disc(t.x, t.y, 5, TIP_COLOR);
        self.draw_disc(i.x, i.y, 5, TIP_COLOR);
        self.draw_disc((t.x + i.x) / 2.0, (t.y + i.y) / 2.0, 3, PINCH_COLOR);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.frame_w && (y as usize) < self.frame_h {
            self.buf[y as usize * self.frame_w + x as usize] = color;
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        let win_h = self.frame_h + LEGEND_H;
        for row in y..(y + h).min(win_h) {
            for col in x..(x + w).min(self.frame_w) {
                self.buf[row * self.frame_w + col] = color;
            }
        }
    }

    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: u32) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as usize;
        for s in 0..=steps {
            let t = s as f32 / steps as f32;
            let x = (x0 + (x1 - x0) * t).round() as isize;
            let y = (y0 + (y1 - y0) * t).round() as isize;
            self.set_pixel(x, y, color);
        }
    }

    fn draw_disc(&mut self, cx: f32, cy: f32, r: isize, color: u32) {
        let (cx, cy) = (cx.round() as isize, cy.round() as isize);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Scaled 3×5 bitmap-font text.  Rows may spill into the legend strip
    /// when `y` is near the bottom, so bounds are checked against the
    /// full window.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let win_h = self.frame_h + LEGEND_H;
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) == 0 {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            let px = cx + col * scale + sx;
                            let py = y + row * scale + sy;
                            if px < self.frame_w && py < win_h {
                                self.buf[py * self.frame_w + px] = color;
                            }
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > self.frame_w {
                break;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font — just the characters the overlay needs
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

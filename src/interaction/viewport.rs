//! Pan/zoom transform between screen and world coordinates.

use serde::{Deserialize, Serialize};

/// Smallest allowed zoom scale.
pub const MIN_SCALE: f32 = 0.2;
/// Largest allowed zoom scale.
pub const MAX_SCALE: f32 = 5.0;

/// Screen = world * k + (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Horizontal translation in screen pixels.
    pub x: f32,
    /// Vertical translation in screen pixels.
    pub y: f32,
    /// Zoom scale, within [`MIN_SCALE`, `MAX_SCALE`].
    pub k: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            k: 1.0,
        }
    }
}

impl Viewport {
    /// Translate the view by a screen-space delta.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if dx.is_finite() && dy.is_finite() {
            self.x += dx;
            self.y += dy;
        }
    }

    /// Multiply the scale by `factor`, keeping the world point under
    /// (screen_x, screen_y) fixed. The scale is clamped.
    pub fn zoom_at(&mut self, screen_x: f32, screen_y: f32, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let (wx, wy) = self.screen_to_world(screen_x, screen_y);
        self.k = (self.k * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.x = screen_x - wx * self.k;
        self.y = screen_y - wy * self.k;
    }

    /// Convert screen coordinates to world coordinates.
    pub fn screen_to_world(&self, sx: f32, sy: f32) -> (f32, f32) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }

    /// Convert world coordinates to screen coordinates.
    pub fn world_to_screen(&self, wx: f32, wy: f32) -> (f32, f32) {
        (wx * self.k + self.x, wy * self.k + self.y)
    }
}

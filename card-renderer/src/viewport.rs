//! Logical surface geometry and input coordinate conversion.
//!
//! Scene geometry lives in a fixed logical space. The surface is displayed
//! at some CSS size and backed by a store scaled by the device pixel ratio;
//! pointer input arrives in displayed pixels and must be converted before it
//! touches the scene.

use card_core::{LOGICAL_HEIGHT, LOGICAL_WIDTH};

/// Sizes of the logical, displayed and backing surfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    logical_width: f64,
    logical_height: f64,
    display_width: f64,
    display_height: f64,
    device_pixel_ratio: f64,
}

impl Viewport {
    /// Create a viewport displayed at its logical size with a ratio of 1.
    #[must_use]
    pub fn new(logical_width: f64, logical_height: f64) -> Self {
        Self {
            logical_width,
            logical_height,
            display_width: logical_width,
            display_height: logical_height,
            device_pixel_ratio: 1.0,
        }
    }

    /// Record a new displayed size and device pixel ratio.
    ///
    /// Non-positive or non-finite values keep the previous setting.
    pub fn resize(&mut self, display_width: f64, display_height: f64, device_pixel_ratio: f64) {
        if is_positive(display_width) && is_positive(display_height) {
            self.display_width = display_width;
            self.display_height = display_height;
        }
        if is_positive(device_pixel_ratio) {
            self.device_pixel_ratio = device_pixel_ratio;
        }
        tracing::debug!(
            "Viewport displayed at {}x{} (ratio {})",
            self.display_width,
            self.display_height,
            self.device_pixel_ratio
        );
    }

    /// Convert a point in displayed pixels to logical units.
    #[must_use]
    pub fn to_logical(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * (self.logical_width / self.display_width),
            y * (self.logical_height / self.display_height),
        )
    }

    /// Size of the backing store in physical pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.logical_width * self.device_pixel_ratio).round().max(1.0) as u32,
            (self.logical_height * self.device_pixel_ratio).round().max(1.0) as u32,
        )
    }

    /// Logical line width that appears `width` physical pixels thick.
    #[must_use]
    pub fn hairline(&self, width: f64) -> f64 {
        width / self.device_pixel_ratio
    }

    /// Logical width.
    #[must_use]
    pub fn logical_width(&self) -> f64 {
        self.logical_width
    }

    /// Logical height.
    #[must_use]
    pub fn logical_height(&self) -> f64 {
        self.logical_height
    }

    /// Current device pixel ratio.
    #[must_use]
    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LOGICAL_WIDTH, LOGICAL_HEIGHT)
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_conversion_by_default() {
        let viewport = Viewport::default();
        assert_eq!(viewport.to_logical(120.0, 45.0), (120.0, 45.0));
        assert_eq!(viewport.backing_size(), (800, 500));
    }

    #[test]
    fn test_shrunk_display_scales_input() {
        let mut viewport = Viewport::default();
        viewport.resize(400.0, 250.0, 2.0);
        assert_eq!(viewport.to_logical(100.0, 50.0), (200.0, 100.0));
        assert_eq!(viewport.backing_size(), (1600, 1000));
        assert!((viewport.hairline(2.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_resize_is_ignored() {
        let mut viewport = Viewport::default();
        viewport.resize(0.0, f64::NAN, -1.0);
        assert_eq!(viewport, Viewport::default());
    }
}

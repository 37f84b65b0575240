//! Drawing surfaces the renderer paints onto.

pub mod recording;
pub mod svg;

use card_core::{Bounds, Color};

use crate::text::{approximate_width, FontFamily};

pub use recording::{DrawCommand, RecordingSurface};
pub use svg::SvgSurface;

/// Style for a run of text drawn with a top baseline.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextStyle {
    /// Font size in logical units.
    pub font_size: f64,
    /// Fill color; `None` leaves glyph colors to the font (emoji).
    pub color: Option<Color>,
    /// Font family.
    pub family: FontFamily,
}

/// A 2D drawing target addressed in logical units.
///
/// Implementations map logical units onto their own resolution.
pub trait Surface {
    /// Clear the surface and start a new frame of the given logical size.
    fn begin_frame(&mut self, width: f64, height: f64);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, bounds: Bounds, color: Color);

    /// Fill a circle.
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Color);

    /// Fill a closed polygon.
    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Color);

    /// Draw a single line of text with its top edge at `y`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);

    /// Stroke a dashed rectangle outline.
    fn stroke_dashed_rect(&mut self, bounds: Bounds, color: Color, line_width: f64, dash: &[f64]);

    /// Advance width of `text` in logical units.
    fn measure_text(&self, text: &str, font_size: f64, family: FontFamily) -> f64 {
        let _ = family;
        approximate_width(text, font_size)
    }
}

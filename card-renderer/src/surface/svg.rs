//! SVG surface.
//!
//! Writes each draw call as an SVG element. The view box always spans the
//! logical frame; the document's pixel size is either a multiple of it or a
//! fixed thumbnail size.

use std::fmt::Write;

use card_core::{Bounds, Color};

use super::{Surface, TextStyle};

/// Ascent of the text faces as a fraction of the font size.
const ASCENT: f64 = 0.85;

/// How the output pixel size relates to the logical frame.
#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputSize {
    Scale(f64),
    Fixed(u32, u32),
}

/// Surface that accumulates an SVG document.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    output: OutputSize,
    logical_width: f64,
    logical_height: f64,
    body: String,
}

impl SvgSurface {
    /// Output `scale` pixels per logical unit.
    #[must_use]
    pub fn scaled(scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        Self::with_output(OutputSize::Scale(scale))
    }

    /// Output exactly `width`×`height` pixels regardless of the frame size.
    #[must_use]
    pub fn fixed(width: u32, height: u32) -> Self {
        Self::with_output(OutputSize::Fixed(width.max(1), height.max(1)))
    }

    fn with_output(output: OutputSize) -> Self {
        Self {
            output,
            logical_width: 0.0,
            logical_height: 0.0,
            body: String::with_capacity(4096),
        }
    }

    /// Pixel size of the document.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_size(&self) -> (u32, u32) {
        match self.output {
            OutputSize::Scale(scale) => (
                (self.logical_width * scale).round().max(1.0) as u32,
                (self.logical_height * scale).round().max(1.0) as u32,
            ),
            OutputSize::Fixed(width, height) => (width, height),
        }
    }

    /// Complete SVG document for the last frame.
    #[must_use]
    pub fn finish(&self) -> String {
        let (width, height) = self.pixel_size();
        let mut svg = String::with_capacity(self.body.len() + 256);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {} {}\" preserveAspectRatio=\"none\">",
            self.logical_width, self.logical_height,
        );
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        svg
    }
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::scaled(1.0)
    }
}

impl Surface for SvgSurface {
    fn begin_frame(&mut self, width: f64, height: f64) {
        self.logical_width = width;
        self.logical_height = height;
        self.body.clear();
    }

    fn fill_rect(&mut self, bounds: Bounds, color: Color) {
        let _ = write!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{}/>",
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            paint("fill", color),
        );
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Color) {
        let _ = write!(
            self.body,
            "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{radius}\"{}/>",
            paint("fill", color),
        );
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Color) {
        if points.is_empty() {
            return;
        }
        let list = points
            .iter()
            .map(|(x, y)| format!("{x},{y}"))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(
            self.body,
            "<polygon points=\"{list}\"{}/>",
            paint("fill", color),
        );
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        let baseline = y + style.font_size * ASCENT;
        let fill = style.color.map(|c| paint("fill", c)).unwrap_or_default();
        let _ = write!(
            self.body,
            "<text x=\"{x}\" y=\"{baseline}\" font-size=\"{}\" font-family=\"{}\"{fill}>{}</text>",
            style.font_size,
            style.family.css(),
            escape_xml(text),
        );
    }

    fn stroke_dashed_rect(&mut self, bounds: Bounds, color: Color, line_width: f64, dash: &[f64]) {
        let pattern = dash
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\"{} stroke-width=\"{line_width}\" stroke-dasharray=\"{pattern}\"/>",
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            paint("stroke", color),
        );
    }
}

/// Paint attribute(s) for `color`, with a separate opacity when translucent.
fn paint(attribute: &str, color: Color) -> String {
    let mut out = format!(
        " {attribute}=\"#{:02x}{:02x}{:02x}\"",
        color.r, color.g, color.b
    );
    if !color.is_opaque() {
        let _ = write!(out, " {attribute}-opacity=\"{}\"", color.alpha());
    }
    out
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

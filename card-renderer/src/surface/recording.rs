//! Display-list surface.
//!
//! Records every draw call so a host (browser canvas, native window) can
//! replay the frame with its own 2D context.

use card_core::{Bounds, Color};
use serde::{Deserialize, Serialize};

use super::{Surface, TextStyle};
use crate::error::RenderResult;

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[allow(missing_docs)] // Fields mirror the `Surface` method arguments
pub enum DrawCommand {
    /// Frame start.
    Clear { width: f64, height: f64 },
    /// Filled rectangle.
    FillRect { bounds: Bounds, color: Color },
    /// Filled circle.
    FillCircle {
        cx: f64,
        cy: f64,
        radius: f64,
        color: Color,
    },
    /// Filled polygon.
    FillPolygon {
        points: Vec<(f64, f64)>,
        color: Color,
    },
    /// One line of text.
    FillText {
        text: String,
        x: f64,
        y: f64,
        style: TextStyle,
    },
    /// Dashed outline.
    StrokeDashedRect {
        bounds: Bounds,
        color: Color,
        line_width: f64,
        dash: Vec<f64>,
    },
}

/// Surface that keeps the draw calls of the latest frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Create an empty recording surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw calls of the latest frame, in order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the surface empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Serialize the frame for a host that replays it on its own context.
    ///
    /// # Errors
    ///
    /// Returns an error if a command cannot be serialized.
    pub fn to_json(&self) -> RenderResult<String> {
        Ok(serde_json::to_string(&self.commands)?)
    }

    fn push(&mut self, command: DrawCommand) {
        tracing::trace!("Draw {command:?}");
        self.commands.push(command);
    }
}

impl Surface for RecordingSurface {
    fn begin_frame(&mut self, width: f64, height: f64) {
        self.commands.clear();
        self.push(DrawCommand::Clear { width, height });
    }

    fn fill_rect(&mut self, bounds: Bounds, color: Color) {
        self.push(DrawCommand::FillRect { bounds, color });
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Color) {
        self.push(DrawCommand::FillCircle {
            cx,
            cy,
            radius,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Color) {
        self.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            style: *style,
        });
    }

    fn stroke_dashed_rect(&mut self, bounds: Bounds, color: Color, line_width: f64, dash: &[f64]) {
        self.push(DrawCommand::StrokeDashedRect {
            bounds,
            color,
            line_width,
            dash: dash.to_vec(),
        });
    }
}

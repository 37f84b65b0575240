//! # Cardsmith Renderer
//!
//! Deterministic drawing of card scenes onto a fixed logical surface.
//!
//! ## Pipeline
//!
//! ```text
//! ┌───────────┐   ┌──────────┐   ┌──────────────────────────┐
//! │  Scene    │──▶│ Renderer │──▶│ Surface                  │
//! │ + select  │   │          │   ├────────────┬─────────────┤
//! └───────────┘   └──────────┘   │ Recording  │ SVG ─▶ PNG  │
//!                                │ (host 2D)  │ (export)    │
//!                                └────────────┴─────────────┘
//! ```
//!
//! Geometry is always expressed in logical units. Surfaces map logical
//! units onto their own resolution, so a frame looks the same at any
//! device pixel ratio.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
#[cfg(feature = "export")]
pub mod export;
pub mod surface;
pub mod text;
pub mod viewport;

pub use error::{RenderError, RenderResult};
pub use surface::{DrawCommand, RecordingSurface, Surface, SvgSurface, TextStyle};
pub use text::{wrap_text, FontFamily, LINE_HEIGHT_FACTOR};
pub use viewport::Viewport;

use card_core::{Color, ObjectId, ObjectKind, Scene, SceneObject, ShapeKind};

/// Outline styling for the selected object.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Outline color.
    pub selection_color: Color,
    /// Outline thickness in physical pixels.
    pub outline_width: f64,
    /// Dash pattern in logical units.
    pub dash: Vec<f64>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            selection_color: Color::rgb(0x22, 0xc5, 0x5e),
            outline_width: 2.0,
            dash: vec![6.0, 4.0],
        }
    }
}

/// Draws scenes onto a [`Surface`].
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    /// Create a renderer with the given configuration.
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Get the renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Draw one frame.
    ///
    /// Clears the logical area, fills the background, paints objects in list
    /// order and outlines the selected object if `selection` resolves.
    pub fn render(
        &self,
        scene: &Scene,
        selection: Option<&ObjectId>,
        viewport: &Viewport,
        surface: &mut dyn Surface,
    ) {
        let (width, height) = (viewport.logical_width(), viewport.logical_height());
        surface.begin_frame(width, height);
        surface.fill_rect(
            card_core::Bounds::new(0.0, 0.0, width, height),
            scene.background_color,
        );

        for object in scene.objects() {
            draw_object(object, surface);
        }

        if let Some(selected) = selection.and_then(|id| scene.find(id)) {
            surface.stroke_dashed_rect(
                selected.bounds(),
                self.config.selection_color,
                viewport.hairline(self.config.outline_width),
                &self.config.dash,
            );
        }

        tracing::trace!("Rendered {} objects", scene.len());
    }
}

fn draw_object(object: &SceneObject, surface: &mut dyn Surface) {
    match &object.kind {
        ObjectKind::Text {
            text,
            font_size,
            color,
        } => {
            let style = TextStyle {
                font_size: *font_size,
                color: Some(*color),
                family: FontFamily::Text,
            };
            let lines = wrap_text(text, object.width, |candidate| {
                surface.measure_text(candidate, *font_size, FontFamily::Text)
            });
            let mut y = object.y;
            for line in &lines {
                surface.fill_text(line, object.x, y, &style);
                y += font_size * LINE_HEIGHT_FACTOR;
            }
        }
        ObjectKind::Shape { shape_kind, color } => match shape_kind {
            ShapeKind::Rect => surface.fill_rect(object.bounds(), *color),
            ShapeKind::Circle => {
                let radius = object.width.min(object.height) / 2.0;
                surface.fill_circle(object.x + radius, object.y + radius, radius, *color);
            }
            ShapeKind::Triangle => {
                let points = [
                    (object.x + object.width / 2.0, object.y),
                    (object.x + object.width, object.y + object.height),
                    (object.x, object.y + object.height),
                ];
                surface.fill_polygon(&points, *color);
            }
        },
        ObjectKind::Sticker { emoji, font_size } => {
            let style = TextStyle {
                font_size: *font_size,
                color: None,
                family: FontFamily::Emoji,
            };
            surface.fill_text(emoji, object.x, object.y, &style);
        }
    }
}

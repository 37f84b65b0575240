//! Scene export to raster images.
//!
//! Renders a [`Scene`] through the [`SvgSurface`] and rasterizes the result
//! with the resvg/tiny-skia pipeline. Exports are pure: nothing about the
//! scene, its history or its persistence changes.

use card_core::{ObjectId, Scene, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use chrono::NaiveDate;

use crate::error::{RenderError, RenderResult};
use crate::surface::SvgSurface;
use crate::viewport::Viewport;
use crate::Renderer;

/// Pixel size of template preview thumbnails.
pub const THUMBNAIL_SIZE: (u32, u32) = (160, 100);

/// Configuration for scene export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Physical pixels per logical unit (the device pixel ratio at capture).
    pub device_pixel_ratio: f64,
    /// Draw the selection outline when a selection is passed in.
    pub include_selection: bool,
    /// Load system fonts so text and emoji rasterize with real glyphs.
    pub load_system_fonts: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            include_selection: true,
            load_system_fonts: true,
        }
    }
}

/// A rasterized card ready to be written out.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    /// Suggested file name, derived from the capture date.
    pub filename: String,
    /// PNG bytes.
    pub bytes: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Default export file name for a capture on `date`.
#[must_use]
pub fn export_filename(date: NaiveDate) -> String {
    format!("card_{}.png", date.format("%Y-%m-%d"))
}

/// Exports a [`Scene`] to SVG and PNG.
#[derive(Debug, Clone)]
pub struct SceneExporter {
    config: ExportConfig,
    renderer: Renderer,
    viewport: Viewport,
}

impl SceneExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        let viewport = capture_viewport(
            LOGICAL_WIDTH,
            LOGICAL_HEIGHT,
            config.device_pixel_ratio,
        );
        Self {
            config,
            renderer: Renderer::default(),
            viewport,
        }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Use `renderer` for outline styling.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Use `viewport` for the logical frame size.
    ///
    /// The export resolution comes from the configured device pixel ratio,
    /// not from the viewport's display settings. Outline widths are
    /// compensated for that ratio, as on the live surface.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = capture_viewport(
            viewport.logical_width(),
            viewport.logical_height(),
            self.config.device_pixel_ratio,
        );
        self
    }

    /// Get the export configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Render the scene to an SVG document.
    #[must_use]
    pub fn render_to_svg(&self, scene: &Scene, selection: Option<&ObjectId>) -> String {
        let mut surface = SvgSurface::scaled(self.config.device_pixel_ratio);
        self.draw(scene, selection, &mut surface);
        surface.finish()
    }

    /// Render the scene to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization or encoding fails.
    pub fn render_to_png(&self, scene: &Scene, selection: Option<&ObjectId>) -> RenderResult<Vec<u8>> {
        let svg = self.render_to_svg(scene, selection);
        let pixmap = self.rasterize_svg(&svg)?;
        encode(&pixmap)
    }

    /// Render a template-style preview thumbnail as SVG.
    #[must_use]
    pub fn thumbnail_svg(&self, scene: &Scene) -> String {
        let (width, height) = THUMBNAIL_SIZE;
        let mut surface = SvgSurface::fixed(width, height);
        self.draw(scene, None, &mut surface);
        surface.finish()
    }

    /// Render a preview thumbnail as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization or encoding fails.
    pub fn thumbnail_png(&self, scene: &Scene) -> RenderResult<Vec<u8>> {
        let pixmap = self.rasterize_svg(&self.thumbnail_svg(scene))?;
        encode(&pixmap)
    }

    /// Capture the scene as a dated PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization or encoding fails.
    pub fn export(
        &self,
        scene: &Scene,
        selection: Option<&ObjectId>,
        date: NaiveDate,
    ) -> RenderResult<ExportedImage> {
        let svg = self.render_to_svg(scene, selection);
        let pixmap = self.rasterize_svg(&svg)?;
        let image = ExportedImage {
            filename: export_filename(date),
            bytes: encode(&pixmap)?,
            width: pixmap.width(),
            height: pixmap.height(),
        };
        tracing::info!(
            "Exported {} ({}x{}, {} bytes)",
            image.filename,
            image.width,
            image.height,
            image.bytes.len()
        );
        Ok(image)
    }

    fn draw(&self, scene: &Scene, selection: Option<&ObjectId>, surface: &mut SvgSurface) {
        let selection = selection.filter(|_| self.config.include_selection);
        self.renderer.render(scene, selection, &self.viewport, surface);
    }

    /// Rasterize an SVG string to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(&self, svg_string: &str) -> RenderResult<tiny_skia::Pixmap> {
        let mut opt = usvg::Options::default();
        if self.config.load_system_fonts {
            opt.fontdb_mut().load_system_fonts();
        }
        let tree = usvg::Tree::from_str(svg_string, &opt)
            .map_err(|e| RenderError::Svg(e.to_string()))?;

        let px_w = (tree.size().width().round() as u32).max(1);
        let px_h = (tree.size().height().round() as u32).max(1);

        let mut pixmap = tiny_skia::Pixmap::new(px_w, px_h).ok_or(RenderError::Pixmap {
            width: px_w,
            height: px_h,
        })?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

/// Viewport displayed at its logical size with the capture ratio.
fn capture_viewport(width: f64, height: f64, device_pixel_ratio: f64) -> Viewport {
    let mut viewport = Viewport::new(width, height);
    viewport.resize(width, height, device_pixel_ratio);
    viewport
}

fn encode(pixmap: &tiny_skia::Pixmap) -> RenderResult<Vec<u8>> {
    pixmap
        .encode_png()
        .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_core::{Color, ObjectSpec, ShapeKind};

    const PNG_MAGIC: [u8; 4] = [137, 80, 78, 71];

    fn offline() -> SceneExporter {
        SceneExporter::new(ExportConfig {
            load_system_fonts: false,
            ..Default::default()
        })
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 8).expect("valid date")
    }

    #[test]
    fn test_filename_from_date() {
        assert_eq!(export_filename(date()), "card_2024-03-08.png");
    }

    #[test]
    fn test_svg_export_empty_scene() {
        let svg = offline().render_to_svg(&Scene::default(), None);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"800\""));
        assert!(svg.contains("height=\"500\""));
    }

    #[test]
    fn test_png_scaled_by_pixel_ratio() {
        let exporter = SceneExporter::new(ExportConfig {
            device_pixel_ratio: 2.0,
            load_system_fonts: false,
            ..Default::default()
        });
        let image = exporter
            .export(&Scene::default(), None, date())
            .expect("png export");
        assert_eq!(&image.bytes[0..4], &PNG_MAGIC);
        assert_eq!((image.width, image.height), (1600, 1000));
    }

    #[test]
    fn test_selection_outline_can_be_excluded() {
        let mut scene = Scene::default();
        let id = scene.add_object(ObjectSpec::shape(ShapeKind::Rect, Color::BLACK));
        assert!(offline()
            .render_to_svg(&scene, Some(&id))
            .contains("stroke-dasharray"));

        let exporter = SceneExporter::new(ExportConfig {
            include_selection: false,
            load_system_fonts: false,
            ..Default::default()
        });
        assert!(!exporter
            .render_to_svg(&scene, Some(&id))
            .contains("stroke-dasharray"));
    }

    #[test]
    fn test_outline_width_compensates_pixel_ratio() {
        let mut scene = Scene::default();
        let id = scene.add_object(ObjectSpec::shape(ShapeKind::Rect, Color::BLACK));

        let exporter = SceneExporter::new(ExportConfig {
            device_pixel_ratio: 2.0,
            load_system_fonts: false,
            ..Default::default()
        })
        .with_viewport(Viewport::default());
        let svg = exporter.render_to_svg(&scene, Some(&id));
        assert!(svg.contains("width=\"1600\""));
        assert!(svg.contains("stroke-width=\"1\""), "{svg}");

        let svg = offline().render_to_svg(&scene, Some(&id));
        assert!(svg.contains("stroke-width=\"2\""), "{svg}");
    }

    #[test]
    fn test_thumbnail_size() {
        let svg = offline().thumbnail_svg(&Scene::default());
        assert!(svg.contains("width=\"160\""));
        assert!(svg.contains("height=\"100\""));
        assert!(svg.contains("viewBox=\"0 0 800 500\""));

        let png = offline().thumbnail_png(&Scene::default()).expect("thumbnail");
        assert_eq!(&png[0..4], &PNG_MAGIC);
    }

    #[test]
    fn test_export_does_not_touch_scene() {
        let mut scene = Scene::new(Color::rgb(1, 2, 3));
        scene.add_object(ObjectSpec::text("Hi", 32.0, Color::BLACK));
        let before = scene.clone();
        offline().export(&scene, None, date()).expect("export");
        assert_eq!(scene, before);
    }
}

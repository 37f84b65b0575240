//! Editor session.
//!
//! [`EditorSession`] is the single owner of all editing state: the live
//! scene, the undo/redo history, the selection, in-progress gestures, the
//! viewport and the last rendered frame. Every mutation is followed by a
//! redraw, and every redraw re-arms the autosave timer when persistence is
//! attached.
//!
//! History entries are the scene as it was *before* a committed action, so
//! undo always lands on the state the user saw before that action.

mod input;

pub use input::{EventOutcome, Interaction};

use std::sync::Arc;

use card_core::{
    find_template, Bounds, Color, History, ObjectId, ObjectKind, ObjectPatch, ObjectSpec, Scene,
    ShapeKind,
};
use card_renderer::export::{ExportConfig, ExportedImage, SceneExporter};
use card_renderer::{DrawCommand, RecordingSurface, Renderer, Viewport};
use chrono::NaiveDate;
use serde::Serialize;

use crate::auth::AuthProvider;
use crate::autosave::Autosave;
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult, StoreResult};
use crate::store::{Card, CardId, CardStore};

/// Content of a text block added with an empty string.
pub const DEFAULT_TEXT: &str = "Text";

/// Font size used when an edit is not a usable number.
pub const DEFAULT_FONT_SIZE: f64 = 32.0;

/// Coerce a font size field to a positive number.
#[must_use]
pub fn parse_font_size(input: &str) -> f64 {
    input
        .trim()
        .trim_end_matches("px")
        .parse::<f64>()
        .map_or(DEFAULT_FONT_SIZE, coerce_font_size)
}

fn coerce_font_size(size: f64) -> f64 {
    if size.is_finite() && size > 0.0 {
        size
    } else {
        DEFAULT_FONT_SIZE
    }
}

/// Editable fields of the selected object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionInfo {
    /// Object id.
    pub id: ObjectId,
    /// Variant label (`text`, `shape`, `sticker`).
    pub kind: &'static str,
    /// Envelope.
    pub bounds: Bounds,
    /// Text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Font size of text or sticker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Fill color of text or shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Shape variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
    /// Sticker glyph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// Result of listing the account's cards.
#[derive(Debug, Clone, PartialEq)]
pub enum CardListing {
    /// The account has no saved cards.
    Empty,
    /// Saved cards, most recently updated first.
    Cards(Vec<Card>),
}

/// The editing state of one open card.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    scene: Scene,
    history: History,
    selection: Option<ObjectId>,
    interaction: Interaction,
    drag_start: Option<Scene>,
    nudge_start: Option<Scene>,
    viewport: Viewport,
    renderer: Renderer,
    frame: RecordingSurface,
    autosave: Option<Autosave>,
}

impl EditorSession {
    /// Create a session with an empty white scene and no persistence.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self {
            history: History::with_depth(config.history_depth),
            viewport: Viewport::new(config.logical_width, config.logical_height),
            renderer: Renderer::new(config.renderer.clone()),
            config,
            scene: Scene::default(),
            selection: None,
            interaction: Interaction::Idle,
            drag_start: None,
            nudge_start: None,
            frame: RecordingSurface::new(),
            autosave: None,
        }
    }

    /// Attach a card store and auth provider, enabling save, load and
    /// autosave.
    #[must_use]
    pub fn with_persistence(
        mut self,
        store: Arc<dyn CardStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        self.autosave = Some(Autosave::new(store, auth, self.config.autosave_debounce));
        self
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    /// The live scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Selected object id, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&ObjectId> {
        self.selection.as_ref()
    }

    /// Current gesture state.
    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Undo/redo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Whether undo would change the scene.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo would change the scene.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Surface geometry.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Autosave bridge, when persistence is attached.
    #[must_use]
    pub fn autosave(&self) -> Option<&Autosave> {
        self.autosave.as_ref()
    }

    /// Draw calls of the most recent frame.
    #[must_use]
    pub fn frame(&self) -> &[DrawCommand] {
        self.frame.commands()
    }

    /// Summary of the selected object for property panels.
    #[must_use]
    pub fn selection_info(&self) -> Option<SelectionInfo> {
        let object = self.scene.find(self.selection.as_ref()?)?;
        let mut info = SelectionInfo {
            id: object.id.clone(),
            kind: object.kind.label(),
            bounds: object.bounds(),
            text: None,
            font_size: None,
            color: None,
            shape: None,
            emoji: None,
        };
        match &object.kind {
            ObjectKind::Text {
                text,
                font_size,
                color,
            } => {
                info.text = Some(text.clone());
                info.font_size = Some(*font_size);
                info.color = Some(*color);
            }
            ObjectKind::Shape { shape_kind, color } => {
                info.shape = Some(*shape_kind);
                info.color = Some(*color);
            }
            ObjectKind::Sticker { emoji, font_size } => {
                info.emoji = Some(emoji.clone());
                info.font_size = Some(*font_size);
            }
        }
        Some(info)
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Render a frame and re-arm autosave.
    pub fn render(&mut self) -> &[DrawCommand] {
        self.redraw();
        self.frame.commands()
    }

    /// Record a new displayed size and device pixel ratio.
    pub fn resize(&mut self, display_width: f64, display_height: f64, device_pixel_ratio: f64) {
        self.viewport
            .resize(display_width, display_height, device_pixel_ratio);
        self.redraw();
    }

    /// Rasterize the surface at the current device pixel ratio.
    ///
    /// Has no history or persistence side effects.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization fails.
    pub fn export_png(&self, date: NaiveDate) -> EditorResult<ExportedImage> {
        let exporter = SceneExporter::new(ExportConfig {
            device_pixel_ratio: self.viewport.device_pixel_ratio(),
            include_selection: self.config.export_selection,
            ..ExportConfig::default()
        })
        .with_renderer(self.renderer.clone())
        .with_viewport(self.viewport);
        Ok(exporter.export(&self.scene, self.selection.as_ref(), date)?)
    }

    fn redraw(&mut self) {
        self.renderer.render(
            &self.scene,
            self.selection.as_ref(),
            &self.viewport,
            &mut self.frame,
        );
        if let Some(autosave) = self.autosave.as_mut() {
            autosave.schedule(&self.scene);
        }
    }

    // ------------------------------------------------------------------
    // Structural edits (one history entry each)
    // ------------------------------------------------------------------

    /// Add a text block at the default position and select it.
    ///
    /// Empty text becomes [`DEFAULT_TEXT`]; an unusable size becomes
    /// [`DEFAULT_FONT_SIZE`].
    pub fn add_text(&mut self, text: &str, font_size: f64, color: Color) -> ObjectId {
        let text = if text.trim().is_empty() {
            DEFAULT_TEXT
        } else {
            text
        };
        self.insert(ObjectSpec::text(text, coerce_font_size(font_size), color))
    }

    /// Add a shape at the default position and select it.
    pub fn add_shape(&mut self, shape_kind: ShapeKind, color: Color) -> ObjectId {
        self.insert(ObjectSpec::shape(shape_kind, color))
    }

    /// Add a sticker at the default position and select it.
    pub fn add_sticker(&mut self, emoji: &str) -> ObjectId {
        self.insert(ObjectSpec::sticker(emoji))
    }

    fn insert(&mut self, spec: ObjectSpec) -> ObjectId {
        self.settle_gestures();
        self.commit_current();
        let id = self.scene.add_object(spec);
        tracing::debug!("Added object {id}");
        self.selection = Some(id.clone());
        self.redraw();
        id
    }

    /// Change the background color. Returns false if it is unchanged.
    pub fn set_background(&mut self, color: Color) -> bool {
        if self.scene.background_color == color {
            return false;
        }
        self.settle_gestures();
        self.commit_current();
        self.scene.background_color = color;
        self.redraw();
        true
    }

    /// Delete the selected object. Returns false without a selection.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection.clone() else {
            return false;
        };
        if !self.scene.contains(&id) {
            self.selection = None;
            return false;
        }

        self.settle_gestures();
        self.commit_current();
        if let Err(e) = self.scene.remove_object(&id) {
            tracing::warn!("Delete failed: {e}");
        }
        tracing::debug!("Deleted object {id}");
        self.selection = None;
        self.redraw();
        true
    }

    /// Replace the scene with a fresh copy of a template.
    ///
    /// # Errors
    ///
    /// Returns an error if no template has this id.
    pub fn apply_template(&mut self, template_id: &str) -> EditorResult<()> {
        let template = find_template(template_id)?;
        self.settle_gestures();
        self.commit_current();
        self.replace_scene(template.instantiate());
        tracing::info!("Applied template {template_id}");
        Ok(())
    }

    /// Step back one history entry. Returns false if there is none.
    pub fn undo(&mut self) -> bool {
        self.settle_gestures();
        match self.history.undo(&self.scene) {
            Some(previous) => {
                self.replace_scene(previous);
                true
            }
            None => false,
        }
    }

    /// Step forward one history entry. Returns false if there is none.
    pub fn redo(&mut self) -> bool {
        self.settle_gestures();
        match self.history.redo(&self.scene) {
            Some(next) => {
                self.replace_scene(next);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Live property edits (never committed on their own)
    // ------------------------------------------------------------------

    /// Replace the selected text block's content.
    pub fn edit_text_content(&mut self, text: &str) -> bool {
        self.patch_selected_text(ObjectPatch {
            text: Some(text.to_string()),
            ..ObjectPatch::default()
        })
    }

    /// Change the selected text block's size from a raw field value.
    ///
    /// Unusable input becomes [`DEFAULT_FONT_SIZE`]. The envelope height is
    /// reset to three lines.
    pub fn edit_text_size(&mut self, input: &str) -> bool {
        let size = parse_font_size(input);
        self.patch_selected_text(ObjectPatch {
            font_size: Some(size),
            height: Some(size * 3.0),
            ..ObjectPatch::default()
        })
    }

    /// Change the selected text or shape color from a raw field value.
    ///
    /// Unparseable input keeps the previous color.
    pub fn edit_color(&mut self, input: &str) -> bool {
        let color = match input.parse::<Color>() {
            Ok(color) => color,
            Err(e) => {
                tracing::debug!("Ignoring color edit: {e}");
                return false;
            }
        };
        let Some(id) = self.selection.clone() else {
            return false;
        };
        let colorable = self
            .scene
            .find(&id)
            .is_some_and(|o| !matches!(o.kind, ObjectKind::Sticker { .. }));
        colorable && self.patch(&id, ObjectPatch {
            color: Some(color),
            ..ObjectPatch::default()
        })
    }

    fn patch_selected_text(&mut self, patch: ObjectPatch) -> bool {
        let Some(id) = self.selection.clone() else {
            return false;
        };
        let is_text = self
            .scene
            .find(&id)
            .is_some_and(|o| matches!(o.kind, ObjectKind::Text { .. }));
        is_text && self.patch(&id, patch)
    }

    fn patch(&mut self, id: &ObjectId, patch: ObjectPatch) -> bool {
        match self.scene.update_object(id, patch) {
            Ok(()) => {
                self.redraw();
                true
            }
            Err(e) => {
                tracing::debug!("Edit skipped: {e}");
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // History plumbing
    // ------------------------------------------------------------------

    fn commit_current(&mut self) {
        self.history.commit(&self.scene);
        tracing::debug!("Committed history entry ({} undo)", self.history.undo_len());
    }

    fn commit_snapshot(&mut self, before: &Scene) -> bool {
        if before == &self.scene {
            return false;
        }
        self.history.commit(before);
        tracing::debug!("Committed gesture ({} undo)", self.history.undo_len());
        true
    }

    /// Close any open drag or nudge burst, committing it if it moved
    /// something.
    fn settle_gestures(&mut self) -> bool {
        let dragged = self.finish_drag();
        let nudged = self.finish_nudge();
        dragged || nudged
    }

    /// Swap in a whole new scene. Selection and gestures never survive.
    fn replace_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.selection = None;
        self.interaction = Interaction::Idle;
        self.drag_start = None;
        self.nudge_start = None;
        self.redraw();
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Whether save-dependent actions are available.
    #[must_use]
    pub fn is_session_active(&self) -> bool {
        self.autosave
            .as_ref()
            .is_some_and(|a| a.auth().is_session_active())
    }

    fn active(&self) -> EditorResult<&Autosave> {
        self.autosave
            .as_ref()
            .filter(|a| a.auth().is_session_active())
            .ok_or(EditorError::NotAuthenticated)
    }

    /// Drop the session if the store rejected the credential.
    fn observe<T>(&self, result: StoreResult<T>) -> EditorResult<T> {
        result.map_err(|err| {
            if err.is_unauthorized() {
                if let Some(autosave) = &self.autosave {
                    autosave.auth().invalidate();
                }
            }
            EditorError::from(err)
        })
    }

    /// Save the scene, updating the card last saved or loaded.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NotAuthenticated`] without an active session
    /// or when the store rejects the credential, and the store error
    /// otherwise.
    pub async fn save(&self) -> EditorResult<Card> {
        let card = self.active()?.save_now(&self.scene).await?;
        tracing::info!("Saved card {} ({:?})", card.id, card.title);
        Ok(card)
    }

    /// List the account's cards.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NotAuthenticated`] without an active session.
    pub async fn list_cards(&self) -> EditorResult<CardListing> {
        let store = Arc::clone(self.active()?.store());
        let cards = self.observe(store.list().await)?;
        Ok(if cards.is_empty() {
            CardListing::Empty
        } else {
            CardListing::Cards(cards)
        })
    }

    /// Replace the scene with a stored card as one undoable step.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session, the card cannot be fetched,
    /// or its data is not a card document.
    pub async fn load_card(&mut self, id: &CardId) -> EditorResult<Card> {
        let store = Arc::clone(self.active()?.store());
        let card = self.observe(store.get(id).await)?;
        let scene = card.scene()?;

        self.settle_gestures();
        self.commit_current();
        self.replace_scene(scene);
        if let Some(autosave) = &self.autosave {
            autosave.remember(card.id.clone());
        }
        tracing::info!("Loaded card {} ({} objects)", card.id, self.scene.len());
        Ok(card)
    }

    /// Delete a stored card.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session or the store call fails.
    pub async fn delete_card(&self, id: &CardId) -> EditorResult<bool> {
        let autosave = self.active()?;
        let store = Arc::clone(autosave.store());
        let deleted = self.observe(store.delete(id).await)?;
        if deleted {
            autosave.forget(id);
            tracing::info!("Deleted card {id}");
        }
        Ok(deleted)
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

//! Scene objects - the building blocks of a card.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Color, LOGICAL_WIDTH};

/// Length of generated object identifiers.
const ID_LEN: usize = 12;

/// Unique identifier for a scene object.
///
/// Generated ids are short random hex strings; ids loaded from stored cards
/// are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Create a new random object ID.
    #[must_use]
    pub fn new() -> Self {
        let mut raw = Uuid::new_v4().simple().to_string();
        raw.truncate(ID_LEN);
        Self(raw)
    }

    /// Wrap an existing identifier.
    #[must_use]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vector shape variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Filled rectangle covering the envelope.
    Rect,
    /// Circle of radius `min(width, height) / 2` anchored at the envelope's top-left.
    Circle,
    /// Isosceles triangle with its apex at top-center and base along the bottom edge.
    Triangle,
}

/// The content carried by a scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    /// A block of wrapped text.
    Text {
        /// Text content.
        text: String,
        /// Font size in logical units.
        #[serde(rename = "fontSize")]
        font_size: f64,
        /// Fill color.
        color: Color,
    },

    /// A filled vector shape.
    Shape {
        /// Which shape to draw.
        #[serde(rename = "shape")]
        shape_kind: ShapeKind,
        /// Fill color.
        color: Color,
    },

    /// An emoji glyph.
    Sticker {
        /// The emoji to draw.
        emoji: String,
        /// Glyph size in logical units.
        #[serde(rename = "fontSize")]
        font_size: f64,
    },
}

impl ObjectKind {
    /// Human-readable name of the variant.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Text { .. } => "Text",
            Self::Shape { .. } => "Shape",
            Self::Sticker { .. } => "Sticker",
        }
    }
}

/// Axis-aligned envelope of an object in logical units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Bounds {
    /// Create a new envelope.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// An object placed on the card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Left edge in logical units.
    pub x: f64,
    /// Top edge in logical units.
    pub y: f64,
    /// Envelope width.
    pub width: f64,
    /// Envelope height.
    pub height: f64,
    /// Variant-specific content.
    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl SceneObject {
    /// Materialize a spec with a freshly generated id.
    #[must_use]
    pub fn from_spec(spec: ObjectSpec) -> Self {
        Self::with_id(ObjectId::new(), spec)
    }

    /// Materialize a spec with the given id.
    #[must_use]
    pub fn with_id(id: ObjectId, spec: ObjectSpec) -> Self {
        Self {
            id,
            x: spec.x,
            y: spec.y,
            width: spec.width,
            height: spec.height,
            kind: spec.kind,
        }
    }

    /// The object's envelope.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    /// Check if a point (in logical coordinates) is within this object's envelope.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.bounds().contains(x, y)
    }

    /// Move the envelope's top-left corner.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Strip the identity, keeping geometry and content.
    #[must_use]
    pub fn to_spec(&self) -> ObjectSpec {
        ObjectSpec {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            kind: self.kind.clone(),
        }
    }
}

/// A scene object without an identity: the parameters for `Scene::add_object`
/// and the entries of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Envelope width.
    pub width: f64,
    /// Envelope height.
    pub height: f64,
    /// Variant-specific content.
    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl ObjectSpec {
    /// Text block at the default insertion point, `0.7 × surface width` wide
    /// and three lines tall.
    #[must_use]
    pub fn text(text: impl Into<String>, font_size: f64, color: Color) -> Self {
        Self {
            x: 100.0,
            y: 150.0,
            width: LOGICAL_WIDTH * 0.7,
            height: font_size * 3.0,
            kind: ObjectKind::Text {
                text: text.into(),
                font_size,
                color,
            },
        }
    }

    /// 160×120 shape at the default insertion point.
    #[must_use]
    pub fn shape(shape_kind: ShapeKind, color: Color) -> Self {
        Self {
            x: 150.0,
            y: 200.0,
            width: 160.0,
            height: 120.0,
            kind: ObjectKind::Shape { shape_kind, color },
        }
    }

    /// 72-unit sticker at the default insertion point.
    #[must_use]
    pub fn sticker(emoji: impl Into<String>) -> Self {
        Self::sticker_sized(emoji, 72.0)
    }

    /// Sticker whose envelope tracks `font_size`.
    #[must_use]
    pub fn sticker_sized(emoji: impl Into<String>, font_size: f64) -> Self {
        Self {
            x: 200.0,
            y: 200.0,
            width: font_size,
            height: font_size,
            kind: ObjectKind::Sticker {
                emoji: emoji.into(),
                font_size,
            },
        }
    }

    /// Set the top-left corner.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the envelope size.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// A partial update for `Scene::update_object`.
///
/// Fields that do not apply to the target's variant are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPatch {
    /// New left edge.
    pub x: Option<f64>,
    /// New top edge.
    pub y: Option<f64>,
    /// New envelope width.
    pub width: Option<f64>,
    /// New envelope height.
    pub height: Option<f64>,
    /// New text content (text only).
    pub text: Option<String>,
    /// New font size (text and sticker).
    pub font_size: Option<f64>,
    /// New fill color (text and shape).
    pub color: Option<Color>,
    /// New shape variant (shape only).
    pub shape_kind: Option<ShapeKind>,
    /// New emoji (sticker only).
    pub emoji: Option<String>,
}

impl ObjectPatch {
    /// Patch that moves an object.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Apply the patch in place.
    ///
    /// A sticker's envelope follows its font size.
    pub fn apply(self, object: &mut SceneObject) {
        if let Some(x) = self.x {
            object.x = x;
        }
        if let Some(y) = self.y {
            object.y = y;
        }
        if let Some(width) = self.width {
            object.width = width;
        }
        if let Some(height) = self.height {
            object.height = height;
        }

        let mut sticker_size = None;
        match &mut object.kind {
            ObjectKind::Text {
                text,
                font_size,
                color,
            } => {
                if let Some(new_text) = self.text {
                    *text = new_text;
                }
                if let Some(size) = self.font_size {
                    *font_size = size;
                }
                if let Some(new_color) = self.color {
                    *color = new_color;
                }
            }
            ObjectKind::Shape { shape_kind, color } => {
                if let Some(kind) = self.shape_kind {
                    *shape_kind = kind;
                }
                if let Some(new_color) = self.color {
                    *color = new_color;
                }
            }
            ObjectKind::Sticker { emoji, font_size } => {
                if let Some(new_emoji) = self.emoji {
                    *emoji = new_emoji;
                }
                if let Some(size) = self.font_size {
                    *font_size = size;
                    sticker_size = Some(size);
                }
            }
        }
        if let Some(size) = sticker_size {
            object.width = size;
            object.height = size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_short_and_distinct() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_eq!(a.as_str().len(), ID_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = Bounds::new(10.0, 10.0, 20.0, 20.0);
        assert!(bounds.contains(10.0, 10.0));
        assert!(bounds.contains(30.0, 30.0));
        assert!(!bounds.contains(30.1, 15.0));
        assert!(!bounds.contains(15.0, 9.9));
    }

    #[test]
    fn test_wire_format_matches_card_data() {
        let object = SceneObject::with_id(
            ObjectId::from_string("k3j9x0a1b"),
            ObjectSpec::shape(ShapeKind::Triangle, Color::rgb(0x22, 0xc5, 0x5e)),
        );
        let value = serde_json::to_value(&object).expect("serialize");
        assert_eq!(value["id"], "k3j9x0a1b");
        assert_eq!(value["type"], "shape");
        assert_eq!(value["shape"], "triangle");
        assert_eq!(value["color"], "#22c55e");
        assert_eq!(value["width"], 160.0);
    }

    #[test]
    fn test_parse_stored_text_object() {
        let json = r##"{"id":"abc","type":"text","text":"Hi","fontSize":32,"color":"#000000",
            "x":100,"y":150,"width":560,"height":96}"##;
        let object: SceneObject = serde_json::from_str(json).expect("parse");
        assert_eq!(object.id.as_str(), "abc");
        assert_eq!(
            object.kind,
            ObjectKind::Text {
                text: "Hi".to_string(),
                font_size: 32.0,
                color: Color::BLACK,
            }
        );
        assert_eq!(object.bounds(), Bounds::new(100.0, 150.0, 560.0, 96.0));
    }

    #[test]
    fn test_patch_ignores_fields_of_other_variants() {
        let mut sticker = SceneObject::from_spec(ObjectSpec::sticker("🎉"));
        ObjectPatch {
            text: Some("ignored".to_string()),
            color: Some(Color::BLACK),
            font_size: Some(90.0),
            ..ObjectPatch::default()
        }
        .apply(&mut sticker);

        assert_eq!(
            sticker.kind,
            ObjectKind::Sticker {
                emoji: "🎉".to_string(),
                font_size: 90.0,
            }
        );
    }

    #[test]
    fn test_sticker_envelope_tracks_font_size() {
        let mut sticker = SceneObject::from_spec(ObjectSpec::sticker("🎉").at(200.0, 200.0));
        ObjectPatch {
            font_size: Some(120.0),
            ..ObjectPatch::default()
        }
        .apply(&mut sticker);
        assert_eq!(sticker.bounds(), Bounds::new(200.0, 200.0, 120.0, 120.0));

        let mut text = SceneObject::from_spec(ObjectSpec::text("Hi", 32.0, Color::BLACK));
        let before = text.bounds();
        ObjectPatch {
            font_size: Some(48.0),
            ..ObjectPatch::default()
        }
        .apply(&mut text);
        assert_eq!(text.bounds(), before);
    }

    #[test]
    fn test_text_spec_defaults() {
        let spec = ObjectSpec::text("Hi", 32.0, Color::BLACK);
        assert!((spec.width - 560.0).abs() < f64::EPSILON);
        assert!((spec.height - 96.0).abs() < f64::EPSILON);
        assert!((spec.x - 100.0).abs() < f64::EPSILON);
        assert!((spec.y - 150.0).abs() < f64::EPSILON);
    }
}

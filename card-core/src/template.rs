//! Built-in catalog of starting cards.

use std::sync::OnceLock;

use serde::Serialize;

use crate::{CardError, CardResult, Color, ObjectSpec, Scene, SceneObject};

/// A template entry: a scene object without an identity.
pub type TemplateObject = ObjectSpec;

/// An immutable predefined starting scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    /// Stable identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Short description.
    pub description: &'static str,
    /// Background fill.
    pub background_color: Color,
    /// Objects in paint order.
    pub objects: Vec<TemplateObject>,
}

impl Template {
    /// Create a fresh scene from this template.
    ///
    /// Objects are deep copies with newly generated ids; the template is left
    /// untouched.
    #[must_use]
    pub fn instantiate(&self) -> Scene {
        let objects = self
            .objects
            .iter()
            .cloned()
            .map(SceneObject::from_spec)
            .collect();
        tracing::debug!("Instantiating template {}", self.id);
        Scene::from_objects(self.background_color, objects)
    }
}

/// All built-in templates, in display order.
#[must_use]
pub fn list_templates() -> &'static [Template] {
    static CATALOG: OnceLock<Vec<Template>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

/// Look up a template by id.
///
/// # Errors
///
/// Returns [`CardError::UnknownTemplate`] if no template has this id.
pub fn find_template(id: &str) -> CardResult<&'static Template> {
    list_templates()
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| CardError::UnknownTemplate(id.to_string()))
}

fn text(content: &str, font_size: f64, color: Color, x: f64, y: f64, width: f64) -> TemplateObject {
    ObjectSpec::text(content, font_size, color)
        .at(x, y)
        .with_size(width, font_size * 3.0)
}

fn sticker(emoji: &str, font_size: f64, x: f64, y: f64) -> TemplateObject {
    ObjectSpec::sticker_sized(emoji, font_size).at(x, y)
}

fn build_catalog() -> Vec<Template> {
    vec![
        Template {
            id: "birthday",
            name: "🎂 Birthday",
            description: "Cake, confetti and warm wishes",
            background_color: Color::rgb(0xfe, 0xf3, 0xc7),
            objects: vec![
                text("Happy Birthday!", 44.0, Color::rgb(0x0f, 0x17, 0x2a), 80.0, 80.0, 640.0),
                text(
                    "Wishing you joy and every dream come true!",
                    24.0,
                    Color::rgb(0x37, 0x41, 0x51),
                    100.0,
                    160.0,
                    600.0,
                ),
                sticker("🎂", 90.0, 120.0, 300.0),
                sticker("🎉", 80.0, 500.0, 320.0),
            ],
        },
        Template {
            id: "womens-day",
            name: "🌸 International Women's Day",
            description: "Pink background and flowers",
            background_color: Color::rgb(0xfd, 0xf2, 0xf8),
            objects: vec![
                text("Happy March 8th!", 48.0, Color::rgb(0xbe, 0x18, 0x5d), 60.0, 100.0, 680.0),
                text("Be the happiest!", 26.0, Color::rgb(0x7c, 0x2d, 0x12), 90.0, 180.0, 620.0),
                sticker("💐", 100.0, 250.0, 320.0),
            ],
        },
        Template {
            id: "new-year",
            name: "🎄 New Year",
            description: "Dark background, a tree and stars",
            background_color: Color::rgb(0x02, 0x06, 0x17),
            objects: vec![
                text("Happy New Year!", 44.0, Color::rgb(0xe5, 0xe7, 0xeb), 100.0, 90.0, 600.0),
                text(
                    "Happiness, luck and new heights!",
                    24.0,
                    Color::rgb(0x94, 0xa3, 0xb8),
                    120.0,
                    170.0,
                    560.0,
                ),
                sticker("🎄", 110.0, 150.0, 320.0),
                sticker("✨", 70.0, 550.0, 350.0),
            ],
        },
        Template {
            id: "wedding",
            name: "💍 Wedding",
            description: "Soft pastel tones",
            background_color: Color::rgb(0xff, 0xf0, 0xf6),
            objects: vec![
                text(
                    "Congratulations on your wedding day!",
                    38.0,
                    Color::rgb(0x83, 0x18, 0x43),
                    100.0,
                    70.0,
                    600.0,
                ),
                sticker("💍", 100.0, 380.0, 220.0),
            ],
        },
        Template {
            id: "valentines",
            name: "❤️ Valentine's Day",
            description: "Red and pink with hearts",
            background_color: Color::rgb(0xff, 0xdd, 0xe1),
            objects: vec![
                text(
                    "Happy Valentine's Day!",
                    46.0,
                    Color::rgb(0xb0, 0x00, 0x3a),
                    80.0,
                    90.0,
                    640.0,
                ),
                sticker("❤️", 110.0, 350.0, 250.0),
            ],
        },
        Template {
            id: "newborn",
            name: "🍼 Newborn",
            description: "Baby blue and pink",
            background_color: Color::rgb(0xcd, 0xe9, 0xff),
            objects: vec![
                text("Welcome, little one!", 40.0, Color::rgb(0x00, 0x2d, 0x62), 70.0, 80.0, 660.0),
                sticker("🍼", 90.0, 300.0, 260.0),
            ],
        },
        Template {
            id: "thank-you",
            name: "🙏 Thank You",
            description: "Light and bright",
            background_color: Color::rgb(0xdb, 0xea, 0xfe),
            objects: vec![text(
                "Thank you!",
                48.0,
                Color::rgb(0x1e, 0x40, 0xaf),
                150.0,
                100.0,
                500.0,
            )],
        },
        Template {
            id: "corporate",
            name: "💼 Corporate",
            description: "Clean blue and grey",
            background_color: Color::rgb(0xf9, 0xfa, 0xfb),
            objects: vec![text(
                "Thank you for the partnership!",
                36.0,
                Color::rgb(0x0f, 0x17, 0x2a),
                120.0,
                120.0,
                560.0,
            )],
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_catalog_covers_all_occasions() {
        let ids: Vec<_> = list_templates().iter().map(|t| t.id).collect();
        assert_eq!(
            ids,
            vec![
                "birthday",
                "womens-day",
                "new-year",
                "wedding",
                "valentines",
                "newborn",
                "thank-you",
                "corporate"
            ]
        );
    }

    #[test]
    fn test_instantiate_copies_geometry_with_fresh_ids() {
        let template = find_template("birthday").expect("birthday");
        let first = template.instantiate();
        let second = template.instantiate();

        assert_eq!(first.background_color, template.background_color);
        assert_eq!(first.len(), template.objects.len());
        for (object, spec) in first.objects().iter().zip(&template.objects) {
            assert_eq!(&object.to_spec(), spec);
        }

        let first_ids: HashSet<_> = first.ids().collect();
        assert!(second.ids().all(|id| !first_ids.contains(id)));
    }

    #[test]
    fn test_unknown_template() {
        assert!(matches!(
            find_template("halloween"),
            Err(CardError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_sticker_envelope_tracks_font_size() {
        let template = find_template("new-year").expect("new-year");
        for object in &template.objects {
            if let crate::ObjectKind::Sticker { font_size, .. } = object.kind {
                assert!((object.width - font_size).abs() < f64::EPSILON);
                assert!((object.height - font_size).abs() < f64::EPSILON);
            }
        }
    }
}

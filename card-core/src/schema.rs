//! Serialized card data exchanged with the card store.
//!
//! The stored form is exactly `{ "bgColor": ..., "objects": [...] }`. Object
//! ids are optional on input: missing or duplicate ids are regenerated when
//! the document is turned back into a [`Scene`], while geometry, content and
//! order are preserved as stored.

use serde::{Deserialize, Serialize};

use crate::{CardError, CardResult, Color, ObjectId, ObjectSpec, Scene, SceneObject};

/// Document-friendly object description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDocument {
    /// Object identifier, if one was stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Geometry and content.
    #[serde(flatten)]
    pub spec: ObjectSpec,
}

impl From<&SceneObject> for ObjectDocument {
    fn from(object: &SceneObject) -> Self {
        Self {
            id: Some(object.id.clone()),
            spec: object.to_spec(),
        }
    }
}

/// Canonical card document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDocument {
    /// Background fill.
    #[serde(rename = "bgColor", alias = "backgroundColor", default)]
    pub background_color: Color,
    /// Objects in paint order.
    #[serde(default)]
    pub objects: Vec<ObjectDocument>,
}

impl CardDocument {
    /// Build a document from a runtime scene.
    #[must_use]
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            background_color: scene.background_color,
            objects: scene.objects().iter().map(ObjectDocument::from).collect(),
        }
    }

    /// Materialize the document as a scene.
    #[must_use]
    pub fn into_scene(self) -> Scene {
        let objects = self
            .objects
            .into_iter()
            .map(|doc| match doc.id {
                Some(id) => SceneObject::with_id(id, doc.spec),
                None => SceneObject::from_spec(doc.spec),
            })
            .collect();
        Scene::from_objects(self.background_color, objects)
    }

    /// Serialize to the stored JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CardResult<String> {
        serde_json::to_string(self).map_err(CardError::Serialization)
    }

    /// Parse a stored JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a valid card document.
    pub fn from_json(json: &str) -> CardResult<Self> {
        serde_json::from_str(json).map_err(CardError::Serialization)
    }
}

impl From<&Scene> for CardDocument {
    fn from(scene: &Scene) -> Self {
        Self::from_scene(scene)
    }
}

//! The editable card: background color plus ordered objects.

use serde::{Deserialize, Serialize};

use crate::{CardError, CardResult, Color, ObjectId, ObjectPatch, ObjectSpec, SceneObject};

/// A scene containing all card objects.
///
/// `objects` is kept in paint order: later entries are drawn on top.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scene {
    /// Fill color of the whole surface.
    #[serde(rename = "bgColor", alias = "backgroundColor")]
    pub background_color: Color,
    /// Objects in paint order.
    objects: Vec<SceneObject>,
}

impl Scene {
    /// Create a new empty scene with the given background.
    #[must_use]
    pub fn new(background_color: Color) -> Self {
        Self {
            background_color,
            objects: Vec::new(),
        }
    }

    /// Build a scene from already materialized objects, keeping their order.
    ///
    /// Duplicate ids are replaced with fresh ones.
    #[must_use]
    pub fn from_objects(background_color: Color, objects: Vec<SceneObject>) -> Self {
        let mut scene = Self::new(background_color);
        for object in objects {
            scene.insert_object(object);
        }
        scene
    }

    /// Add an object built from `spec` on top of the paint order.
    pub fn add_object(&mut self, spec: ObjectSpec) -> ObjectId {
        self.insert_object(SceneObject::from_spec(spec))
    }

    /// Append an object, regenerating its id if it is already taken.
    pub fn insert_object(&mut self, mut object: SceneObject) -> ObjectId {
        while self.contains(&object.id) {
            tracing::debug!("Regenerating colliding object id {}", object.id);
            object.id = ObjectId::new();
        }
        let id = object.id.clone();
        tracing::debug!("Added {} object {id}", object.kind.label());
        self.objects.push(object);
        id
    }

    /// Remove an object from the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn remove_object(&mut self, id: &ObjectId) -> CardResult<SceneObject> {
        let index = self
            .objects
            .iter()
            .position(|o| &o.id == id)
            .ok_or_else(|| CardError::ObjectNotFound(id.to_string()))?;
        tracing::debug!("Removed object {id}");
        Ok(self.objects.remove(index))
    }

    /// Apply a partial update to an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn update_object(&mut self, id: &ObjectId, patch: ObjectPatch) -> CardResult<()> {
        let object = self
            .find_mut(id)
            .ok_or_else(|| CardError::ObjectNotFound(id.to_string()))?;
        patch.apply(object);
        Ok(())
    }

    /// Get an object by ID.
    #[must_use]
    pub fn find(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| &o.id == id)
    }

    /// Get a mutable reference to an object by ID.
    pub fn find_mut(&mut self, id: &ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| &o.id == id)
    }

    /// Whether an object with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.iter().any(|o| &o.id == id)
    }

    /// All objects in paint order.
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Ids of all objects in paint order.
    pub fn ids(&self) -> impl Iterator<Item = &ObjectId> {
        self.objects.iter().map(|o| &o.id)
    }

    /// Find the topmost object whose envelope contains the point.
    #[must_use]
    pub fn object_at(&self, x: f64, y: f64) -> Option<&SceneObject> {
        self.objects.iter().rev().find(|o| o.contains_point(x, y))
    }

    /// Get the number of objects in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scene has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Serialize the scene to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CardResult<String> {
        serde_json::to_string(self).map_err(CardError::Serialization)
    }

    /// Deserialize a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> CardResult<Self> {
        serde_json::from_str(json).map_err(CardError::Serialization)
    }
}

/// Find the topmost object in `scene` whose envelope contains the point.
///
/// Objects are tested in reverse paint order against their bounding boxes,
/// so a click inside a triangle's or circle's box but outside its silhouette
/// still selects it.
#[must_use]
pub fn hit_test(scene: &Scene, x: f64, y: f64) -> Option<&SceneObject> {
    scene.object_at(x, y)
}

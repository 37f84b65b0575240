//! Interaction controller: pointer, touch and keyboard handling.
//!
//! A drag is one history entry, committed on release. Arrow-key nudges are
//! grouped into one entry per burst, committed on key release. Gestures that
//! end where they started commit nothing.

use card_core::{
    InputEvent, Key, KeyModifiers, ObjectId, PointerPhase, TouchEvent, TouchPhase,
};

use super::EditorSession;

/// Gesture state.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// No gesture in progress.
    Idle,
    /// An object follows the pointer.
    Dragging {
        /// Dragged object.
        id: ObjectId,
        /// Pointer position relative to the object's top-left corner.
        offset: (f64, f64),
    },
}

/// What the host should do after an input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct EventOutcome {
    /// A new frame was rendered.
    pub redraw: bool,
    /// A history entry was committed.
    pub committed: bool,
    /// The platform default (scrolling, page keys) should be suppressed.
    pub prevent_default: bool,
    /// The user asked to save the card.
    pub save_requested: bool,
}

impl EventOutcome {
    fn redrawn() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    fn consumed(mut self) -> Self {
        self.prevent_default = true;
        self
    }
}

impl EditorSession {
    /// Interpret one input event.
    ///
    /// Pointer and touch coordinates are in displayed pixels and are
    /// converted to logical units through the viewport.
    pub fn handle_event(&mut self, event: &InputEvent) -> EventOutcome {
        match event {
            InputEvent::Pointer { phase, x, y } => {
                let (x, y) = self.viewport.to_logical(*x, *y);
                match phase {
                    PointerPhase::Down => self.pointer_down(x, y),
                    PointerPhase::Move => self.pointer_move(x, y),
                    PointerPhase::Up => self.pointer_up(),
                }
            }
            InputEvent::Touch(touch) => self.touch(touch),
            InputEvent::Key {
                key,
                pressed: true,
                modifiers,
            } => self.key_down(key, *modifiers),
            InputEvent::Key {
                key, pressed: false, ..
            } => self.key_up(key),
        }
    }

    fn pointer_down(&mut self, x: f64, y: f64) -> EventOutcome {
        let mut committed = self.finish_drag();

        let hit = self
            .scene
            .object_at(x, y)
            .map(|o| (o.id.clone(), (x - o.x, y - o.y)));

        let mut outcome = match hit {
            Some((id, offset)) => {
                tracing::trace!("Grabbed {id} at ({x}, {y})");
                committed |= self.finish_nudge();
                self.selection = Some(id.clone());
                self.drag_start = Some(self.scene.clone());
                self.interaction = Interaction::Dragging { id, offset };
                EventOutcome::redrawn().consumed()
            }
            None => {
                self.selection = None;
                EventOutcome::redrawn()
            }
        };
        self.redraw();
        outcome.committed = committed;
        outcome
    }

    fn pointer_move(&mut self, x: f64, y: f64) -> EventOutcome {
        let Interaction::Dragging { id, offset } = &self.interaction else {
            return EventOutcome::default();
        };
        let (left, top) = (x - offset.0, y - offset.1);
        let id = id.clone();

        match self.scene.find_mut(&id) {
            Some(object) => object.move_to(left, top),
            None => {
                // The object vanished under the pointer; drop the gesture.
                self.interaction = Interaction::Idle;
                self.drag_start = None;
                return EventOutcome::default();
            }
        }
        self.redraw();
        EventOutcome::redrawn().consumed()
    }

    fn pointer_up(&mut self) -> EventOutcome {
        let was_dragging = matches!(self.interaction, Interaction::Dragging { .. });
        let committed = self.finish_drag();
        let outcome = EventOutcome {
            committed,
            ..EventOutcome::default()
        };
        if was_dragging {
            outcome.consumed()
        } else {
            outcome
        }
    }

    fn touch(&mut self, touch: &TouchEvent) -> EventOutcome {
        match touch.phase {
            TouchPhase::Start | TouchPhase::Move => {
                let Some(point) = touch.primary_touch() else {
                    return EventOutcome::default();
                };
                let (x, y) = self.viewport.to_logical(point.x, point.y);
                if touch.phase == TouchPhase::Start {
                    self.pointer_down(x, y)
                } else {
                    self.pointer_move(x, y)
                }
            }
            TouchPhase::End | TouchPhase::Cancel => self.pointer_up(),
        }
    }

    fn key_down(&mut self, key: &Key, modifiers: KeyModifiers) -> EventOutcome {
        if modifiers.shortcut() && key.is_char('s') {
            return EventOutcome {
                save_requested: true,
                ..EventOutcome::default()
            }
            .consumed();
        }

        let Some(id) = self.selection.clone() else {
            return EventOutcome::default();
        };

        if let Some((dx, dy)) = key.nudge(self.config.nudge_step) {
            if self.nudge_start.is_none() {
                self.nudge_start = Some(self.scene.clone());
            }
            if let Some(object) = self.scene.find_mut(&id) {
                object.move_to(object.x + dx, object.y + dy);
            }
            self.redraw();
            return EventOutcome::redrawn().consumed();
        }

        if key.is_delete() && self.delete_selected() {
            return EventOutcome {
                committed: true,
                ..EventOutcome::redrawn()
            }
            .consumed();
        }

        EventOutcome::default()
    }

    fn key_up(&mut self, key: &Key) -> EventOutcome {
        if !key.is_arrow() {
            return EventOutcome::default();
        }
        EventOutcome {
            committed: self.finish_nudge(),
            ..EventOutcome::default()
        }
    }

    /// End a drag, committing the scene from before it if anything moved.
    pub(super) fn finish_drag(&mut self) -> bool {
        if std::mem::replace(&mut self.interaction, Interaction::Idle) == Interaction::Idle {
            return false;
        }
        match self.drag_start.take() {
            Some(before) => self.commit_snapshot(&before),
            None => false,
        }
    }

    /// End a nudge burst, committing the scene from before it if anything
    /// moved.
    pub(super) fn finish_nudge(&mut self) -> bool {
        match self.nudge_start.take() {
            Some(before) => self.commit_snapshot(&before),
            None => false,
        }
    }
}

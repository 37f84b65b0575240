//! # Cardsmith Core
//!
//! The in-memory model behind the greeting-card editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 card-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Scene           │  History                 │
//! │  - Objects       │  - Undo stack (bounded)  │
//! │  - Background    │  - Redo stack            │
//! │  - Hit-testing   │                          │
//! ├─────────────────────────────────────────────┤
//! │  Templates       │  Input events            │
//! │  - Catalog       │  - Pointer / touch       │
//! │  - Instantiation │  - Keyboard              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Paint order is list order: later objects are drawn on top and win
//! hit-tests.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod element;
pub mod error;
pub mod event;
pub mod history;
pub mod scene;
pub mod schema;
pub mod template;

pub use color::Color;
pub use element::{Bounds, ObjectId, ObjectKind, ObjectPatch, ObjectSpec, SceneObject, ShapeKind};
pub use error::{CardError, CardResult};
pub use event::{InputEvent, Key, KeyModifiers, PointerPhase, TouchEvent, TouchPhase, TouchPoint};
pub use history::{History, DEFAULT_HISTORY_DEPTH};
pub use scene::{hit_test, Scene};
pub use schema::{CardDocument, ObjectDocument};
pub use template::{find_template, list_templates, Template, TemplateObject};

/// Card core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Width of the logical drawing surface.
pub const LOGICAL_WIDTH: f64 = 800.0;

/// Height of the logical drawing surface.
pub const LOGICAL_HEIGHT: f64 = 500.0;

//! # Cardsmith Editor
//!
//! The editing session for greeting cards: input interpretation, history
//! commit boundaries, debounced autosave and the card store client.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   events   ┌─────────────────────────────────────┐
//! │ Host (DOM,   │──────────▶│ EditorSession                       │
//! │ window, CLI) │◀──────────│  scene · history · selection · drag │
//! └──────────────┘  frames    └──────┬──────────────────┬───────────┘
//!                                    │ redraw           │ save/load
//!                             ┌──────▼─────┐     ┌──────▼──────┐
//!                             │  Renderer  │     │  Autosave   │──▶ CardStore
//!                             └────────────┘     └─────────────┘   (HTTP/mem)
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod autosave;
pub mod config;
pub mod error;
pub mod output;
pub mod session;
pub mod store;

pub use auth::{AuthProvider, TokenAuth};
pub use autosave::Autosave;
pub use config::EditorConfig;
pub use error::{EditorError, EditorResult, StoreError, StoreResult};
pub use output::write_image;
pub use session::{
    parse_font_size, CardListing, EditorSession, EventOutcome, Interaction, SelectionInfo,
};
pub use store::{default_title, Card, CardId, CardStore, CardUpdate, HttpCardStore, MemoryCardStore};

/// Editor version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

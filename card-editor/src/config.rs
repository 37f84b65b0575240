//! Editor configuration with environment overrides.

use std::time::Duration;

use card_core::{DEFAULT_HISTORY_DEPTH, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use card_renderer::RendererConfig;

/// Default card store base URL.
pub const DEFAULT_STORE_URL: &str = "http://localhost:3000/api";

/// Default autosave debounce.
pub const DEFAULT_AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(2000);

/// Default keyboard nudge step in logical units.
pub const DEFAULT_NUDGE_STEP: f64 = 3.0;

/// Settings for an [`EditorSession`](crate::EditorSession).
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Logical surface width.
    pub logical_width: f64,
    /// Logical surface height.
    pub logical_height: f64,
    /// Maximum number of undo entries.
    pub history_depth: usize,
    /// Quiet period after the last redraw before an autosave fires.
    pub autosave_debounce: Duration,
    /// Distance moved per arrow key press.
    pub nudge_step: f64,
    /// Selection outline styling.
    pub renderer: RendererConfig,
    /// Draw the selection outline into exported images.
    pub export_selection: bool,
    /// Card store base URL.
    pub store_url: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            logical_width: LOGICAL_WIDTH,
            logical_height: LOGICAL_HEIGHT,
            history_depth: DEFAULT_HISTORY_DEPTH,
            autosave_debounce: DEFAULT_AUTOSAVE_DEBOUNCE,
            nudge_step: DEFAULT_NUDGE_STEP,
            renderer: RendererConfig::default(),
            export_selection: true,
            store_url: DEFAULT_STORE_URL.to_string(),
        }
    }
}

impl EditorConfig {
    /// Defaults overridden by `CARD_HISTORY_DEPTH`, `CARD_AUTOSAVE_MS` and
    /// `CARD_STORE_URL`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("CARD_HISTORY_DEPTH") {
            match raw.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => config.history_depth = depth,
                _ => tracing::warn!("Ignoring invalid CARD_HISTORY_DEPTH={raw:?}"),
            }
        }

        if let Some(raw) = lookup("CARD_AUTOSAVE_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.autosave_debounce = Duration::from_millis(ms),
                Err(_) => tracing::warn!("Ignoring invalid CARD_AUTOSAVE_MS={raw:?}"),
            }
        }

        if let Some(url) = lookup("CARD_STORE_URL").filter(|u| !u.trim().is_empty()) {
            config.store_url = url;
        }

        config
    }
}

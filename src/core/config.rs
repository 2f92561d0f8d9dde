use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PageError;

pub const DEFAULT_CAROUSEL_ID: &str = "videoCarousel";
pub const DEFAULT_ACTIVE_CLASS: &str = "active";
pub const DEFAULT_ROTATE_INTERVAL_MS: u32 = 8_000;
pub const DEFAULT_GAME_CANVAS_ID: &str = "gameCanvas";
pub const DEFAULT_GAME_MODULE_URL: &str = "./wasm_out/fishy_redux.js";
pub const DEFAULT_GAME_INIT_EXPORT: &str = "default";

/// Browser timers take a signed 32-bit delay.
pub const MAX_ROTATE_INTERVAL_MS: u32 = i32::MAX as u32;

/// Element ids, class names and timings the page script relies on.
///
/// Every field has a default matching the shipped page markup, so an empty JSON
/// object (or no config at all) yields the stock behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_carousel_id")]
    pub carousel_id: String,
    #[serde(default = "default_active_class")]
    pub active_class: String,
    #[serde(default = "default_rotate_interval_ms")]
    pub rotate_interval_ms: u32,
    #[serde(default = "default_game_canvas_id")]
    pub game_canvas_id: String,
    /// Resolved against the document base URI before import.
    #[serde(default = "default_game_module_url")]
    pub game_module_url: String,
    /// Export awaited after import; wasm-bindgen glue exposes its init as `default`.
    #[serde(default = "default_game_init_export")]
    pub game_init_export: String,
}

fn default_carousel_id() -> String {
    DEFAULT_CAROUSEL_ID.to_string()
}

fn default_active_class() -> String {
    DEFAULT_ACTIVE_CLASS.to_string()
}

fn default_rotate_interval_ms() -> u32 {
    DEFAULT_ROTATE_INTERVAL_MS
}

fn default_game_canvas_id() -> String {
    DEFAULT_GAME_CANVAS_ID.to_string()
}

fn default_game_module_url() -> String {
    DEFAULT_GAME_MODULE_URL.to_string()
}

fn default_game_init_export() -> String {
    DEFAULT_GAME_INIT_EXPORT.to_string()
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            carousel_id: default_carousel_id(),
            active_class: default_active_class(),
            rotate_interval_ms: default_rotate_interval_ms(),
            game_canvas_id: default_game_canvas_id(),
            game_module_url: default_game_module_url(),
            game_init_export: default_game_init_export(),
        }
    }
}

impl PageConfig {
    pub fn from_json(raw: &str) -> Result<Self, PageError> {
        let cfg: PageConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Config from an optional page-supplied JSON blob. Absent input gives the
    /// defaults; bad input is logged and also gives the defaults.
    pub fn from_optional_json(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match Self::from_json(raw) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("page: ignoring page config: {e}");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), PageError> {
        if self.rotate_interval_ms == 0 {
            return Err(PageError::InvalidConfig(
                "rotate_interval_ms must be positive".to_string(),
            ));
        }
        if self.rotate_interval_ms > MAX_ROTATE_INTERVAL_MS {
            return Err(PageError::InvalidConfig(format!(
                "rotate_interval_ms must be at most {MAX_ROTATE_INTERVAL_MS}"
            )));
        }
        let required = [
            ("carousel_id", &self.carousel_id),
            ("active_class", &self.active_class),
            ("game_canvas_id", &self.game_canvas_id),
            ("game_module_url", &self.game_module_url),
            ("game_init_export", &self.game_init_export),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(PageError::InvalidConfig(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }

    pub fn rotate_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.rotate_interval_ms))
    }
}

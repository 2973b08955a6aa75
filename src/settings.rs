//! Game configuration
//!
//! Defaults are compiled in. A page can override any subset by embedding a
//! JSON block (`<script type="application/json" id="game-config">`); native
//! builds read the file named by `BATTERY_DASH_CONFIG`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::Sprite;
use crate::consts::ASSET_TIMEOUT_MS;
use crate::sim::KeyBindings;
use crate::tuning::Tuning;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Image locations, relative to the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub player: String,
    pub background: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            player: "img/kvad.png".into(),
            background: "img/fon.jpg".into(),
        }
    }
}

impl AssetPaths {
    pub fn url(&self, sprite: Sprite) -> &str {
        match sprite {
            Sprite::Player => &self.player,
            Sprite::Background => &self.background,
        }
    }
}

/// Everything configurable about the game
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tuning: Tuning,
    pub bindings: KeyBindings,
    pub assets: AssetPaths,
    /// Give up on image loading after this many milliseconds
    pub asset_timeout_ms: Option<u32>,
    /// Fixed RNG seed (otherwise derived from the clock)
    pub seed: Option<u64>,
}

/// Longest delay a browser timer accepts
pub const MAX_PERIOD_MS: u32 = i32::MAX as u32;

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl Settings {
    /// Page element holding JSON overrides
    pub const CONFIG_ELEMENT_ID: &'static str = "game-config";
    /// Native config file path variable
    pub const CONFIG_ENV: &'static str = "BATTERY_DASH_CONFIG";

    /// Parse and validate a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.bindings = settings.bindings.normalized();
        settings.validate()?;
        Ok(settings)
    }

    pub fn asset_timeout_ms(&self) -> u32 {
        self.asset_timeout_ms.unwrap_or(ASSET_TIMEOUT_MS)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tuning;
        if !(t.surface_width > 0.0 && t.surface_height > 0.0) {
            return Err(invalid("tuning.surface_*", "surface must have positive size"));
        }
        if t.player_size <= 0.0 || t.player_size >= t.surface_height {
            return Err(invalid("tuning.player_size", "must fit inside the surface"));
        }
        if t.player_step <= 0.0 {
            return Err(invalid("tuning.player_step", "must be positive"));
        }
        if t.wall_width <= 0.0 {
            return Err(invalid("tuning.wall_width", "must be positive"));
        }
        if t.wall_min_height >= t.wall_max_height {
            return Err(invalid(
                "tuning.wall_min_height",
                format!(
                    "{} must be below wall_max_height {}",
                    t.wall_min_height, t.wall_max_height
                ),
            ));
        }
        if t.wall_max_height as f32 > t.surface_height {
            return Err(invalid("tuning.wall_max_height", "taller than the surface"));
        }
        if t.spawn_spacing <= 0.0 || t.scroll_speed <= 0.0 {
            return Err(invalid(
                "tuning.spawn_spacing",
                "spacing and scroll speed must be positive",
            ));
        }
        if t.pickup_radius <= 0.0 || t.pickup_reach <= 0.0 {
            return Err(invalid("tuning.pickup_radius", "must be positive"));
        }
        if t.pickup_floor >= t.surface_height {
            return Err(invalid("tuning.pickup_floor", "leaves no room for batteries"));
        }
        if t.max_power == 0 || t.max_power > 100 {
            return Err(invalid("tuning.max_power", "must be in 1..=100"));
        }
        if t.start_power == 0 || t.start_power > t.max_power {
            return Err(invalid("tuning.start_power", "must be in 1..=max_power"));
        }
        if t.clock_period_ms == 0 || t.input_period_ms == 0 {
            return Err(invalid("tuning.*_period_ms", "timer periods must be positive"));
        }
        if t.clock_period_ms > MAX_PERIOD_MS || t.input_period_ms > MAX_PERIOD_MS {
            return Err(invalid(
                "tuning.*_period_ms",
                format!("timer periods must not exceed {}ms", MAX_PERIOD_MS),
            ));
        }
        if self.bindings.up.is_empty() || self.bindings.down.is_empty() {
            return Err(invalid("bindings", "both actions need at least one key"));
        }
        if let Some(key) = self.bindings.conflict() {
            return Err(invalid("bindings", format!("{:?} is bound to both actions", key)));
        }
        match self.asset_timeout_ms {
            Some(0) => return Err(invalid("asset_timeout_ms", "must be positive")),
            Some(ms) if ms > MAX_PERIOD_MS => {
                return Err(invalid("asset_timeout_ms", "too long for a browser timer"));
            }
            _ => {}
        }
        Ok(())
    }

    /// Load overrides from the page, falling back to defaults (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        let Some(json) = json else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from #{}", Self::CONFIG_ELEMENT_ID);
                settings
            }
            Err(e) => {
                log::error!("Ignoring page config: {}", e);
                Self::default()
            }
        }
    }

    /// Load overrides from `BATTERY_DASH_CONFIG`, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::CONFIG_ENV) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::from_file(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::error!("Ignoring config: {}", e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

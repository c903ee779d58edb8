// SPDX-License-Identifier: GPL-3.0-only

use crate::app_settings;
use crate::engine::RescaleSettings;
use crate::presets::ParseError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;

/// Settings a host keeps per node, loaded from JSON.
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Where the preset store is persisted.
    pub store_path: String,
    /// Category selected at start.
    pub category: String,
    /// Categories with calc mode enabled.
    pub calc_enabled: Vec<String>,
    /// Auto-resize mode and targets.
    pub rescale: RescaleSettings,
    /// Multiple used by the snap action.
    pub snap: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: app_settings::DEFAULT_STORE_FILE.to_string(),
            category: app_settings::DEFAULT_CATEGORY.to_string(),
            calc_enabled: Vec::new(),
            rescale: RescaleSettings::default(),
            snap: app_settings::DEFAULT_SNAP,
        }
    }
}

impl Config {
    /// Loads the configuration, falling back to defaults when the file is absent.
    pub fn load(path: &str) -> Result<Self, ParseError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Config '{}' not found, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(ParseError::io_error_with_path(e, path)),
        };

        let config: Config =
            serde_json::from_str(&json).map_err(|e| ParseError::json_error(e).with_path(path))?;
        tracing::info!("Loaded config from '{}'", path);
        Ok(config)
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Built-in preset catalog shipped inside the binary.
//!
//! The catalog lives in `resources/presets/builtin.json` and is embedded at
//! compile time. It is read-only: the store overlays custom presets and hidden
//! flags on top of it but never changes it.

use crate::presets::parser::parse_catalog;
use crate::presets::types::{Catalog, ParseError};
use rust_embed::RustEmbed;

/// File name of the built-in catalog inside the embedded folder.
pub const BUILTIN_CATALOG_FILE: &str = "builtin.json";

#[derive(RustEmbed)]
#[folder = "resources/presets/"]
struct PresetAssets;

/// Loads the embedded built-in catalog.
pub fn load_builtin_catalog() -> Result<Catalog, ParseError> {
    let file = PresetAssets::get(BUILTIN_CATALOG_FILE).ok_or_else(|| {
        ParseError::io_error_with_path(
            std::io::Error::new(std::io::ErrorKind::NotFound, "embedded catalog missing"),
            BUILTIN_CATALOG_FILE,
        )
    })?;

    let json = std::str::from_utf8(&file.data).map_err(|e| {
        ParseError::io_error_with_path(
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            BUILTIN_CATALOG_FILE,
        )
    })?;

    let result = parse_catalog(json).map_err(|e| e.with_path(BUILTIN_CATALOG_FILE))?;
    tracing::debug!(
        "Loaded built-in catalog with {} categories",
        result.value.len()
    );
    Ok(result.into_value())
}

// ============================================================================
// Tests
// ============================================================================

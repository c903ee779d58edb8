// SPDX-License-Identifier: GPL-3.0-only

//! Rescale factors for the auto-resize modes.
//!
//! - **Manual**: the stored factor is used as-is.
//! - **Resolution**: a "P" label (e.g. 1080) stands for a 16:9 frame of that
//!   height; the factor reaches that frame's pixel count.
//! - **Megapixels**: the factor reaches the requested megapixel count.

use crate::app_settings::{
    DEFAULT_MANUAL_SCALE, DEFAULT_TARGET_MEGAPIXELS, DEFAULT_TARGET_RESOLUTION,
    PIXELS_PER_MEGAPIXEL, RESOLUTION_REFERENCE_ASPECT,
};
use crate::engine::fitting::round_to_multiple;
use crate::presets::Dimension;
use serde::{Deserialize, Serialize};

/// Which value drives the auto-resize factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RescaleMode {
    #[default]
    Manual,
    Resolution,
    Megapixels,
}

/// Uniform factor that brings `current` to the pixel count of a 16:9 frame
/// `target_p` pixels tall.
pub fn resolution_scale(target_p: f64, current: Dimension) -> f64 {
    let target_pixels = target_p * RESOLUTION_REFERENCE_ASPECT * target_p;
    (target_pixels / current.pixels() as f64).sqrt()
}

/// Uniform factor that brings `current` to `target_mp` megapixels.
pub fn megapixels_scale(target_mp: f64, current: Dimension) -> f64 {
    (target_mp * PIXELS_PER_MEGAPIXEL / current.pixels() as f64).sqrt()
}

/// Rescale mode plus the value each mode reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RescaleSettings {
    pub mode: RescaleMode,
    pub manual_scale: f64,
    /// Target height of the 16:9 reference frame, e.g. 1080
    pub target_resolution: f64,
    pub target_megapixels: f64,
}

impl Default for RescaleSettings {
    fn default() -> Self {
        Self {
            mode: RescaleMode::Manual,
            manual_scale: DEFAULT_MANUAL_SCALE,
            target_resolution: DEFAULT_TARGET_RESOLUTION,
            target_megapixels: DEFAULT_TARGET_MEGAPIXELS,
        }
    }
}

impl RescaleSettings {
    /// Scale factor the current mode produces for `current`.
    pub fn scale_factor(&self, current: Dimension) -> f64 {
        match self.mode {
            RescaleMode::Manual => self.manual_scale,
            RescaleMode::Resolution => resolution_scale(self.target_resolution, current),
            RescaleMode::Megapixels => megapixels_scale(self.target_megapixels, current),
        }
    }
}

/// Multiplies both sides by `factor`, rounding each side and keeping it at least 1.
///
/// Non-positive or non-finite factors leave the dimension unchanged.
pub fn apply_scale(current: Dimension, factor: f64) -> Dimension {
    if !(factor.is_finite() && factor > 0.0) {
        return current;
    }
    let scale = |side: u32| ((side as f64 * factor).round() as u32).max(1);
    Dimension::new(scale(current.width), scale(current.height))
}

/// Rounds both sides to the nearest multiple of `multiple`, never below it.
pub fn snap_to_multiple(current: Dimension, multiple: u32) -> Dimension {
    if multiple <= 1 {
        return current;
    }
    let snap = |side: u32| round_to_multiple(side as f64, multiple).max(multiple);
    Dimension::new(snap(current.width), snap(current.height))
}

// ============================================================================
// Tests
// ============================================================================

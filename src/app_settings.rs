// SPDX-License-Identifier: GPL-3.0-only

//! Centralized application settings and constants.

/// Application name used for log filtering and default file names.
pub const APP_NAME: &str = "resolution-master";

/// Default file the command-line host persists the preset store to.
pub const DEFAULT_STORE_FILE: &str = "resolution-master-presets.json";

/// Default file the command-line host reads its configuration from.
pub const DEFAULT_CONFIG_FILE: &str = "resolution-master.json";

/// Category selected when no configuration says otherwise.
pub const DEFAULT_CATEGORY: &str = "Standard";

/// Two aspect ratios closer than this are considered equal.
pub const ASPECT_TOLERANCE: f64 = 0.01;

/// Pixel count of one megapixel.
pub const PIXELS_PER_MEGAPIXEL: f64 = 1_000_000.0;

/// Width-to-height ratio of the reference frame a "P" resolution label implies.
pub const RESOLUTION_REFERENCE_ASPECT: f64 = 16.0 / 9.0;

/// Default manual scale factor.
pub const DEFAULT_MANUAL_SCALE: f64 = 1.0;

/// Default target resolution for the resolution rescale mode (1080p).
pub const DEFAULT_TARGET_RESOLUTION: f64 = 1080.0;

/// Default target megapixels for the megapixels rescale mode.
pub const DEFAULT_TARGET_MEGAPIXELS: f64 = 2.0;

/// Default snap multiple applied by the snap action.
pub const DEFAULT_SNAP: u32 = 64;

// ============================================================================
// Model limits
// ============================================================================

/// Flux: maximum total megapixels.
pub const FLUX_MAX_MEGAPIXELS: f64 = 4.0;
/// Flux: longest side limit in pixels.
pub const FLUX_MAX_DIMENSION: u32 = 2560;
/// Flux: shortest side limit in pixels.
pub const FLUX_MIN_DIMENSION: u32 = 320;
/// Flux: dimensions are rounded to this multiple.
pub const FLUX_MULTIPLE: u32 = 32;

/// Flux.2: maximum total megapixels.
pub const FLUX2_MAX_MEGAPIXELS: f64 = 6.0;
/// Flux.2: longest side limit in pixels.
pub const FLUX2_MAX_DIMENSION: u32 = 3840;
/// Flux.2: shortest side limit in pixels.
pub const FLUX2_MIN_DIMENSION: u32 = 320;
/// Flux.2: dimensions are rounded to this multiple.
pub const FLUX2_MULTIPLE: u32 = 16;

/// WAN: minimum total pixel count.
pub const WAN_MIN_PIXELS: u64 = 182_080;
/// WAN: maximum total pixel count.
pub const WAN_MAX_PIXELS: u64 = 1_195_560;
/// WAN: dimensions are rounded to this multiple.
pub const WAN_MULTIPLE: u32 = 16;

/// Qwen-Image: minimum total pixel count (768x768).
pub const QWEN_MIN_PIXELS: u64 = 589_824;
/// Qwen-Image: maximum total pixel count (2048x2048).
pub const QWEN_MAX_PIXELS: u64 = 4_194_304;

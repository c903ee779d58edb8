// SPDX-License-Identifier: GPL-3.0-only

//! Resolution calculations.
//!
//! Pure functions over dimensions and preset lists: closest-preset matching,
//! aspect-ratio fitting, model-specific fitting strategies, and rescale
//! factors. Nothing here knows how values are displayed or stored.
//!
//! # Example
//!
//! ```rust,ignore
//! use resolution_master::engine::{apply_auto_fit, CalcStrategy};
//! use resolution_master::presets::Dimension;
//!
//! let presets = store.category_presets("Flux", &builtins, false);
//! let strategy = CalcStrategy::for_category("Flux");
//! if let Some(fitted) = apply_auto_fit(Dimension::new(1200, 1000), true, strategy, &presets) {
//!     host.set_size(fitted.width, fitted.height);
//! }
//! ```

pub mod fitting;
pub mod matching;
pub mod scale;

pub use fitting::{
    apply_auto_fit, fit_flux, fit_qwen_image, fit_wan, round_to_multiple, CalcStrategy,
    FluxLimits, FLUX, FLUX_2,
};
pub use matching::{
    aspects_match, find_closest_preset, scale_to_nearest_preset_aspect_ratio,
    scale_to_preset_aspect_ratio, PresetMatch,
};
pub use scale::{
    apply_scale, megapixels_scale, resolution_scale, snap_to_multiple, RescaleMode,
    RescaleSettings,
};

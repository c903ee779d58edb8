// SPDX-License-Identifier: GPL-3.0-only

//! Model-specific dimension fitting ("calc mode").
//!
//! Each preset category maps to a [`CalcStrategy`]. Model categories clamp and
//! round dimensions to what the model handles well; general-purpose categories
//! fit the aspect ratio of their closest preset. Categories without special
//! handling pass dimensions through unchanged.

use crate::app_settings::{
    FLUX2_MAX_DIMENSION, FLUX2_MAX_MEGAPIXELS, FLUX2_MIN_DIMENSION, FLUX2_MULTIPLE,
    FLUX_MAX_DIMENSION, FLUX_MAX_MEGAPIXELS, FLUX_MIN_DIMENSION, FLUX_MULTIPLE,
    PIXELS_PER_MEGAPIXEL, QWEN_MAX_PIXELS, QWEN_MIN_PIXELS, WAN_MAX_PIXELS, WAN_MIN_PIXELS,
    WAN_MULTIPLE,
};
use crate::engine::matching::{
    aspects_match, find_closest_preset, scale_to_nearest_preset_aspect_ratio,
    scale_to_preset_aspect_ratio,
};
use crate::presets::{Dimension, PresetMap};

/// Limits for the Flux family of models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluxLimits {
    pub max_megapixels: f64,
    pub max_dimension: u32,
    pub min_dimension: u32,
    pub multiple: u32,
}

/// Flux.1 limits.
pub const FLUX: FluxLimits = FluxLimits {
    max_megapixels: FLUX_MAX_MEGAPIXELS,
    max_dimension: FLUX_MAX_DIMENSION,
    min_dimension: FLUX_MIN_DIMENSION,
    multiple: FLUX_MULTIPLE,
};

/// Flux.2 limits.
pub const FLUX_2: FluxLimits = FluxLimits {
    max_megapixels: FLUX2_MAX_MEGAPIXELS,
    max_dimension: FLUX2_MAX_DIMENSION,
    min_dimension: FLUX2_MIN_DIMENSION,
    multiple: FLUX2_MULTIPLE,
};

/// How a category adjusts dimensions when calc mode is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcStrategy {
    /// Flux megapixel and side limits, multiples of 32
    Flux,
    /// Flux.2 megapixel and side limits, multiples of 16
    Flux2,
    /// WAN pixel-count window, multiples of 16
    Wan,
    /// Qwen-Image pixel-count window
    QwenImage,
    /// Snap to the closest preset (SDXL, HiDream Dev)
    SnapToPreset,
    /// Fit the closest preset's aspect ratio (general-purpose categories)
    AspectFit,
    /// No special handling
    Passthrough,
}

impl CalcStrategy {
    /// Picks the strategy for a category name.
    pub fn for_category(category: &str) -> Self {
        match category {
            "Flux" => Self::Flux,
            "Flux.2" => Self::Flux2,
            "WAN" => Self::Wan,
            "Qwen-Image" => Self::QwenImage,
            "SDXL" | "HiDream Dev" => Self::SnapToPreset,
            "Standard" | "Social Media" | "Print" | "Cinema" | "Display Resolutions" => {
                Self::AspectFit
            }
            _ => Self::Passthrough,
        }
    }

    /// Whether enabling calc mode changes anything for this strategy.
    pub fn has_calculation(&self) -> bool {
        *self != Self::Passthrough
    }

    /// Applies the strategy. Preset-based strategies leave `input` unchanged
    /// when `presets` is empty.
    pub fn apply(&self, input: Dimension, presets: &PresetMap) -> Dimension {
        match self {
            Self::Flux => fit_flux(input, &FLUX),
            Self::Flux2 => fit_flux(input, &FLUX_2),
            Self::Wan => fit_wan(input),
            Self::QwenImage => fit_qwen_image(input),
            Self::SnapToPreset => find_closest_preset(input, presets)
                .map(|found| found.dimension())
                .unwrap_or(input),
            Self::AspectFit => scale_to_nearest_preset_aspect_ratio(input, presets).unwrap_or(input),
            Self::Passthrough => input,
        }
    }
}

/// Rounds `value` to the nearest multiple of `multiple`.
pub fn round_to_multiple(value: f64, multiple: u32) -> u32 {
    let multiple = multiple.max(1) as f64;
    ((value / multiple).round() * multiple).max(0.0) as u32
}

/// Fits dimensions to a Flux-family model.
///
/// Scales down uniformly when over the megapixel cap, then clamps the longest
/// side down and the shortest side up (each uniformly), and finally rounds
/// both sides to the model's multiple within `[min_dimension, max_dimension]`.
pub fn fit_flux(input: Dimension, limits: &FluxLimits) -> Dimension {
    let mut width = input.width as f64;
    let mut height = input.height as f64;

    let megapixels = width * height / PIXELS_PER_MEGAPIXEL;
    if megapixels > limits.max_megapixels {
        let scale = (limits.max_megapixels / megapixels).sqrt();
        width *= scale;
        height *= scale;
    }

    let longest = width.max(height);
    if longest > limits.max_dimension as f64 {
        let scale = limits.max_dimension as f64 / longest;
        width *= scale;
        height *= scale;
    }

    let shortest = width.min(height);
    if shortest < limits.min_dimension as f64 {
        let scale = limits.min_dimension as f64 / shortest;
        width *= scale;
        height *= scale;
    }

    let clamp = |value: f64| {
        round_to_multiple(value, limits.multiple).clamp(limits.min_dimension, limits.max_dimension)
    };
    Dimension::new(clamp(width), clamp(height))
}

/// Derives dimensions with `aspect` whose area is `pixels`.
fn dimension_for_pixels(pixels: f64, aspect: f64) -> (f64, f64) {
    let height = (pixels / aspect).sqrt();
    (height * aspect, height)
}

/// Fits dimensions to WAN's pixel-count window, rounded to multiples of 16.
pub fn fit_wan(input: Dimension) -> Dimension {
    let pixels = input.pixels().clamp(WAN_MIN_PIXELS, WAN_MAX_PIXELS) as f64;
    let (width, height) = dimension_for_pixels(pixels, input.aspect());

    Dimension::new(
        round_to_multiple(width, WAN_MULTIPLE).max(WAN_MULTIPLE),
        round_to_multiple(height, WAN_MULTIPLE).max(WAN_MULTIPLE),
    )
}

/// Fits dimensions to Qwen-Image's pixel-count window.
///
/// Inputs already inside the window are returned unchanged; others are moved
/// to the nearest bound keeping the aspect ratio.
pub fn fit_qwen_image(input: Dimension) -> Dimension {
    let pixels = input.pixels();
    if (QWEN_MIN_PIXELS..=QWEN_MAX_PIXELS).contains(&pixels) {
        return input;
    }

    let target = pixels.clamp(QWEN_MIN_PIXELS, QWEN_MAX_PIXELS) as f64;
    let (width, height) = dimension_for_pixels(target, input.aspect());
    Dimension::new((width.round() as u32).max(1), (height.round() as u32).max(1))
}

/// Snaps `input` to the category, optionally through its calc strategy.
///
/// Without calc mode the closest preset's dimensions are used as-is. With calc
/// mode the strategy runs directly on the input when it already has the
/// closest preset's aspect ratio; otherwise the input is first fitted to that
/// aspect ratio and the strategy runs on the result.
///
/// Returns `None` when the category has no presets.
pub fn apply_auto_fit(
    input: Dimension,
    use_calc: bool,
    strategy: CalcStrategy,
    presets: &PresetMap,
) -> Option<Dimension> {
    let closest = find_closest_preset(input, presets)?;

    if !use_calc {
        tracing::debug!("Auto-fit {} snapped to preset '{}'", input, closest.name);
        return Some(closest.dimension());
    }

    let result = if aspects_match(input.aspect(), closest.aspect()) {
        strategy.apply(input, presets)
    } else {
        let scaled = scale_to_preset_aspect_ratio(input, closest.aspect());
        strategy.apply(scaled, presets)
    };

    tracing::debug!(
        "Auto-fit {} via {:?} (closest '{}') -> {}",
        input,
        strategy,
        closest.name,
        result
    );
    Some(result)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn presets(entries: &[(&str, u32, u32)]) -> PresetMap {
        entries
            .iter()
            .map(|(name, w, h)| (name.to_string(), Dimension::new(*w, *h)))
            .collect()
    }

    /// Test 1: Category names map to strategies, unknown ones pass through
    #[test]
    fn test_strategy_for_category() {
        assert_eq!(CalcStrategy::for_category("Flux"), CalcStrategy::Flux);
        assert_eq!(CalcStrategy::for_category("Flux.2"), CalcStrategy::Flux2);
        assert_eq!(CalcStrategy::for_category("WAN"), CalcStrategy::Wan);
        assert_eq!(CalcStrategy::for_category("Qwen-Image"), CalcStrategy::QwenImage);
        assert_eq!(CalcStrategy::for_category("SDXL"), CalcStrategy::SnapToPreset);
        assert_eq!(CalcStrategy::for_category("HiDream Dev"), CalcStrategy::SnapToPreset);
        assert_eq!(CalcStrategy::for_category("Cinema"), CalcStrategy::AspectFit);
        assert_eq!(CalcStrategy::for_category("My Sizes"), CalcStrategy::Passthrough);
        assert!(!CalcStrategy::Passthrough.has_calculation());
    }

    /// Test 2: Flux at exactly 4 MP only clamps the longest side
    #[test]
    fn test_flux_longest_side_clamp() {
        assert_eq!(fit_flux(Dimension::new(4000, 1000), &FLUX), Dimension::new(2560, 640));
    }

    /// Test 3: Flux scales down over the megapixel cap and rounds to 32
    #[test]
    fn test_flux_megapixel_cap() {
        // 3000x2000 = 6 MP -> scale sqrt(4/6) -> 2449.5x1633.0 -> 2464x1632
        assert_eq!(fit_flux(Dimension::new(3000, 2000), &FLUX), Dimension::new(2464, 1632));
        // 1000x1000 is in range; only rounding applies
        assert_eq!(fit_flux(Dimension::new(1000, 1000), &FLUX), Dimension::new(992, 992));
    }

    /// Test 4: Flux raises the shortest side to the minimum
    #[test]
    fn test_flux_min_side() {
        // 200x100 -> scale 3.2 -> 640x320
        assert_eq!(fit_flux(Dimension::new(200, 100), &FLUX), Dimension::new(640, 320));
        // Very thin input ends up clamped on both ends
        assert_eq!(fit_flux(Dimension::new(4000, 100), &FLUX), Dimension::new(2560, 320));
    }

    /// Test 5: Flux.2 uses its own limits
    #[test]
    fn test_flux2_limits() {
        assert_eq!(fit_flux(Dimension::new(4000, 1000), &FLUX_2), Dimension::new(3840, 960));
        assert_eq!(fit_flux(Dimension::new(1000, 1000), &FLUX_2), Dimension::new(1008, 1008));
    }

    /// Test 6: WAN clamps 1080p down to its pixel ceiling
    #[test]
    fn test_wan_downscale() {
        // height = sqrt(1195560 / (16/9)) = 820.06 -> 816; width = 1457.9 -> 1456
        assert_eq!(fit_wan(Dimension::new(1920, 1080)), Dimension::new(1456, 816));
    }

    /// Test 7: WAN raises small inputs and rounds in-range ones
    #[test]
    fn test_wan_upscale_and_round() {
        // 256x256 -> 182080 px -> 426.7 square -> 432
        assert_eq!(fit_wan(Dimension::new(256, 256)), Dimension::new(432, 432));
        // In range: 830x470 -> 832x464
        assert_eq!(fit_wan(Dimension::new(830, 470)), Dimension::new(832, 464));
    }

    /// Test 8: Qwen-Image window
    #[test]
    fn test_qwen_image() {
        assert_eq!(fit_qwen_image(Dimension::new(1000, 1000)), Dimension::new(1000, 1000));
        assert_eq!(fit_qwen_image(Dimension::new(512, 512)), Dimension::new(768, 768));
        assert_eq!(fit_qwen_image(Dimension::new(4096, 4096)), Dimension::new(2048, 2048));
        // Non-square keeps its aspect: 4096x2048 -> 2896.3x1448.2
        assert_eq!(fit_qwen_image(Dimension::new(4096, 2048)), Dimension::new(2896, 1448));
    }

    /// Test 9: Preset-based strategies
    #[test]
    fn test_preset_strategies() {
        let category = presets(&[("Square", 1024, 1024), ("Wide", 1344, 768)]);
        assert_eq!(
            CalcStrategy::SnapToPreset.apply(Dimension::new(700, 1200), &category),
            Dimension::new(768, 1344)
        );
        assert_eq!(
            CalcStrategy::AspectFit.apply(Dimension::new(1100, 1000), &category),
            Dimension::new(1000, 1000)
        );
        assert_eq!(
            CalcStrategy::SnapToPreset.apply(Dimension::new(700, 1200), &PresetMap::new()),
            Dimension::new(700, 1200)
        );
        assert_eq!(
            CalcStrategy::Passthrough.apply(Dimension::new(123, 456), &category),
            Dimension::new(123, 456)
        );
    }

    /// Test 10: Without calc mode, auto-fit snaps to the raw preset
    #[test]
    fn test_auto_fit_without_calc() {
        let category = presets(&[("Square", 1024, 1024)]);
        assert_eq!(
            apply_auto_fit(Dimension::new(1200, 1000), false, CalcStrategy::Flux, &category),
            Some(Dimension::new(1024, 1024))
        );
        assert_eq!(
            apply_auto_fit(Dimension::new(1200, 1000), false, CalcStrategy::Flux, &PresetMap::new()),
            None
        );
    }

    /// Test 11: Matching aspect runs the calculation directly on the input
    #[test]
    fn test_auto_fit_direct_calc() {
        let category = presets(&[("Square", 1024, 1024)]);
        assert_eq!(
            apply_auto_fit(Dimension::new(1000, 1000), true, CalcStrategy::Flux, &category),
            Some(Dimension::new(992, 992))
        );
    }

    /// Test 12: Mismatched aspect is fitted first, then calculated
    #[test]
    fn test_auto_fit_scale_then_calc() {
        let category = presets(&[("Square", 1024, 1024)]);
        // 1200x1000 -> aspect-fit 1000x1000 -> Flux 992x992.
        // Calculating directly would have produced 1216x992.
        assert_eq!(fit_flux(Dimension::new(1200, 1000), &FLUX), Dimension::new(1216, 992));
        assert_eq!(
            apply_auto_fit(Dimension::new(1200, 1000), true, CalcStrategy::Flux, &category),
            Some(Dimension::new(992, 992))
        );
    }
}

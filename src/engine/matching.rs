// SPDX-License-Identifier: GPL-3.0-only

//! Closest-preset matching and aspect-ratio fitting.
//!
//! # Matching rule
//!
//! Every preset is considered in both orientations. The candidate with the
//! smallest aspect-ratio distance wins. When two candidates are within
//! [`ASPECT_TOLERANCE`] of each other, the one whose pixel count is closer on a
//! log scale (`|ln(input / candidate)|`) wins instead, so a 800x400 input prefers
//! 900x450 over 1000x500.

use crate::app_settings::ASPECT_TOLERANCE;
use crate::presets::{Dimension, PresetMap};

/// The preset chosen by [`find_closest_preset`], in the matched orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetMatch {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Whether the preset matched with width and height swapped
    pub flipped: bool,
}

impl PresetMatch {
    pub fn dimension(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }

    pub fn aspect(&self) -> f64 {
        self.dimension().aspect()
    }
}

/// Whether two aspect ratios are equal within [`ASPECT_TOLERANCE`].
pub fn aspects_match(a: f64, b: f64) -> bool {
    (a - b).abs() < ASPECT_TOLERANCE
}

/// Log-scale distance between two pixel counts; independent of orientation and scale.
fn pixel_distance(input: Dimension, candidate: Dimension) -> f64 {
    (input.pixels() as f64 / candidate.pixels() as f64).ln().abs()
}

/// Finds the preset closest to `input` by aspect ratio, then pixel count.
///
/// Returns `None` when the category has no presets.
pub fn find_closest_preset(input: Dimension, presets: &PresetMap) -> Option<PresetMatch> {
    let input_aspect = input.aspect();

    let candidates: Vec<(&str, Dimension, bool, f64)> = presets
        .iter()
        .filter(|(_, preset)| preset.is_valid())
        .flat_map(|(name, preset)| [(name, *preset, false), (name, preset.swapped(), true)])
        .map(|(name, candidate, flipped)| {
            let aspect_diff = (input_aspect - candidate.aspect()).abs();
            (name, candidate, flipped, aspect_diff)
        })
        .collect();

    let best_aspect = candidates
        .iter()
        .map(|(_, _, _, aspect_diff)| *aspect_diff)
        .fold(f64::INFINITY, f64::min);

    // Among candidates tied on aspect, the first with the smallest pixel distance wins
    let mut best: Option<(&str, Dimension, bool, f64)> = None;
    for &(name, candidate, flipped, aspect_diff) in &candidates {
        if !aspects_match(aspect_diff, best_aspect) {
            continue;
        }
        let pixel_diff = pixel_distance(input, candidate);
        if best.is_none_or(|(_, _, _, best_pixels)| pixel_diff < best_pixels) {
            best = Some((name, candidate, flipped, pixel_diff));
        }
    }

    best.map(|(name, candidate, flipped, _)| PresetMatch {
        name: name.to_string(),
        width: candidate.width,
        height: candidate.height,
        flipped,
    })
}

/// Fits `input` to `target_aspect`, keeping the pixel count as close as possible.
///
/// Two candidates are tried: keep the width and derive the height, or keep the
/// height and derive the width. The one whose pixel count is closer to the
/// input wins; ties keep the width.
pub fn scale_to_preset_aspect_ratio(input: Dimension, target_aspect: f64) -> Dimension {
    if !(target_aspect.is_finite() && target_aspect > 0.0) {
        return input;
    }

    let keep_width = Dimension::new(
        input.width,
        ((input.width as f64 / target_aspect).round() as u32).max(1),
    );
    let keep_height = Dimension::new(
        ((input.height as f64 * target_aspect).round() as u32).max(1),
        input.height,
    );

    let original = input.pixels();
    if keep_height.pixels().abs_diff(original) < keep_width.pixels().abs_diff(original) {
        keep_height
    } else {
        keep_width
    }
}

/// Fits `input` to the aspect ratio of the closest preset in the category.
///
/// Returns the input unchanged when it already matches, and `None` when the
/// category has no presets.
pub fn scale_to_nearest_preset_aspect_ratio(input: Dimension, presets: &PresetMap) -> Option<Dimension> {
    let closest = find_closest_preset(input, presets)?;
    if aspects_match(input.aspect(), closest.aspect()) {
        return Some(input);
    }
    Some(scale_to_preset_aspect_ratio(input, closest.aspect()))
}

// ============================================================================
// Tests
// ============================================================================

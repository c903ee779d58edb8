// SPDX-License-Identifier: GPL-3.0-only

//! Node session: current dimensions plus the store and engine wiring.
//!
//! A session stands in for the host node's property bag. The host copies its
//! width/height widgets in, calls an action, and writes the returned dimension
//! back. Actions do nothing and return `None` while width or height is unset.
//!
//! # Example
//!
//! ```rust,ignore
//! use resolution_master::session::Session;
//!
//! let mut session = Session::new(builtins, store);
//! session.set_size(widgets.width(), widgets.height());
//! session.set_calc_enabled("Flux", true);
//! session.select_category("Flux");
//!
//! if let Some(fitted) = session.auto_fit() {
//!     widgets.set(fitted.width, fitted.height);
//! }
//! ```

use crate::config::Config;
use crate::engine::{
    apply_auto_fit, apply_scale, find_closest_preset, snap_to_multiple, CalcStrategy, PresetMatch,
    RescaleSettings,
};
use crate::presets::{Catalog, Dimension, PresetMap, PresetStore};
use std::collections::HashSet;

/// Current dimensions, selection, and settings for one node.
#[derive(Debug, Clone)]
pub struct Session {
    width: Option<u32>,
    height: Option<u32>,
    category: String,
    calc_enabled: HashSet<String>,
    pub rescale: RescaleSettings,
    pub snap: u32,
    builtins: Catalog,
    store: PresetStore,
}

impl Session {
    /// Creates a session with default settings and no dimensions.
    pub fn new(builtins: Catalog, store: PresetStore) -> Self {
        Self::from_config(&Config::default(), builtins, store)
    }

    /// Creates a session from a host configuration.
    pub fn from_config(config: &Config, builtins: Catalog, store: PresetStore) -> Self {
        Self {
            width: None,
            height: None,
            category: config.category.clone(),
            calc_enabled: config.calc_enabled.iter().cloned().collect(),
            rescale: config.rescale,
            snap: config.snap,
            builtins,
            store,
        }
    }

    pub fn builtins(&self) -> &Catalog {
        &self.builtins
    }

    pub fn store(&self) -> &PresetStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PresetStore {
        &mut self.store
    }

    /// Releases the store, e.g. to persist it.
    pub fn into_store(self) -> PresetStore {
        self.store
    }

    /// Copies the host's width/height values in.
    pub fn set_size(&mut self, width: Option<u32>, height: Option<u32>) {
        self.width = width;
        self.height = height;
    }

    /// Current dimensions, if both are known.
    pub fn dimension(&self) -> Option<Dimension> {
        Dimension::from_optional(self.width, self.height)
    }

    fn apply(&mut self, dimension: Dimension) -> Dimension {
        self.width = Some(dimension.width);
        self.height = Some(dimension.height);
        dimension
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Selects a category known to the merged catalog.
    pub fn select_category(&mut self, category: &str) -> bool {
        let known = self.builtins.contains_key(category)
            || self.store.custom_presets().contains_key(category);
        if !known {
            tracing::warn!("Unknown category '{}'", category);
            return false;
        }
        self.category = category.to_string();
        true
    }

    /// Visible presets of the selected category.
    pub fn category_presets(&self) -> PresetMap {
        self.store
            .category_presets(&self.category, &self.builtins, false)
    }

    pub fn is_calc_enabled(&self, category: &str) -> bool {
        self.calc_enabled.contains(category)
    }

    pub fn set_calc_enabled(&mut self, category: &str, enabled: bool) {
        if enabled {
            self.calc_enabled.insert(category.to_string());
        } else {
            self.calc_enabled.remove(category);
        }
    }

    fn strategy(&self) -> CalcStrategy {
        CalcStrategy::for_category(&self.category)
    }

    fn use_calc(&self) -> bool {
        self.is_calc_enabled(&self.category) && self.strategy().has_calculation()
    }

    /// Closest visible preset of the selected category.
    pub fn closest_preset(&self) -> Option<PresetMatch> {
        find_closest_preset(self.dimension()?, &self.category_presets())
    }

    /// Switches to a named preset of the selected category.
    ///
    /// With calc mode on, the preset's dimensions go through the category's
    /// strategy.
    pub fn select_preset(&mut self, name: &str) -> Option<Dimension> {
        self.dimension()?;
        let presets = self.category_presets();
        let Some(preset) = presets.get(name).copied() else {
            tracing::warn!("Preset '{}' not found in '{}'", name, self.category);
            return None;
        };

        let target = if self.use_calc() {
            self.strategy().apply(preset, &presets)
        } else {
            preset
        };
        tracing::debug!("Selected preset '{}' -> {}", name, target);
        Some(self.apply(target))
    }

    /// Snaps the current dimensions to the selected category.
    pub fn auto_fit(&mut self) -> Option<Dimension> {
        let current = self.dimension()?;
        let fitted = apply_auto_fit(current, self.use_calc(), self.strategy(), &self.category_presets())?;
        Some(self.apply(fitted))
    }

    /// Scale factor the current rescale mode yields.
    pub fn scale_factor(&self) -> Option<f64> {
        Some(self.rescale.scale_factor(self.dimension()?))
    }

    /// Applies the current rescale factor.
    pub fn auto_resize(&mut self) -> Option<Dimension> {
        let current = self.dimension()?;
        let factor = self.rescale.scale_factor(current);
        Some(self.apply(apply_scale(current, factor)))
    }

    /// Exchanges width and height.
    pub fn swap(&mut self) -> Option<Dimension> {
        let current = self.dimension()?;
        Some(self.apply(current.swapped()))
    }

    /// Rounds both sides to the configured snap multiple.
    pub fn snap(&mut self) -> Option<Dimension> {
        let current = self.dimension()?;
        Some(self.apply(snap_to_multiple(current, self.snap)))
    }
}

// ============================================================================
// Tests
// ============================================================================

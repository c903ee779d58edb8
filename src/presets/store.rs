// SPDX-License-Identifier: GPL-3.0-only

//! Custom preset store layered over the built-in catalog.
//!
//! The store owns two ordered collections: custom presets per category, and
//! the names of built-in presets the user hid. Every successful mutation
//! re-serializes the state immediately; the host reads the snapshot through
//! [`PresetStore::persisted`] and writes it to wherever it keeps node
//! properties.
//!
//! Mutations return `Err(StoreError)` without touching the state when they
//! cannot be applied, and log the reason.
//!
//! # Example
//!
//! ```rust,ignore
//! use resolution_master::presets::{load_builtin_catalog, PresetStore};
//!
//! let builtins = load_builtin_catalog()?;
//! let mut store = PresetStore::load(None);
//! store.add("My Sizes", "Banner", 1500, 500)?;
//! store.toggle_hidden("SDXL", "5:12 Portrait", &builtins)?;
//!
//! let merged = store.merged(&builtins);
//! host.set_property("presets", store.persisted());
//! ```

use crate::presets::parser::{parse_state, parse_state_file, parse_state_lenient};
use crate::presets::types::{
    Catalog, Dimension, MergedCatalog, MergedCategory, ParseError, PersistedState, PresetEntry,
    PresetMap, StoreError, StoreStats,
};
use std::fs;
use std::io::ErrorKind;

/// Custom presets and hidden built-ins, with persist-on-mutate.
#[derive(Debug, Clone)]
pub struct PresetStore {
    state: PersistedState,
    /// Latest serialized snapshot of `state`
    serialized: String,
}

impl Default for PresetStore {
    fn default() -> Self {
        Self::new()
    }
}

type StoreResult<T> = Result<T, StoreError>;

/// Logs and returns a rejected mutation.
fn reject<T>(err: StoreError) -> StoreResult<T> {
    tracing::warn!("{}", err);
    Err(err)
}

/// Trims a user-supplied name, rejecting names that are only whitespace.
fn clean_name(name: &str) -> StoreResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return reject(StoreError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn check_dimensions(width: u32, height: u32) -> StoreResult<Dimension> {
    let dimension = Dimension::new(width, height);
    if !dimension.is_valid() {
        return reject(StoreError::InvalidDimensions { width, height });
    }
    Ok(dimension)
}

impl PresetStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::from_state(PersistedState::default())
    }

    /// Creates a store from already validated state.
    pub fn from_state(state: PersistedState) -> Self {
        let mut store = Self {
            state,
            serialized: String::new(),
        };
        store.prune_empty();
        store.persist();
        store
    }

    /// Loads the store from the host's persisted property.
    ///
    /// Accepts the current and the legacy layout. A missing value, malformed
    /// JSON, or a non-object document yields an empty store. Invalid presets
    /// and hidden names are skipped and the valid rest is kept.
    pub fn load(serialized: Option<&str>) -> Self {
        let Some(json) = serialized.filter(|s| !s.trim().is_empty()) else {
            tracing::debug!("No persisted presets, starting empty");
            return Self::new();
        };

        match parse_state_lenient(json) {
            Ok(result) => {
                if result.has_warnings() {
                    tracing::info!(
                        "Loaded presets with {} warning(s)",
                        result.warning_count()
                    );
                }
                Self::from_state(result.into_value())
            }
            Err(e) => {
                tracing::warn!("Failed to load persisted presets, starting empty: {}", e);
                Self::new()
            }
        }
    }

    /// Loads the store from a file, or starts empty if the file does not exist.
    ///
    /// Unlike [`PresetStore::load`], an existing but invalid file is an error
    /// so that saving afterwards cannot overwrite the user's data.
    pub fn from_file(path: &str) -> Result<Self, ParseError> {
        match fs::metadata(path) {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("Preset file '{}' not found, starting empty", path);
                Ok(Self::new())
            }
            _ => Ok(Self::from_state(parse_state_file(path)?.into_value())),
        }
    }

    /// Writes the current snapshot to a file.
    pub fn save_to_file(&self, path: &str) -> Result<(), ParseError> {
        fs::write(path, &self.serialized).map_err(|e| ParseError::io_error_with_path(e, path))?;
        tracing::debug!("Saved presets to '{}'", path);
        Ok(())
    }

    /// The serialized state as of the last mutation.
    pub fn persisted(&self) -> &str {
        &self.serialized
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn custom_presets(&self) -> &Catalog {
        &self.state.custom_presets
    }

    fn persist(&mut self) {
        match serde_json::to_string(&self.state) {
            Ok(json) => self.serialized = json,
            Err(e) => tracing::error!("Failed to serialize presets: {}", e),
        }
    }

    fn prune_empty(&mut self) {
        self.state.custom_presets.retain(|_, presets| !presets.is_empty());
        self.state
            .hidden_built_in_presets
            .retain(|_, names| !names.is_empty());
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Merges the built-in catalog with custom presets and hidden flags.
    ///
    /// Built-in categories come first in catalog order. Custom presets
    /// overwrite same-named built-ins in place; custom-only presets and
    /// categories are appended.
    pub fn merged(&self, builtins: &Catalog) -> MergedCatalog {
        let mut merged = MergedCatalog::new();

        for (category, presets) in builtins.iter() {
            let entries: MergedCategory = presets
                .iter()
                .map(|(name, dim)| {
                    let entry = PresetEntry {
                        width: dim.width,
                        height: dim.height,
                        is_custom: false,
                        is_hidden: self.is_hidden(category, name),
                    };
                    (name.to_string(), entry)
                })
                .collect();
            merged.insert(category, entries);
        }

        for (category, presets) in self.state.custom_presets.iter() {
            let entries = merged.get_or_insert_with(category, MergedCategory::new);
            for (name, dim) in presets.iter() {
                entries.insert(
                    name,
                    PresetEntry {
                        width: dim.width,
                        height: dim.height,
                        is_custom: true,
                        is_hidden: false,
                    },
                );
            }
        }

        merged
    }

    /// Presets of one category as the engine consumes them.
    ///
    /// Follows the merged order: custom presets replace same-named built-ins
    /// in place, even hidden ones. Hidden built-ins are skipped unless
    /// `include_hidden` is set.
    pub fn category_presets(
        &self,
        category: &str,
        builtins: &Catalog,
        include_hidden: bool,
    ) -> PresetMap {
        let mut presets = PresetMap::new();
        let custom = self.state.custom_presets.get(category);

        if let Some(builtin) = builtins.get(category) {
            for (name, dim) in builtin.iter() {
                if let Some(own) = custom.and_then(|c| c.get(name)) {
                    presets.insert(name, *own);
                } else if include_hidden || !self.is_hidden(category, name) {
                    presets.insert(name, *dim);
                }
            }
        }
        if let Some(custom) = custom {
            for (name, dim) in custom.iter() {
                presets.insert(name, *dim);
            }
        }

        presets
    }

    /// Whether a built-in preset is in the hidden set.
    pub fn is_hidden(&self, category: &str, name: &str) -> bool {
        self.state
            .hidden_built_in_presets
            .get(category)
            .is_some_and(|names| names.iter().any(|n| n == name))
    }

    /// A category is truly custom when no built-in category has its name.
    pub fn is_truly_custom_category(&self, category: &str, builtins: &Catalog) -> bool {
        self.state.custom_presets.contains_key(category) && !builtins.contains_key(category)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            category_count: self.state.custom_presets.len(),
            preset_count: self.state.custom_presets.values().map(|p| p.len()).sum(),
            hidden_count: self
                .state
                .hidden_built_in_presets
                .values()
                .map(|n| n.len())
                .sum(),
        }
    }

    // ========================================================================
    // Preset mutations
    // ========================================================================

    /// Adds a custom preset, overwriting a same-named one in place.
    pub fn add(&mut self, category: &str, name: &str, width: u32, height: u32) -> StoreResult<()> {
        let category = clean_name(category)?;
        let name = clean_name(name)?;
        let dimension = check_dimensions(width, height)?;

        self.state
            .custom_presets
            .get_or_insert_with(&category, PresetMap::new)
            .insert(name.as_str(), dimension);
        self.persist();

        tracing::info!("Saved preset '{}' ({}) in '{}'", name, dimension, category);
        Ok(())
    }

    /// Deletes a custom preset. An emptied category is removed as well.
    pub fn delete(&mut self, category: &str, name: &str) -> StoreResult<()> {
        let Some(presets) = self.state.custom_presets.get_mut(category) else {
            return reject(StoreError::preset_not_found(category, name));
        };
        if presets.remove(name).is_none() {
            return reject(StoreError::preset_not_found(category, name));
        }
        if presets.is_empty() {
            self.state.custom_presets.remove(category);
            tracing::debug!("Removed empty category '{}'", category);
        }
        self.persist();

        tracing::info!("Deleted preset '{}' from '{}'", name, category);
        Ok(())
    }

    /// Renames a custom preset without changing its position.
    pub fn rename(&mut self, category: &str, old_name: &str, new_name: &str) -> StoreResult<()> {
        let new_name = clean_name(new_name)?;
        let Some(presets) = self.state.custom_presets.get_mut(category) else {
            return reject(StoreError::preset_not_found(category, old_name));
        };
        if !presets.contains_key(old_name) {
            return reject(StoreError::preset_not_found(category, old_name));
        }
        if new_name == old_name {
            return Ok(());
        }
        if !presets.rename_key(old_name, new_name.as_str()) {
            return reject(StoreError::already_exists(category, new_name));
        }
        self.persist();

        tracing::info!("Renamed preset '{}' to '{}' in '{}'", old_name, new_name, category);
        Ok(())
    }

    /// Renames and resizes a custom preset in one step, keeping its position.
    pub fn update(
        &mut self,
        category: &str,
        old_name: &str,
        new_name: &str,
        width: u32,
        height: u32,
    ) -> StoreResult<()> {
        let new_name = clean_name(new_name)?;
        let dimension = check_dimensions(width, height)?;
        let Some(presets) = self.state.custom_presets.get_mut(category) else {
            return reject(StoreError::preset_not_found(category, old_name));
        };
        let Some(current) = presets.get(old_name).copied() else {
            return reject(StoreError::preset_not_found(category, old_name));
        };
        if new_name == old_name && current == dimension {
            return Ok(());
        }
        if !presets.replace_entry(old_name, new_name.as_str(), dimension) {
            return reject(StoreError::already_exists(category, new_name));
        }
        self.persist();

        tracing::info!(
            "Updated preset '{}' to '{}' ({}) in '{}'",
            old_name,
            new_name,
            dimension,
            category
        );
        Ok(())
    }

    /// Moves a preset inside its category.
    pub fn reorder_presets(&mut self, category: &str, name: &str, new_index: usize) -> StoreResult<()> {
        let moved = self
            .state
            .custom_presets
            .get_mut(category)
            .is_some_and(|presets| presets.move_to(name, new_index));
        if !moved {
            return reject(StoreError::preset_not_found(category, name));
        }
        self.persist();

        tracing::debug!("Moved preset '{}' in '{}' to index {}", name, category, new_index);
        Ok(())
    }

    /// Moves a preset to another category at `index` (end when `None`).
    ///
    /// Moving within the same category is a reorder.
    pub fn move_preset(
        &mut self,
        source_category: &str,
        name: &str,
        target_category: &str,
        index: Option<usize>,
    ) -> StoreResult<()> {
        let target_category = clean_name(target_category)?;
        let index = index.unwrap_or(usize::MAX);
        if target_category == source_category {
            return self.reorder_presets(source_category, name, index);
        }

        let Some(dimension) = self
            .state
            .custom_presets
            .get(source_category)
            .and_then(|presets| presets.get(name))
            .copied()
        else {
            return reject(StoreError::preset_not_found(source_category, name));
        };
        let collides = self
            .state
            .custom_presets
            .get(&target_category)
            .is_some_and(|presets| presets.contains_key(name));
        if collides {
            return reject(StoreError::already_exists(target_category, name));
        }

        if let Some(source) = self.state.custom_presets.get_mut(source_category) {
            source.remove(name);
            if source.is_empty() {
                self.state.custom_presets.remove(source_category);
            }
        }
        self.state
            .custom_presets
            .get_or_insert_with(&target_category, PresetMap::new)
            .insert_at(index, name, dimension);
        self.persist();

        tracing::info!(
            "Moved preset '{}' from '{}' to '{}'",
            name,
            source_category,
            target_category
        );
        Ok(())
    }

    /// Copies a custom or built-in preset into a new custom preset.
    ///
    /// Custom presets take precedence over built-ins of the same name.
    pub fn duplicate(
        &mut self,
        source_category: &str,
        source_name: &str,
        target_category: &str,
        target_name: &str,
        builtins: &Catalog,
    ) -> StoreResult<()> {
        let target_category = clean_name(target_category)?;
        let target_name = clean_name(target_name)?;

        let source = self
            .state
            .custom_presets
            .get(source_category)
            .and_then(|presets| presets.get(source_name))
            .or_else(|| {
                builtins
                    .get(source_category)
                    .and_then(|presets| presets.get(source_name))
            })
            .copied();
        let Some(dimension) = source else {
            return reject(StoreError::preset_not_found(source_category, source_name));
        };

        let collides = self
            .state
            .custom_presets
            .get(&target_category)
            .is_some_and(|presets| presets.contains_key(&target_name));
        if collides {
            return reject(StoreError::already_exists(target_category, target_name));
        }

        self.state
            .custom_presets
            .get_or_insert_with(&target_category, PresetMap::new)
            .insert(target_name.as_str(), dimension);
        self.persist();

        tracing::info!(
            "Duplicated '{}/{}' as '{}/{}'",
            source_category,
            source_name,
            target_category,
            target_name
        );
        Ok(())
    }

    /// Flips the hidden flag of a built-in preset and returns the new state.
    ///
    /// Only built-in presets can be hidden; custom presets are never touched.
    pub fn toggle_hidden(&mut self, category: &str, name: &str, builtins: &Catalog) -> StoreResult<bool> {
        let is_builtin = builtins
            .get(category)
            .is_some_and(|presets| presets.contains_key(name));
        if !is_builtin {
            return reject(StoreError::NotBuiltIn {
                category: category.to_string(),
                name: name.to_string(),
            });
        }

        let hidden = &mut self.state.hidden_built_in_presets;
        let names = hidden.get_or_insert_with(category, Vec::new);
        let now_hidden = match names.iter().position(|n| n == name) {
            Some(index) => {
                names.remove(index);
                false
            }
            None => {
                names.push(name.to_string());
                true
            }
        };
        if names.is_empty() {
            hidden.remove(category);
        }
        self.persist();

        tracing::info!(
            "{} built-in preset '{}' in '{}'",
            if now_hidden { "Hid" } else { "Unhid" },
            name,
            category
        );
        Ok(now_hidden)
    }

    // ========================================================================
    // Category mutations
    // ========================================================================

    /// Renames a custom category without changing its position.
    pub fn rename_category(&mut self, old_name: &str, new_name: &str) -> StoreResult<()> {
        let new_name = clean_name(new_name)?;
        if !self.state.custom_presets.contains_key(old_name) {
            return reject(StoreError::category_not_found(old_name));
        }
        if new_name == old_name {
            return Ok(());
        }
        if !self.state.custom_presets.rename_key(old_name, new_name.as_str()) {
            return reject(StoreError::already_exists("", new_name));
        }
        self.persist();

        tracing::info!("Renamed category '{}' to '{}'", old_name, new_name);
        Ok(())
    }

    /// Deletes a custom category with all of its presets.
    pub fn delete_category(&mut self, name: &str) -> StoreResult<()> {
        if self.state.custom_presets.remove(name).is_none() {
            return reject(StoreError::category_not_found(name));
        }
        self.persist();

        tracing::info!("Deleted category '{}'", name);
        Ok(())
    }

    /// Moves a custom category to `new_index` (clamped to the end).
    pub fn reorder_categories(&mut self, name: &str, new_index: usize) -> StoreResult<()> {
        if !self.state.custom_presets.move_to(name, new_index) {
            return reject(StoreError::category_not_found(name));
        }
        self.persist();

        tracing::debug!("Moved category '{}' to index {}", name, new_index);
        Ok(())
    }

    // ========================================================================
    // Import / export
    // ========================================================================

    /// Imports presets from either layout and returns how many were read.
    ///
    /// With `merge`, presets are upserted per category and hidden lists are
    /// unioned; otherwise the imported data replaces the whole state. Invalid
    /// data leaves the store unchanged.
    pub fn import_json(&mut self, json: &str, merge: bool) -> StoreResult<usize> {
        let result = match parse_state(json) {
            Ok(result) => result,
            Err(e) => return reject(StoreError::Import(e)),
        };
        if result.has_warnings() {
            tracing::info!("Import produced {} warning(s)", result.warning_count());
        }
        let imported = result.into_value();
        let count: usize = imported.custom_presets.values().map(|p| p.len()).sum();

        if merge {
            for (category, presets) in imported.custom_presets {
                let target = self
                    .state
                    .custom_presets
                    .get_or_insert_with(&category, PresetMap::new);
                for (name, dimension) in presets {
                    target.insert(name, dimension);
                }
            }
            for (category, names) in imported.hidden_built_in_presets {
                let target = self
                    .state
                    .hidden_built_in_presets
                    .get_or_insert_with(&category, Vec::new);
                for name in names {
                    if !target.contains(&name) {
                        target.push(name);
                    }
                }
            }
        } else {
            self.state = imported;
        }
        self.prune_empty();
        self.persist();

        tracing::info!(
            "Imported {} preset(s) ({})",
            count,
            if merge { "merged" } else { "replaced" }
        );
        Ok(count)
    }

    /// Serializes the state in the current layout, pretty-printed.
    pub fn export_json(&self) -> Result<String, ParseError> {
        Ok(serde_json::to_string_pretty(&self.state)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn builtins() -> Catalog {
        let mut standard = PresetMap::new();
        standard.insert("X", Dimension::new(1024, 1024));
        standard.insert("Wide", Dimension::new(1920, 1080));
        let mut sdxl = PresetMap::new();
        sdxl.insert("Square", Dimension::new(1024, 1024));
        let mut catalog = Catalog::new();
        catalog.insert("Standard", standard);
        catalog.insert("SDXL", sdxl);
        catalog
    }

    fn names(store: &PresetStore, category: &str) -> Vec<String> {
        store
            .custom_presets()
            .get(category)
            .map(|p| p.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn store_with(category: &str, presets: &[&str]) -> PresetStore {
        let mut store = PresetStore::new();
        for (i, name) in presets.iter().enumerate() {
            store.add(category, name, 512 + i as u32 * 64, 512).unwrap();
        }
        store
    }

    // ========================================================================
    // Load and persist
    // ========================================================================

    /// Test 1: Missing, empty, and malformed input all start empty
    #[test]
    fn test_load_fallbacks() {
        for input in [None, Some(""), Some("{oops"), Some("[1, 2]"), Some(r#"{"A": {"x": {"width": "?"}}}"#)] {
            let store = PresetStore::load(input);
            assert_eq!(store.stats(), StoreStats::default(), "input {:?}", input);
        }
    }

    /// Test 2: Legacy layout loads as custom presets
    #[test]
    fn test_load_legacy() {
        let store = PresetStore::load(Some(r#"{"Old": {"A": {"width": 640, "height": 480}}}"#));
        assert_eq!(names(&store, "Old"), vec!["A"]);
        assert!(store.state().hidden_built_in_presets.is_empty());
        assert!(store.persisted().contains("customPresets"));
    }

    /// Test 3: Every mutation refreshes the persisted snapshot
    #[test]
    fn test_persist_on_mutate() {
        let mut store = PresetStore::new();
        let before = store.persisted().to_string();
        store.add("Mine", "A", 800, 600).unwrap();
        assert_ne!(store.persisted(), before);

        let reloaded = PresetStore::load(Some(store.persisted()));
        assert_eq!(reloaded.state(), store.state());
    }

    /// Test 4: Export then load yields the same merged catalog
    #[test]
    fn test_export_round_trip() {
        let builtins = builtins();
        let mut store = store_with("Mine", &["B", "A", "C"]);
        store.add("Standard", "X", 1000, 1000).unwrap();
        store.toggle_hidden("Standard", "Wide", &builtins).unwrap();

        let exported = store.export_json().unwrap();
        assert!(exported.contains('\n'), "Export is pretty-printed");
        let reloaded = PresetStore::load(Some(&exported));

        assert_eq!(reloaded.merged(&builtins), store.merged(&builtins));
        assert_eq!(names(&reloaded, "Mine"), vec!["B", "A", "C"]);
    }

    /// Test 5: File-backed persistence
    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("presets.json");
        let path = path.to_str().unwrap();

        let mut store = PresetStore::from_file(path).expect("Missing file starts empty");
        store.add("Mine", "A", 640, 480).unwrap();
        store.save_to_file(path).unwrap();

        let reloaded = PresetStore::from_file(path).unwrap();
        assert_eq!(names(&reloaded, "Mine"), vec!["A"]);

        fs::write(path, "{broken").unwrap();
        assert!(PresetStore::from_file(path).is_err(), "Invalid file is not silently replaced");
    }

    // ========================================================================
    // Merged view
    // ========================================================================

    /// Test 6: Custom presets override built-ins in place; custom categories append
    #[test]
    fn test_merged_overlay() {
        let builtins = builtins();
        let mut store = PresetStore::new();
        store.add("Standard", "X", 2048, 2048).unwrap();
        store.add("Standard", "Extra", 300, 200).unwrap();
        store.add("Mine", "Y", 64, 64).unwrap();
        store.toggle_hidden("SDXL", "Square", &builtins).unwrap();

        let merged = store.merged(&builtins);
        assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["Standard", "SDXL", "Mine"]);

        let standard = merged.get("Standard").unwrap();
        assert_eq!(standard.keys().collect::<Vec<_>>(), vec!["X", "Wide", "Extra"]);
        let x = standard.get("X").unwrap();
        assert!(x.is_custom && !x.is_hidden);
        assert_eq!(x.dimension(), Dimension::new(2048, 2048));
        assert!(!standard.get("Wide").unwrap().is_custom);

        assert!(merged.get("SDXL").unwrap().get("Square").unwrap().is_hidden);
        assert!(merged.get("Mine").unwrap().get("Y").unwrap().is_custom);
    }

    /// Test 7: Engine view skips hidden built-ins unless asked
    #[test]
    fn test_category_presets_visibility() {
        let builtins = builtins();
        let mut store = PresetStore::new();
        store.toggle_hidden("Standard", "Wide", &builtins).unwrap();
        store.add("Standard", "Custom", 640, 480).unwrap();

        let visible = store.category_presets("Standard", &builtins, false);
        assert_eq!(visible.keys().collect::<Vec<_>>(), vec!["X", "Custom"]);
        let all = store.category_presets("Standard", &builtins, true);
        assert_eq!(all.len(), 3);
        assert!(store.category_presets("Nope", &builtins, true).is_empty());
    }

    // ========================================================================
    // Preset CRUD
    // ========================================================================

    /// Test 8: Add upserts and validates input
    #[test]
    fn test_add() {
        let mut store = store_with("Mine", &["A", "B"]);
        store.add("Mine", "A", 100, 100).unwrap();
        assert_eq!(names(&store, "Mine"), vec!["A", "B"]);
        assert_eq!(
            store.custom_presets().get("Mine").unwrap().get("A"),
            Some(&Dimension::new(100, 100))
        );

        assert!(matches!(store.add("Mine", "  ", 1, 1), Err(StoreError::InvalidName { .. })));
        assert!(matches!(
            store.add("Mine", "Z", 0, 10),
            Err(StoreError::InvalidDimensions { .. })
        ));
        assert_eq!(store.stats().preset_count, 2);
    }

    /// Test 9: Deleting the last preset removes the category
    #[test]
    fn test_delete() {
        let mut store = store_with("Mine", &["A", "B"]);
        store.delete("Mine", "A").unwrap();
        assert_eq!(names(&store, "Mine"), vec!["B"]);
        assert!(matches!(store.delete("Mine", "A"), Err(StoreError::NotFound { .. })));
        store.delete("Mine", "B").unwrap();
        assert!(!store.custom_presets().contains_key("Mine"));
        assert_eq!(store.stats().category_count, 0);
    }

    /// Test 10: Rename keeps the index, allows same-name, refuses collisions
    #[test]
    fn test_rename() {
        let mut store = store_with("Standard", &["X"]);
        assert!(store.rename("Standard", "X", "X").is_ok());

        store.add("Standard", "Y", 640, 480).unwrap();
        assert!(matches!(
            store.rename("Standard", "Y", "X"),
            Err(StoreError::AlreadyExists { .. })
        ));
        assert_eq!(names(&store, "Standard"), vec!["X", "Y"]);

        store.add("Standard", "Z", 640, 480).unwrap();
        store.rename("Standard", "X", "First").unwrap();
        assert_eq!(names(&store, "Standard"), vec!["First", "Y", "Z"]);

        assert!(matches!(
            store.rename("Standard", "missing", "Q"),
            Err(StoreError::NotFound { .. })
        ));
    }

    /// Test 11: Update renames and resizes in place
    #[test]
    fn test_update() {
        let mut store = store_with("Mine", &["A", "B", "C"]);
        store.update("Mine", "B", "Bee", 1000, 500).unwrap();
        assert_eq!(names(&store, "Mine"), vec!["A", "Bee", "C"]);
        assert_eq!(
            store.custom_presets().get("Mine").unwrap().get("Bee"),
            Some(&Dimension::new(1000, 500))
        );

        let snapshot = store.persisted().to_string();
        store.update("Mine", "Bee", "Bee", 1000, 500).unwrap();
        assert_eq!(store.persisted(), snapshot, "No-op update leaves state alone");

        assert!(matches!(
            store.update("Mine", "A", "C", 10, 10),
            Err(StoreError::AlreadyExists { .. })
        ));
        store.update("Mine", "A", "A", 10, 20).unwrap();
        assert_eq!(names(&store, "Mine"), vec!["A", "Bee", "C"]);
    }

    /// Test 12: Reordering moves exactly one preset
    #[test]
    fn test_reorder_presets() {
        let mut store = store_with("Mine", &["A", "B", "C", "D"]);
        store.reorder_presets("Mine", "D", 1).unwrap();
        assert_eq!(names(&store, "Mine"), vec!["A", "D", "B", "C"]);
        store.reorder_presets("Mine", "A", 3).unwrap();
        assert_eq!(names(&store, "Mine"), vec!["D", "B", "C", "A"]);
        assert!(store.reorder_presets("Mine", "Q", 0).is_err());
    }

    /// Test 13: Moving across categories
    #[test]
    fn test_move_preset() {
        let mut store = store_with("Src", &["A", "B"]);
        store.add("Dst", "X", 64, 64).unwrap();
        store.add("Dst", "Y", 64, 64).unwrap();

        store.move_preset("Src", "A", "Dst", Some(1)).unwrap();
        assert_eq!(names(&store, "Src"), vec!["B"]);
        assert_eq!(names(&store, "Dst"), vec!["X", "A", "Y"]);

        store.add("Src", "X", 1, 1).unwrap();
        assert!(matches!(
            store.move_preset("Src", "X", "Dst", None),
            Err(StoreError::AlreadyExists { .. })
        ));
        assert_eq!(names(&store, "Src"), vec!["B", "X"]);

        store.move_preset("Src", "B", "Dst", None).unwrap();
        store.delete("Src", "X").unwrap();
        assert!(!store.custom_presets().contains_key("Src"));
        assert_eq!(names(&store, "Dst"), vec!["X", "A", "Y", "B"]);

        store.move_preset("Dst", "B", "New", None).unwrap();
        assert_eq!(names(&store, "New"), vec!["B"]);
    }

    /// Test 14: Duplicate copies built-ins and customs into custom storage
    #[test]
    fn test_duplicate() {
        let builtins = builtins();
        let mut store = PresetStore::new();
        store
            .duplicate("SDXL", "Square", "Mine", "Square Copy", &builtins)
            .unwrap();
        assert_eq!(
            store.custom_presets().get("Mine").unwrap().get("Square Copy"),
            Some(&Dimension::new(1024, 1024))
        );

        store.add("Standard", "X", 300, 300).unwrap();
        store.duplicate("Standard", "X", "Mine", "X2", &builtins).unwrap();
        assert_eq!(
            store.custom_presets().get("Mine").unwrap().get("X2"),
            Some(&Dimension::new(300, 300)),
            "Custom source wins over same-named built-in"
        );

        assert!(store.duplicate("SDXL", "Nope", "Mine", "Z", &builtins).is_err());
        assert!(matches!(
            store.duplicate("SDXL", "Square", "Mine", "X2", &builtins),
            Err(StoreError::AlreadyExists { .. })
        ));
    }

    /// Test 15: Hiding only affects built-ins and never customPresets
    #[test]
    fn test_toggle_hidden() {
        let builtins = builtins();
        let mut store = PresetStore::new();

        assert!(store.toggle_hidden("SDXL", "Square", &builtins).unwrap());
        assert!(store.is_hidden("SDXL", "Square"));
        assert!(store.custom_presets().is_empty());

        assert!(!store.toggle_hidden("SDXL", "Square", &builtins).unwrap());
        assert!(
            !store.state().hidden_built_in_presets.contains_key("SDXL"),
            "Empty hidden list removes the category key"
        );

        store.add("Mine", "Custom", 64, 64).unwrap();
        assert!(matches!(
            store.toggle_hidden("Mine", "Custom", &builtins),
            Err(StoreError::NotBuiltIn { .. })
        ));
        assert_eq!(store.stats().hidden_count, 0);
    }

    // ========================================================================
    // Categories
    // ========================================================================

    /// Test 16: Category rename trims, keeps position, refuses collisions
    #[test]
    fn test_rename_category() {
        let mut store = store_with("A", &["x"]);
        store.add("B", "y", 64, 64).unwrap();
        store.add("C", "z", 64, 64).unwrap();

        store.rename_category("B", "  Bee  ").unwrap();
        assert_eq!(
            store.custom_presets().keys().collect::<Vec<_>>(),
            vec!["A", "Bee", "C"]
        );
        assert!(store.rename_category("A", "A").is_ok());
        assert!(matches!(store.rename_category("A", "   "), Err(StoreError::InvalidName { .. })));
        assert!(matches!(
            store.rename_category("A", "C"),
            Err(StoreError::AlreadyExists { .. })
        ));
        assert!(matches!(
            store.rename_category("Nope", "D"),
            Err(StoreError::NotFound { .. })
        ));
    }

    /// Test 17: Category reorder and delete
    #[test]
    fn test_reorder_and_delete_categories() {
        let mut store = PresetStore::new();
        for category in ["A", "B", "C"] {
            store.add(category, "p", 64, 64).unwrap();
        }
        store.reorder_categories("C", 0).unwrap();
        assert_eq!(
            store.custom_presets().keys().collect::<Vec<_>>(),
            vec!["C", "A", "B"]
        );
        store.delete_category("A").unwrap();
        assert_eq!(store.custom_presets().keys().collect::<Vec<_>>(), vec!["C", "B"]);
        assert!(store.delete_category("A").is_err());
        assert!(store.reorder_categories("A", 0).is_err());
    }

    /// Test 18: Truly custom categories have no built-in namesake
    #[test]
    fn test_truly_custom_category() {
        let builtins = builtins();
        let mut store = PresetStore::new();
        store.add("Standard", "Extra", 64, 64).unwrap();
        store.add("Mine", "Y", 64, 64).unwrap();
        assert!(!store.is_truly_custom_category("Standard", &builtins));
        assert!(store.is_truly_custom_category("Mine", &builtins));
        assert!(!store.is_truly_custom_category("SDXL", &builtins));
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// Test 19: Merge import upserts presets and unions hidden lists
    #[test]
    fn test_import_merge() {
        let mut store = store_with("Mine", &["A", "B"]);
        store
            .state
            .hidden_built_in_presets
            .insert("SDXL", vec!["Square".to_string()]);

        let json = r#"{
            "customPresets": {
                "Mine": {"B": {"width": 10, "height": 20}, "C": {"width": 30, "height": 40}},
                "Other": {"Z": {"width": 50, "height": 60}}
            },
            "hiddenBuiltInPresets": {"SDXL": ["Square", "Wide"]}
        }"#;
        assert_eq!(store.import_json(json, true).unwrap(), 3);

        assert_eq!(names(&store, "Mine"), vec!["A", "B", "C"]);
        assert_eq!(
            store.custom_presets().get("Mine").unwrap().get("B"),
            Some(&Dimension::new(10, 20))
        );
        assert_eq!(names(&store, "Other"), vec!["Z"]);
        assert_eq!(
            store.state().hidden_built_in_presets.get("SDXL"),
            Some(&vec!["Square".to_string(), "Wide".to_string()])
        );
    }

    /// Test 20: Replace import swaps the whole state, legacy accepted
    #[test]
    fn test_import_replace_legacy() {
        let mut store = store_with("Mine", &["A"]);
        let legacy = r#"{"Imported": {"Q": {"width": 100, "height": 200}}}"#;
        assert_eq!(store.import_json(legacy, false).unwrap(), 1);
        assert!(!store.custom_presets().contains_key("Mine"));
        assert_eq!(names(&store, "Imported"), vec!["Q"]);
    }

    /// Test 21: Invalid import leaves the store untouched
    #[test]
    fn test_import_invalid_is_atomic() {
        let mut store = store_with("Mine", &["A"]);
        let snapshot = store.persisted().to_string();

        let bad = r#"{"customPresets": {"Mine": {"Good": {"width": 1, "height": 1}, "Bad": {"width": 1}}}}"#;
        assert!(matches!(store.import_json(bad, true), Err(StoreError::Import(_))));
        assert!(matches!(store.import_json("not json", false), Err(StoreError::Import(_))));

        assert_eq!(store.persisted(), snapshot);
        assert_eq!(names(&store, "Mine"), vec!["A"]);
    }

    /// Test 22: Loading skips invalid entries and keeps the valid ones
    #[test]
    fn test_load_keeps_valid_entries() {
        let json = r#"{
            "customPresets": {
                "Mine": {
                    "A": {"width": 640, "height": 480},
                    "B": {"width": 800, "height": 600},
                    "Bad": {"width": 512}
                },
                "Broken": {"Only": {"width": "wide", "height": 1}}
            },
            "hiddenBuiltInPresets": {"Standard": ["Wide", 7]}
        }"#;

        let mut store = PresetStore::load(Some(json));
        assert_eq!(names(&store, "Mine"), vec!["A", "B"]);
        assert!(!store.custom_presets().contains_key("Broken"));
        assert!(store.is_hidden("Standard", "Wide"));

        store.add("Other", "Z", 64, 64).unwrap();
        let reloaded = PresetStore::load(Some(store.persisted()));
        assert_eq!(names(&reloaded, "Mine"), vec!["A", "B"]);
        assert_eq!(names(&reloaded, "Other"), vec!["Z"]);

        let mut strict = PresetStore::new();
        assert!(matches!(strict.import_json(json, false), Err(StoreError::Import(_))));
    }

    /// Test 23: A custom override of a hidden built-in keeps the built-in's position
    #[test]
    fn test_category_presets_override_hidden_in_place() {
        let builtins = builtins();
        let mut store = PresetStore::new();
        store.toggle_hidden("Standard", "X", &builtins).unwrap();
        store.add("Standard", "Extra", 300, 200).unwrap();
        store.add("Standard", "X", 2048, 2048).unwrap();

        let visible = store.category_presets("Standard", &builtins, false);
        assert_eq!(visible.keys().collect::<Vec<_>>(), vec!["X", "Wide", "Extra"]);
        assert_eq!(visible.get("X"), Some(&Dimension::new(2048, 2048)));

        let merged = store.merged(&builtins);
        assert_eq!(
            merged.get("Standard").unwrap().keys().collect::<Vec<_>>(),
            visible.keys().collect::<Vec<_>>()
        );
    }
}

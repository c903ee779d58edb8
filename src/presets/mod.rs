// SPDX-License-Identifier: GPL-3.0-only

//! Preset catalog and custom preset store.
//!
//! This module holds the read-only built-in catalog, the user's custom presets
//! and hidden built-ins, and the JSON layout they persist to.
//!
//! # Features
//!
//! - **Ordered collections**: category and preset order is explicit and survives
//!   rename, reorder, move, and import
//! - **Two persisted layouts**: the current `{customPresets, hiddenBuiltInPresets}`
//!   layout and the legacy bare category map
//! - **Atomic validation**: malformed documents are rejected as a whole with
//!   field paths and suggestions
//! - **Persist-on-mutate**: every successful change refreshes the serialized
//!   snapshot the host stores
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use resolution_master::presets::{load_builtin_catalog, PresetStore};
//!
//! let builtins = load_builtin_catalog()?;
//! let mut store = PresetStore::load(host.get_property("presets"));
//!
//! if let Err(e) = store.rename("My Sizes", "Banner", "Wide Banner") {
//!     ui.show_message(&e.to_string());
//! }
//!
//! for (category, presets) in store.merged(&builtins).iter() {
//!     for (name, entry) in presets.iter().filter(|(_, e)| !e.is_hidden) {
//!         println!("{} / {}: {}x{}", category, name, entry.width, entry.height);
//!     }
//! }
//! ```

pub mod builtin;
pub mod ordered;
pub mod parser;
pub mod store;
pub mod types;

pub use builtin::load_builtin_catalog;
pub use ordered::OrderedMap;
pub use parser::{parse_catalog, parse_state, parse_state_file, parse_state_lenient};
pub use store::PresetStore;
pub use types::{
    Catalog, Dimension, MergedCatalog, MergedCategory, ParseError, ParseResult, PersistedState,
    PresetEntry, PresetMap, Severity, StoreError, StoreStats, ValidationIssue,
};

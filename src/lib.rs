// SPDX-License-Identifier: GPL-3.0-only

//! ResolutionMaster - preset store and resolution engine
//!
//! This crate provides the logic behind a width/height picker for image
//! generation nodes: a catalog of built-in presets with user customizations
//! layered on top, and the calculations that snap and fit dimensions to those
//! presets and to model-specific limits.
//!
//! # Architecture
//!
//! The crate is host-agnostic. A host (a node editor widget, or the bundled
//! command-line tool) owns the UI and the persisted property; it calls into
//! the core and writes back the dimensions it gets.
//!
//! 1. **Preset store** (`presets`): built-in catalog, custom presets, hidden
//!    built-ins, import/export, persisted as one JSON string.
//!
//! 2. **Resolution engine** (`engine`): closest-preset matching, aspect-ratio
//!    fitting, model strategies (Flux, Flux.2, WAN, Qwen-Image, ...), and
//!    rescale factors.
//!
//! # Modules
//!
//! - `app_settings`: Centralized constants and model limits
//! - `cli`: Command-line host
//! - `config`: Per-node settings loaded from JSON
//! - `engine`: Pure dimension calculations
//! - `presets`: Catalog, store, persisted layout
//! - `session`: Current dimensions wired to the store and engine

pub mod app_settings;
pub mod cli;
pub mod config;
pub mod engine;
pub mod presets;
pub mod session;

pub use crate::presets::{Dimension, PresetStore};
pub use crate::session::Session;

// ============================================================================
// Integration Tests
// ============================================================================

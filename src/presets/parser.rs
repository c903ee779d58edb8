// SPDX-License-Identifier: GPL-3.0-only

//! Parsing and validation of persisted preset documents.
//!
//! Two layouts are accepted:
//!
//! - **Current**: `{"customPresets": {...}, "hiddenBuiltInPresets": {...}}`
//! - **Legacy**: a bare `{"<Category>": {"<Name>": {"width", "height"}}}` map,
//!   read as custom presets only.
//!
//! Documents are walked as `serde_json::Value` trees so every problem can be
//! reported with its field path. Structural problems are errors and reject the
//! whole document; empty categories and duplicate hidden names are warnings
//! and are dropped. [`parse_state_lenient`] instead skips every invalid entry
//! and keeps the rest, for state the user already owns.

use crate::presets::ordered::OrderedMap;
use crate::presets::types::{
    Catalog, Dimension, ParseError, ParseResult, PersistedState, PresetMap, Severity,
    ValidationIssue,
};
use serde_json::{Map, Value};
use std::fs;

const CUSTOM_PRESETS_KEY: &str = "customPresets";
const HIDDEN_PRESETS_KEY: &str = "hiddenBuiltInPresets";

/// Parses a persisted store document in either layout.
///
/// # Example
///
/// ```rust,ignore
/// use resolution_master::presets::parse_state;
///
/// let legacy = r#"{"Mine": {"Wide": {"width": 1280, "height": 720}}}"#;
/// let state = parse_state(legacy).unwrap().into_value();
/// assert!(state.custom_presets.contains_key("Mine"));
/// ```
pub fn parse_state(json: &str) -> Result<ParseResult<PersistedState>, ParseError> {
    let (state, issues) = read_state(json)?;
    finish(state, issues)
}

/// Parses a persisted store document, skipping entries that fail validation.
///
/// Only malformed JSON and a non-object root are errors. Every other problem
/// becomes a warning and the offending preset, hidden name, or category is
/// left out.
pub fn parse_state_lenient(json: &str) -> Result<ParseResult<PersistedState>, ParseError> {
    let (state, issues) = read_state(json)?;

    let warnings: Vec<ValidationIssue> = issues
        .into_iter()
        .map(|mut issue| {
            if issue.is_error() {
                tracing::warn!("Skipped invalid entry: {}", issue);
                issue.severity = Severity::Warning;
            }
            issue
        })
        .collect();
    Ok(ParseResult::with_warnings(state, warnings))
}

fn read_state(json: &str) -> Result<(PersistedState, Vec<ValidationIssue>), ParseError> {
    let root: Value = serde_json::from_str(json)?;
    let mut issues = Vec::new();

    let Some(root) = root.as_object() else {
        return Err(ParseError::validation_error(vec![
            ValidationIssue::new(Severity::Error, "Document must be a JSON object", "$")
                .with_suggestion("Export presets again to get a valid file"),
        ]));
    };

    let state = if root.contains_key(CUSTOM_PRESETS_KEY) {
        let custom_presets = match &root[CUSTOM_PRESETS_KEY] {
            Value::Null => Catalog::new(),
            value => validate_catalog(value, CUSTOM_PRESETS_KEY, &mut issues),
        };
        let hidden_built_in_presets = match root.get(HIDDEN_PRESETS_KEY) {
            None | Some(Value::Null) => OrderedMap::new(),
            Some(value) => validate_hidden(value, HIDDEN_PRESETS_KEY, &mut issues),
        };
        PersistedState {
            custom_presets,
            hidden_built_in_presets,
        }
    } else {
        tracing::debug!("Reading legacy preset layout");
        PersistedState {
            custom_presets: validate_catalog_map(root, "$", &mut issues),
            hidden_built_in_presets: OrderedMap::new(),
        }
    };

    Ok((state, issues))
}

/// Parses a catalog document (`{"<Category>": {"<Name>": {...}}}`).
///
/// Used for the built-in catalog, which has no hidden section.
pub fn parse_catalog(json: &str) -> Result<ParseResult<Catalog>, ParseError> {
    let root: Value = serde_json::from_str(json)?;
    let mut issues = Vec::new();
    let catalog = validate_catalog(&root, "$", &mut issues);
    finish(catalog, issues)
}

/// Reads and parses a persisted store file.
pub fn parse_state_file(path: &str) -> Result<ParseResult<PersistedState>, ParseError> {
    let json = fs::read_to_string(path).map_err(|e| ParseError::io_error_with_path(e, path))?;
    parse_state(&json).map_err(|e| e.with_path(path))
}

fn finish<T>(value: T, issues: Vec<ValidationIssue>) -> Result<ParseResult<T>, ParseError> {
    if issues.iter().any(ValidationIssue::is_error) {
        return Err(ParseError::validation_error(issues));
    }
    for warning in &issues {
        tracing::debug!("{}", warning);
    }
    Ok(ParseResult::with_warnings(value, issues))
}

fn validate_catalog(value: &Value, path: &str, issues: &mut Vec<ValidationIssue>) -> Catalog {
    match value.as_object() {
        Some(map) => validate_catalog_map(map, path, issues),
        None => {
            issues.push(ValidationIssue::new(
                Severity::Error,
                "Expected an object mapping category names to presets",
                path,
            ));
            Catalog::new()
        }
    }
}

fn validate_catalog_map(
    map: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Catalog {
    let mut catalog = Catalog::new();

    for (category, presets_value) in map {
        let category_path = format!("{}.{}", path, category);

        let Some(presets) = presets_value.as_object() else {
            issues.push(ValidationIssue::new(
                Severity::Error,
                "Category must be an object mapping preset names to dimensions",
                category_path,
            ));
            continue;
        };

        let mut validated = PresetMap::new();
        for (name, preset) in presets {
            let preset_path = format!("{}.{}", category_path, name);
            if let Some(dimension) = validate_preset(preset, &preset_path, issues) {
                validated.insert(name.clone(), dimension);
            }
        }

        if presets.is_empty() {
            issues.push(
                ValidationIssue::new(Severity::Warning, "Empty category dropped", category_path)
                    .with_suggestion("Add a preset or remove the category"),
            );
            continue;
        }
        if validated.is_empty() {
            continue;
        }

        catalog.insert(category.clone(), validated);
    }

    catalog
}

fn validate_preset(
    value: &Value,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Dimension> {
    let Some(preset) = value.as_object() else {
        issues.push(ValidationIssue::new(
            Severity::Error,
            "Preset must be an object with width and height",
            path,
        ));
        return None;
    };

    let width = validate_side(preset.get("width"), &format!("{}.width", path), issues);
    let height = validate_side(preset.get("height"), &format!("{}.height", path), issues);

    Some(Dimension::new(width?, height?))
}

fn validate_side(value: Option<&Value>, path: &str, issues: &mut Vec<ValidationIssue>) -> Option<u32> {
    let Some(value) = value else {
        issues.push(ValidationIssue::new(Severity::Error, "Missing dimension", path));
        return None;
    };

    let Some(number) = value.as_f64() else {
        issues.push(
            ValidationIssue::new(Severity::Error, "Dimension must be a number", path)
                .with_suggestion("Use a plain number such as 1024"),
        );
        return None;
    };

    let rounded = number.round();
    if !rounded.is_finite() || rounded < 1.0 || rounded > u32::MAX as f64 {
        issues.push(ValidationIssue::new(
            Severity::Error,
            format!("Dimension {} is out of range", number),
            path,
        ));
        return None;
    }

    Some(rounded as u32)
}

fn validate_hidden(
    value: &Value,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) -> OrderedMap<Vec<String>> {
    let mut hidden = OrderedMap::new();

    let Some(map) = value.as_object() else {
        issues.push(ValidationIssue::new(
            Severity::Error,
            "Expected an object mapping category names to lists of preset names",
            path,
        ));
        return hidden;
    };

    for (category, names_value) in map {
        let category_path = format!("{}.{}", path, category);

        let Some(names) = names_value.as_array() else {
            issues.push(ValidationIssue::new(
                Severity::Error,
                "Hidden presets must be a list of names",
                category_path,
            ));
            continue;
        };

        let mut validated: Vec<String> = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            match name.as_str() {
                Some(name) if validated.iter().any(|n| n == name) => {
                    issues.push(ValidationIssue::new(
                        Severity::Warning,
                        format!("Duplicate hidden preset '{}' dropped", name),
                        format!("{}[{}]", category_path, index),
                    ));
                }
                Some(name) => validated.push(name.to_string()),
                None => issues.push(ValidationIssue::new(
                    Severity::Error,
                    "Hidden preset name must be a string",
                    format!("{}[{}]", category_path, index),
                )),
            }
        }

        if validated.is_empty() {
            continue;
        }
        hidden.insert(category.clone(), validated);
    }

    hidden
}

// ============================================================================
// Tests
// ============================================================================

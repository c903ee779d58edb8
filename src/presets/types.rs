// SPDX-License-Identifier: GPL-3.0-only

//! Core data types for the preset store.
//!
//! This module defines the dimension and preset models, the persisted state
//! layout, and the error types shared by the parser and the store.

use crate::presets::ordered::OrderedMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Error Handling Types
// ============================================================================

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal issue that rejects the whole document
    Error,
    /// Non-fatal issue, the offending part is skipped
    Warning,
}

/// A validation issue discovered while parsing preset data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Severity level (Error or Warning)
    pub severity: Severity,
    /// Human-readable description of the issue
    pub message: String,
    /// Path to the field that caused the issue (e.g., "customPresets.SDXL.Square.width")
    pub field_path: String,
    /// Optional suggestion for how to fix the issue
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Creates a new validation issue.
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        field_path: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            field_path: field_path.into(),
            suggestion: None,
        }
    }

    /// Adds a suggestion to the validation issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity_str = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };

        write!(f, "[{}] {}: {}", severity_str, self.field_path, self.message)?;

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }

        Ok(())
    }
}

/// Error type for reading preset documents.
///
/// Wraps I/O and JSON failures with context, and carries the list of
/// validation issues when a document is structurally wrong.
#[derive(Debug)]
pub enum ParseError {
    /// I/O error occurred while reading or writing a preset file
    IoError {
        /// The underlying I/O error
        source: std::io::Error,
        /// Optional file path that caused the error
        file_path: Option<String>,
        /// Optional suggestion for fixing the error
        suggestion: Option<String>,
    },

    /// JSON syntax or serialization error
    JsonError {
        /// The underlying JSON error
        source: serde_json::Error,
        /// Optional file path being parsed
        file_path: Option<String>,
        /// Line number where the error occurred (from serde_json)
        line_number: Option<usize>,
        /// Optional suggestion for fixing the error
        suggestion: Option<String>,
    },

    /// Structural validation failed
    ValidationError {
        /// Issues found (at least one with `Severity::Error`)
        issues: Vec<ValidationIssue>,
        /// Optional file path being validated
        file_path: Option<String>,
    },
}

impl ParseError {
    /// Creates an I/O error with context.
    pub fn io_error(source: std::io::Error) -> Self {
        Self::IoError {
            source,
            file_path: None,
            suggestion: None,
        }
    }

    /// Creates an I/O error with file path.
    pub fn io_error_with_path(source: std::io::Error, file_path: impl Into<String>) -> Self {
        Self::IoError {
            source,
            file_path: Some(file_path.into()),
            suggestion: Some("Check that the file exists and you have read/write permissions".into()),
        }
    }

    /// Creates a JSON parsing error with context.
    pub fn json_error(source: serde_json::Error) -> Self {
        let line_number = match source.line() {
            0 => None,
            line => Some(line),
        };
        Self::JsonError {
            source,
            file_path: None,
            line_number,
            suggestion: Some("Check the JSON syntax at the indicated line".into()),
        }
    }

    /// Creates a validation error from a list of issues.
    pub fn validation_error(issues: Vec<ValidationIssue>) -> Self {
        Self::ValidationError {
            issues,
            file_path: None,
        }
    }

    /// Attaches a file path to errors that do not carry one yet.
    pub fn with_path(self, path: impl Into<String>) -> Self {
        let path = Some(path.into());
        match self {
            Self::IoError {
                source,
                file_path: None,
                suggestion,
            } => Self::IoError {
                source,
                file_path: path,
                suggestion,
            },
            Self::JsonError {
                source,
                file_path: None,
                line_number,
                suggestion,
            } => Self::JsonError {
                source,
                file_path: path,
                line_number,
                suggestion,
            },
            Self::ValidationError {
                issues,
                file_path: None,
            } => Self::ValidationError {
                issues,
                file_path: path,
            },
            other => other,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::IoError {
                source,
                file_path,
                suggestion,
            } => {
                write!(f, "I/O error")?;
                if let Some(path) = file_path {
                    write!(f, " on file '{}'", path)?;
                }
                write!(f, ": {}", source)?;
                if let Some(hint) = suggestion {
                    write!(f, "\n  Suggestion: {}", hint)?;
                }
            }
            ParseError::JsonError {
                source,
                file_path,
                line_number,
                suggestion,
            } => {
                write!(f, "JSON parsing error")?;
                if let Some(path) = file_path {
                    write!(f, " in file '{}'", path)?;
                }
                if let Some(line) = line_number {
                    write!(f, " at line {}", line)?;
                }
                write!(f, ": {}", source)?;
                if let Some(hint) = suggestion {
                    write!(f, "\n  Suggestion: {}", hint)?;
                }
            }
            ParseError::ValidationError { issues, file_path } => {
                write!(f, "Validation failed")?;
                if let Some(path) = file_path {
                    write!(f, " for file '{}'", path)?;
                }
                writeln!(f, " with {} issue(s):", issues.len())?;
                for (i, issue) in issues.iter().enumerate() {
                    write!(f, "  {}. {}", i + 1, issue)?;
                    if i < issues.len() - 1 {
                        writeln!(f)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::IoError { source, .. } => Some(source),
            ParseError::JsonError { source, .. } => Some(source),
            ParseError::ValidationError { .. } => None,
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err)
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::json_error(err)
    }
}

/// Result of successfully parsing a document with optional warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult<T> {
    /// The successfully parsed value
    pub value: T,
    /// Non-fatal validation warnings
    pub warnings: Vec<ValidationIssue>,
}

impl<T> ParseResult<T> {
    /// Creates a new parse result with warnings.
    pub fn with_warnings(value: T, warnings: Vec<ValidationIssue>) -> Self {
        Self { value, warnings }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Consumes the result and returns the value, discarding warnings.
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Reason a store mutation was not applied.
///
/// Every variant means the store is unchanged.
#[derive(Debug)]
pub enum StoreError {
    /// The category, or the preset inside it, does not exist
    NotFound {
        category: String,
        preset: Option<String>,
    },
    /// The target name is already taken by a different entry
    AlreadyExists {
        category: String,
        name: String,
    },
    /// Names must contain something besides whitespace
    InvalidName { name: String },
    /// Width and height must both be positive
    InvalidDimensions { width: u32, height: u32 },
    /// Hiding only applies to built-in presets
    NotBuiltIn { category: String, name: String },
    /// Imported data was rejected
    Import(ParseError),
}

impl StoreError {
    pub fn category_not_found(category: impl Into<String>) -> Self {
        Self::NotFound {
            category: category.into(),
            preset: None,
        }
    }

    pub fn preset_not_found(category: impl Into<String>, preset: impl Into<String>) -> Self {
        Self::NotFound {
            category: category.into(),
            preset: Some(preset.into()),
        }
    }

    pub fn already_exists(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            category: category.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound {
                category,
                preset: Some(preset),
            } => write!(f, "Preset '{}' not found in category '{}'", preset, category),
            StoreError::NotFound {
                category,
                preset: None,
            } => write!(f, "Category '{}' not found", category),
            StoreError::AlreadyExists { category, name } if category.is_empty() => {
                write!(f, "Category '{}' already exists", name)
            }
            StoreError::AlreadyExists { category, name } => {
                write!(f, "Preset '{}' already exists in category '{}'", name, category)
            }
            StoreError::InvalidName { name } => write!(f, "Invalid name '{}'", name),
            StoreError::InvalidDimensions { width, height } => {
                write!(f, "Invalid dimensions {}x{}", width, height)
            }
            StoreError::NotBuiltIn { category, name } => write!(
                f,
                "'{}' in category '{}' is not a built-in preset and cannot be hidden",
                name, category
            ),
            StoreError::Import(err) => write!(f, "Import rejected: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Import(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for StoreError {
    fn from(err: ParseError) -> Self {
        Self::Import(err)
    }
}

// ============================================================================
// Preset Data Structures
// ============================================================================

/// Image width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Builds a dimension from values a host may not have yet.
    ///
    /// Missing or zero values yield `None`.
    pub fn from_optional(width: Option<u32>, height: Option<u32>) -> Option<Self> {
        match (width, height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(Self::new(w, h)),
            _ => None,
        }
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn megapixels(&self) -> f64 {
        self.pixels() as f64 / crate::app_settings::PIXELS_PER_MEGAPIXEL
    }

    /// Same dimension with width and height exchanged.
    pub fn swapped(&self) -> Self {
        Self::new(self.height, self.width)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A preset as presented to the UI: built-in and custom data merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetEntry {
    pub width: u32,
    pub height: u32,
    /// Defined in the custom store (overrides any same-named built-in)
    pub is_custom: bool,
    /// Built-in preset the user chose to hide
    pub is_hidden: bool,
}

impl PresetEntry {
    pub fn dimension(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }
}

/// Presets of one category, in display order.
pub type PresetMap = OrderedMap<Dimension>;

/// Category name to presets, in display order.
pub type Catalog = OrderedMap<PresetMap>;

/// Merged view of one category.
pub type MergedCategory = OrderedMap<PresetEntry>;

/// Merged view of all categories.
pub type MergedCatalog = OrderedMap<MergedCategory>;

/// Everything the store persists, in the current on-disk layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub custom_presets: Catalog,
    #[serde(default)]
    pub hidden_built_in_presets: OrderedMap<Vec<String>>,
}

/// Counts shown next to the preset manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Categories holding at least one custom preset
    pub category_count: usize,
    /// Custom presets across all categories
    pub preset_count: usize,
    /// Hidden built-in presets across all categories
    pub hidden_count: usize,
}

// ============================================================================
// Tests
// ============================================================================

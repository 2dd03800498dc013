//! # Error Types
//!
//! Structured error types for estimator_core. Most failure modes in the
//! estimator degrade silently (bad numbers become zero, unreadable stored
//! documents fall back to the starter template), so these errors only surface
//! where the user has to be told: imports, exports, configuration and
//! explicit lookups.
//!
//! ## Example
//!
//! ```rust
//! use estimator_core::errors::{EstimateError, EstimateResult};
//!
//! fn require_name(name: &str) -> EstimateResult<()> {
//!     if name.trim().is_empty() {
//!         return Err(EstimateError::invalid_input("name", name, "Name must not be blank"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_name("").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for estimator_core operations
pub type EstimateResult<T> = Result<T, EstimateError>;

/// Structured error type for estimator operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EstimateError {
    /// An input value is invalid
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// No preset with this name exists in the catalog
    #[error("Preset not found: {name}")]
    PresetNotFound { name: String },

    /// No line item or laborer matches the given reference
    #[error("{collection} item not found: {reference}")]
    ItemNotFound {
        collection: String,
        reference: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Store file is locked by another process
    #[error("File locked: '{path}' is locked by {locked_by}")]
    FileLocked { path: String, locked_by: String },

    /// JSON serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Imported content is not a valid estimate document
    #[error("Invalid JSON file: {reason}")]
    ImportFailed { reason: String },

    /// Configuration file could not be read or is inconsistent
    #[error("Configuration error in {source_name}: {reason}")]
    ConfigError { source_name: String, reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EstimateError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a PresetNotFound error
    pub fn preset_not_found(name: impl Into<String>) -> Self {
        EstimateError::PresetNotFound { name: name.into() }
    }

    /// Create an ItemNotFound error
    pub fn item_not_found(collection: impl Into<String>, reference: impl Into<String>) -> Self {
        EstimateError::ItemNotFound {
            collection: collection.into(),
            reference: reference.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>) -> Self {
        EstimateError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
        }
    }

    /// Create an ImportFailed error
    pub fn import_failed(reason: impl Into<String>) -> Self {
        EstimateError::ImportFailed { reason: reason.into() }
    }

    /// Create a ConfigError
    pub fn config_error(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::ConfigError {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EstimateError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EstimateError::InvalidInput { .. } => "INVALID_INPUT",
            EstimateError::PresetNotFound { .. } => "PRESET_NOT_FOUND",
            EstimateError::ItemNotFound { .. } => "ITEM_NOT_FOUND",
            EstimateError::FileError { .. } => "FILE_ERROR",
            EstimateError::FileLocked { .. } => "FILE_LOCKED",
            EstimateError::SerializationError { .. } => "SERIALIZATION_ERROR",
            EstimateError::ImportFailed { .. } => "IMPORT_FAILED",
            EstimateError::ConfigError { .. } => "CONFIG_ERROR",
            EstimateError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

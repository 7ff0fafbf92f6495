//! # Error Types
//!
//! Structured error types for monica_core. Every failure in a run ends the
//! run: there is no retry and no partial submission to the engine. The
//! variants carry enough context (path, document, layer index) to point at
//! the input that needs fixing.
//!
//! ## Example
//!
//! ```rust
//! use monica_core::errors::{RunError, RunResult};
//!
//! fn layer_at(layers: &[u32], index: usize) -> RunResult<u32> {
//!     layers
//!         .get(index)
//!         .copied()
//!         .ok_or_else(|| RunError::soil_layer_out_of_range(index, layers.len()))
//! }
//!
//! assert!(layer_at(&[1], 1).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for monica_core operations
pub type RunResult<T> = Result<T, RunError>;

/// Structured error type for a simulation run.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum RunError {
    /// File I/O error (input documents or result file)
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// A document is not valid JSON or lacks a required field
    #[error("Parse error in {document} document '{path}': {reason}")]
    ParseError {
        document: String,
        path: String,
        reason: String,
    },

    /// The soil layer targeted by the overrides does not exist
    #[error("Soil layer index {index} out of range: profile has {len} layer(s)")]
    SoilLayerOutOfRange { index: usize, len: usize },

    /// A document could not be serialized for the engine request
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// The engine could not be invoked or answered with an unusable response
    #[error("Engine '{engine}' failed: {reason}")]
    EngineFailed { engine: String, reason: String },

    /// The `run` field of the engine response is not valid JSON
    #[error("Malformed run result: {reason}")]
    MalformedResult { reason: String },
}

impl RunError {
    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        RunError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a ParseError
    pub fn parse_error(document: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        RunError::ParseError {
            document: document.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SoilLayerOutOfRange error
    pub fn soil_layer_out_of_range(index: usize, len: usize) -> Self {
        RunError::SoilLayerOutOfRange { index, len }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        RunError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Create an EngineFailed error
    pub fn engine_failed(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        RunError::EngineFailed {
            engine: engine.into(),
            reason: reason.into(),
        }
    }

    /// Create a MalformedResult error
    pub fn malformed_result(reason: impl Into<String>) -> Self {
        RunError::MalformedResult {
            reason: reason.into(),
        }
    }

    /// Whether the failure happened before the engine was called.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RunError::FileError { .. } | RunError::ParseError { .. } | RunError::SoilLayerOutOfRange { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            RunError::FileError { .. } => "FILE_ERROR",
            RunError::ParseError { .. } => "PARSE_ERROR",
            RunError::SoilLayerOutOfRange { .. } => "SOIL_LAYER_OUT_OF_RANGE",
            RunError::SerializationError { .. } => "SERIALIZATION_ERROR",
            RunError::EngineFailed { .. } => "ENGINE_FAILED",
            RunError::MalformedResult { .. } => "MALFORMED_RESULT",
        }
    }
}

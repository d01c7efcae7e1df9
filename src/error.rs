//! Error types for lpmodel.

use thiserror::Error;

/// Error type for model compilation.
///
/// Every variant is terminal for the compilation attempt that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Wrong shape, missing required field, wrong field type, or a bad
    /// number of operation keys.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A `range` operand whose lower end is not strictly below its upper end.
    #[error("Invalid range for constraint '{name}': lower {lower} must be less than upper {upper}")]
    InvalidRange {
        name: String,
        lower: f64,
        upper: f64,
    },

    /// A name used as a cross-reference that was never declared.
    #[error("Unknown reference in '{name}': no constraint named '{reference}'")]
    UnknownReference { name: String, reference: String },

    /// A bound operation keyword outside the supported vocabulary.
    #[error("Unrecognized constraint type '{operation}' in constraint '{name}'")]
    UnrecognizedOperation { name: String, operation: String },
}

impl CompileError {
    /// Shorthand for a schema error.
    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        CompileError::Schema(msg.into())
    }
}

/// Result type for lpmodel operations.
pub type Result<T> = std::result::Result<T, CompileError>;

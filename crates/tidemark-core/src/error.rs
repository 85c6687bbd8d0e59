//! Error types for SQL generation.

use crate::column::DbType;

/// How a generator reacts to features the target dialect cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompatibilityMode {
    /// Unsupported features are hard errors.
    #[default]
    Strict,
    /// Unsupported statements degrade to a `--` comment that the executor
    /// skips; unsupported column fragments are dropped.
    Loose,
}

/// Errors that can occur while translating expressions to SQL.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The target dialect cannot express the requested feature.
    #[error("{dialect} does not support {feature}")]
    Unsupported {
        /// Dialect name.
        dialect: &'static str,
        /// Human-readable feature description.
        feature: String,
    },

    /// No type mapping exists for the requested abstract type and capacity.
    #[error("no type mapping for {db_type}{}", .size.map(|s| format!(" with size {s}")).unwrap_or_default())]
    UnmappedType {
        /// The abstract type.
        db_type: DbType,
        /// The requested capacity, if any.
        size: Option<u32>,
    },

    /// A type template needs a capacity the column does not provide.
    #[error("type template '{template}' requires {placeholder} but the column does not specify one")]
    MissingCapacity {
        /// The offending template.
        template: String,
        /// The placeholder that could not be substituted.
        placeholder: &'static str,
    },

    /// An identifier exceeds the dialect's name length limit.
    #[error("identifier '{name}' exceeds the {max}-character limit of {dialect}")]
    IdentifierTooLong {
        /// Dialect name.
        dialect: &'static str,
        /// The offending identifier.
        name: String,
        /// Maximum allowed length.
        max: usize,
    },

    /// The expression is structurally invalid.
    #[error("invalid expression: {0}")]
    InvalidExpression(String),
}

/// Result type for SQL generation.
pub type Result<T> = std::result::Result<T, GenerateError>;

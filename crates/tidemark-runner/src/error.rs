//! Runner error types.

use thiserror::Error;
use tidemark_core::error::GenerateError;

/// Errors raised while applying or rolling back migrations.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// A statement failed; the offending SQL travels with the error.
    #[error("failed to execute `{sql}`: {source}")]
    Execution {
        /// The statement that failed.
        sql: String,
        #[source]
        source: sqlx::Error,
    },

    /// Rollback was requested for a migration without a derivable reverse.
    #[error("migration {version} '{name}' is not reversible")]
    NotReversible {
        /// Migration version.
        version: i64,
        /// Migration name.
        name: String,
    },

    /// The database records a version no registered migration carries.
    #[error("no registered migration has version {0}")]
    VersionNotFound(i64),

    /// Two migrations were registered with the same version.
    #[error("duplicate migration version {version}: '{first}' and '{second}'")]
    DuplicateVersion {
        /// The colliding version.
        version: i64,
        /// Name of the first registration.
        first: String,
        /// Name of the second registration.
        second: String,
    },

    /// Database error outside statement execution.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// SQL generation failed.
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// Result alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

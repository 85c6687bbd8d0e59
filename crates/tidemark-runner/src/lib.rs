//! Async migration runner over sqlx.
//!
//! `tidemark-runner` executes the expressions `tidemark-core` builds:
//! a [`Processor`](processor::Processor) per backend runs the generated
//! SQL and answers catalog queries, while the
//! [`MigrationRunner`](runner::MigrationRunner) tracks applied versions in
//! a bookkeeping table and scopes work in transactions.
//!
//! # Example
//!
//! ```rust,no_run
//! use sqlx::sqlite::SqlitePoolOptions;
//! use tidemark_core::prelude::*;
//! use tidemark_runner::prelude::*;
//!
//! struct CreateUsers;
//!
//! impl Migration for CreateUsers {
//!     const VERSION: i64 = 20240101120000;
//!     const NAME: &'static str = "create_users";
//!
//!     fn up() -> Vec<MigrationExpression> {
//!         vec![CreateTableBuilder::new()
//!             .name("users")
//!             .column(bigint("id").primary_key().identity().build())
//!             .build()
//!             .into()]
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), MigrateError> {
//!     let pool = SqlitePoolOptions::new().connect("sqlite://app.db").await?;
//!     let processor = SqliteProcessor::new(pool, SqliteGenerator::new());
//!     let mut runner = MigrationRunner::new(processor);
//!     runner.add::<CreateUsers>()?;
//!     runner.migrate_up().await
//! }
//! ```

pub mod error;
pub mod processor;
pub mod runner;
pub mod version;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{MigrateError, Result};
    pub use crate::processor::{PostgresProcessor, Processor, SqliteProcessor};
    pub use crate::runner::{
        register, MigrationRunner, MigrationStatus, RegisteredMigration, RunnerOptions,
        TransactionBehavior,
    };
    pub use crate::version::VersionTable;
}

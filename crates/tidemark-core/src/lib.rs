//! Dialect-aware schema migrations for Rust.
//!
//! `tidemark-core` is the pure half of the framework: migrations are built
//! with fluent builders into [`MigrationExpression`] values, and a
//! [`SqlGenerator`](generator::SqlGenerator) per dialect turns those into
//! SQL text. No I/O happens in this crate; execution lives in
//! `tidemark-runner`.
//!
//! # Components
//!
//! - **Expressions** - One value per schema or data change
//! - **Builders** - Fluent, typestate-checked construction
//! - **Type maps** - Abstract column types resolved per dialect
//! - **Quoters** - Identifier and literal escaping per dialect
//! - **Generators** - Expression-to-SQL translation
//! - **Batch splitters** - `GO` and PL/SQL block handling for raw scripts
//!
//! # Example
//!
//! ```rust
//! use tidemark_core::prelude::*;
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
//!             .column(string("username", 255).not_null().unique().build())
//!             .build()
//!             .into()]
//!     }
//! }
//!
//! let generator = PostgresGenerator::new();
//! let sql = generator.generate(&CreateUsers::up()[0]).unwrap();
//! assert!(sql[0].starts_with("CREATE TABLE"));
//! ```

pub mod batch;
pub mod column;
pub mod error;
pub mod expression;
pub mod generator;
pub mod quoter;
pub mod table;
pub mod typemap;

use expression::MigrationExpression;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::column::{
        ansi_string, bigint, binary, boolean, currency, date, datetime, decimal, double,
        fixed_string, guid, integer, real, smallint, string, text, time, ColumnBuilder, DbType,
        ForeignKeyAction, SystemMethod, Value,
    };
    pub use crate::error::{CompatibilityMode, GenerateError, Result};
    pub use crate::expression::{
        CreateSequenceExpression, DeleteDataExpression, InsertDataExpression, MigrationExpression,
        SqlExpression, UpdateDataExpression,
    };
    pub use crate::generator::{
        GeneratorOptions, MsSqlGenerator, MySqlGenerator, OracleGenerator, PostgresGenerator,
        SqlGenerator, SqliteGenerator,
    };
    pub use crate::quoter::Quoter;
    pub use crate::table::{CreateTableBuilder, ForeignKeyBuilder, IndexBuilder};
    pub use crate::typemap::TypeMap;
    pub use crate::Migration;
}

/// A schema migration defined in Rust code.
///
/// Versions order migrations globally; timestamps (`YYYYMMDDHHMMSS`) keep
/// them unique across branches.
pub trait Migration {
    /// Globally unique, monotonically ordered version.
    const VERSION: i64;

    /// Human-readable name recorded next to the version.
    const NAME: &'static str;

    /// Expressions applied when migrating up.
    fn up() -> Vec<MigrationExpression>;

    /// Expressions applied when rolling back.
    ///
    /// The default derives the rollback by reversing `up`. Override this
    /// together with [`Migration::is_reversible`] when the rollback needs
    /// hand-written expressions.
    fn down() -> Vec<MigrationExpression> {
        Self::up()
            .iter()
            .rev()
            .filter_map(MigrationExpression::reverse)
            .collect()
    }

    /// Whether the migration can be rolled back.
    fn is_reversible() -> bool {
        Self::up().iter().all(MigrationExpression::is_reversible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    struct CreateUsers;

    impl Migration for CreateUsers {
        const VERSION: i64 = 20240101120000;
        const NAME: &'static str = "create_users";

        fn up() -> Vec<MigrationExpression> {
            vec![CreateTableBuilder::new()
                .name("users")
                .column(bigint("id").primary_key().identity().build())
                .build()
                .into()]
        }
    }

    struct SeedUsers;

    impl Migration for SeedUsers {
        const VERSION: i64 = 20240102090000;
        const NAME: &'static str = "seed_users";

        fn up() -> Vec<MigrationExpression> {
            vec![InsertDataExpression::new("users")
                .row(vec![("id".to_string(), Value::Int(1))])
                .into()]
        }
    }

    #[test]
    fn test_default_down_reverses_up() {
        let down = CreateUsers::down();
        assert_eq!(down.len(), 1);
        assert!(matches!(down[0], MigrationExpression::DropTable(_)));
        assert!(CreateUsers::is_reversible());
    }

    #[test]
    fn test_insert_reverses_to_delete() {
        let down = SeedUsers::down();
        assert_eq!(down.len(), 1);
        assert!(matches!(down[0], MigrationExpression::DeleteData(_)));
    }
}

//! SQLite SQL generation.
//!
//! SQLite is dynamically typed with a handful of storage classes, and its
//! ALTER TABLE covers only renames, ADD COLUMN and DROP COLUMN. Everything
//! else degrades through the compatibility mode.

use super::{GeneratorOptions, IdentityPosition, SqlGenerator};
use crate::column::{ColumnDefinition, DbType};
use crate::error::Result;
use crate::expression::{
    AlterColumnExpression, CreateForeignKeyExpression, CreateSequenceExpression,
    DropForeignKeyExpression, DropSequenceExpression,
};
use crate::quoter::{Quoter, SqliteQuoter};
use crate::typemap::TypeMap;

/// SQLite generator.
#[derive(Debug, Clone)]
pub struct SqliteGenerator {
    quoter: SqliteQuoter,
    type_map: TypeMap,
    options: GeneratorOptions,
}

impl Default for SqliteGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqliteGenerator {
    /// Creates a generator with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(GeneratorOptions::default())
    }

    /// Creates a generator with explicit options.
    #[must_use]
    pub fn with_options(options: GeneratorOptions) -> Self {
        Self {
            quoter: SqliteQuoter,
            type_map: build_type_map(),
            options,
        }
    }
}

/// Everything collapses onto the five storage classes. Sized entries keep
/// sized requests resolvable; the size itself is discarded.
fn build_type_map() -> TypeMap {
    let mut map = TypeMap::new();
    for text in [
        DbType::AnsiString,
        DbType::AnsiStringFixedLength,
        DbType::String,
        DbType::StringFixedLength,
        DbType::Date,
        DbType::Time,
        DbType::DateTime,
        DbType::DateTimeOffset,
        DbType::Guid,
        DbType::Xml,
    ] {
        map.set_type(text, "TEXT");
        map.set_type_with_size(text, u32::MAX, "TEXT");
    }
    for int in [
        DbType::Boolean,
        DbType::Byte,
        DbType::Int16,
        DbType::Int32,
        DbType::Int64,
    ] {
        map.set_type(int, "INTEGER");
    }
    map.set_type(DbType::Single, "REAL");
    map.set_type(DbType::Double, "REAL");
    map.set_type(DbType::Decimal, "NUMERIC");
    map.set_type(DbType::Currency, "NUMERIC");
    map.set_type(DbType::Binary, "BLOB");
    map.set_type_with_size(DbType::Binary, u32::MAX, "BLOB");
    map
}

impl SqlGenerator for SqliteGenerator {
    fn dialect(&self) -> &'static str {
        "sqlite"
    }

    fn quoter(&self) -> &dyn Quoter {
        &self.quoter
    }

    fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn identity_keyword(&self) -> Option<&'static str> {
        Some("AUTOINCREMENT")
    }

    fn identity_position(&self) -> IdentityPosition {
        IdentityPosition::AfterPrimaryKey
    }

    // AUTOINCREMENT only exists on INTEGER PRIMARY KEY columns.
    fn identity_clause(&self, column: &ColumnDefinition) -> Result<String> {
        if column.primary_key {
            Ok("AUTOINCREMENT".to_string())
        } else {
            self.unsupported_fragment("identity on a non-primary-key column")
        }
    }

    fn alter_column(&self, _e: &AlterColumnExpression) -> Result<Vec<String>> {
        self.unsupported_statement("altering a column")
    }

    fn create_foreign_key(&self, _e: &CreateForeignKeyExpression) -> Result<Vec<String>> {
        self.unsupported_statement("adding a foreign key to an existing table")
    }

    fn drop_foreign_key(&self, _e: &DropForeignKeyExpression) -> Result<Vec<String>> {
        self.unsupported_statement("dropping a foreign key")
    }

    fn create_sequence(&self, _e: &CreateSequenceExpression) -> Result<Vec<String>> {
        self.unsupported_statement("sequences")
    }

    fn drop_sequence(&self, _e: &DropSequenceExpression) -> Result<Vec<String>> {
        self.unsupported_statement("sequences")
    }
}

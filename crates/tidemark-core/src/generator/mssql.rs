//! SQL Server SQL generation.
//!
//! Renames go through `sp_rename`, defaults are named DF_ constraints, and
//! neither CREATE TABLE nor CREATE INDEX accepts IF NOT EXISTS; callers
//! guard with catalog queries instead.

use super::{GeneratorOptions, SqlGenerator};
use crate::column::DbType;
use crate::error::{GenerateError, Result};
use crate::expression::{
    AddColumnExpression, AlterColumnChange, AlterColumnExpression, DropIndexExpression,
    RenameColumnExpression, RenameTableExpression,
};
use crate::quoter::{MsSqlQuoter, Quoter};
use crate::typemap::TypeMap;

const MAX_VARCHAR: u32 = 8000;
const MAX_NVARCHAR: u32 = 4000;

/// SQL Server generator.
#[derive(Debug, Clone)]
pub struct MsSqlGenerator {
    quoter: MsSqlQuoter,
    type_map: TypeMap,
    options: GeneratorOptions,
}

impl Default for MsSqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MsSqlGenerator {
    /// Creates a generator with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(GeneratorOptions::default())
    }

    /// Creates a generator with explicit options.
    #[must_use]
    pub fn with_options(options: GeneratorOptions) -> Self {
        Self {
            quoter: MsSqlQuoter,
            type_map: build_type_map(),
            options,
        }
    }

    fn default_constraint_name(table: &str, column: &str) -> String {
        format!("DF_{table}_{column}")
    }
}

fn build_type_map() -> TypeMap {
    let mut map = TypeMap::new();
    map.set_type(DbType::AnsiString, "VARCHAR(255)");
    map.set_type_with_size(DbType::AnsiString, MAX_VARCHAR, "VARCHAR($size)");
    map.set_type_with_size(DbType::AnsiString, u32::MAX, "VARCHAR(MAX)");
    map.set_type(DbType::AnsiStringFixedLength, "CHAR(255)");
    map.set_type_with_size(DbType::AnsiStringFixedLength, MAX_VARCHAR, "CHAR($size)");
    map.set_type(DbType::String, "NVARCHAR(255)");
    map.set_type_with_size(DbType::String, MAX_NVARCHAR, "NVARCHAR($size)");
    map.set_type_with_size(DbType::String, u32::MAX, "NVARCHAR(MAX)");
    map.set_type(DbType::StringFixedLength, "NCHAR(255)");
    map.set_type_with_size(DbType::StringFixedLength, MAX_NVARCHAR, "NCHAR($size)");
    map.set_type(DbType::Binary, "VARBINARY(MAX)");
    map.set_type_with_size(DbType::Binary, MAX_VARCHAR, "VARBINARY($size)");
    map.set_type_with_size(DbType::Binary, u32::MAX, "VARBINARY(MAX)");
    map.set_type(DbType::Boolean, "BIT");
    map.set_type(DbType::Byte, "TINYINT");
    map.set_type(DbType::Int16, "SMALLINT");
    map.set_type(DbType::Int32, "INT");
    map.set_type(DbType::Int64, "BIGINT");
    map.set_type(DbType::Single, "REAL");
    map.set_type(DbType::Double, "FLOAT");
    map.set_type(DbType::Decimal, "DECIMAL($precision,$scale)");
    map.set_type(DbType::Currency, "MONEY");
    map.set_type(DbType::Date, "DATE");
    map.set_type(DbType::Time, "TIME");
    map.set_type(DbType::DateTime, "DATETIME2");
    map.set_type(DbType::DateTimeOffset, "DATETIMEOFFSET");
    map.set_type(DbType::Guid, "UNIQUEIDENTIFIER");
    map.set_type(DbType::Xml, "XML");
    map
}

impl SqlGenerator for MsSqlGenerator {
    fn dialect(&self) -> &'static str {
        "mssql"
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
        Some("IDENTITY(1,1)")
    }

    fn supports_if_not_exists_tables(&self) -> bool {
        false
    }

    fn supports_if_not_exists_indexes(&self) -> bool {
        false
    }

    fn rename_table(&self, e: &RenameTableExpression) -> Result<Vec<String>> {
        self.check_identifier(&e.new_name)?;
        Ok(vec![format!(
            "EXEC sp_rename '{}', '{}'",
            self.quoter.quote_qualified(e.schema.as_deref(), &e.old_name),
            e.new_name
        )])
    }

    /// ADD takes the definition directly, without the COLUMN keyword.
    fn add_column(&self, e: &AddColumnExpression) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} ADD {}",
            self.quoter.quote_qualified(e.schema.as_deref(), &e.table),
            self.column_definition(&e.column)?
        )])
    }

    fn rename_column(&self, e: &RenameColumnExpression) -> Result<Vec<String>> {
        self.check_identifier(&e.new_name)?;
        Ok(vec![format!(
            "EXEC sp_rename '{}.{}', '{}', 'COLUMN'",
            self.quoter.quote_qualified(e.schema.as_deref(), &e.table),
            self.quoter.quote(&e.old_name),
            e.new_name
        )])
    }

    fn alter_column(&self, e: &AlterColumnExpression) -> Result<Vec<String>> {
        let table = self.quoter.quote_qualified(e.schema.as_deref(), &e.table);
        let column = self.quoter.quote(&e.column);

        match &e.change {
            AlterColumnChange::SetType {
                db_type,
                size,
                precision,
                scale,
            } => {
                let sql_type = self.type_map.get(*db_type, *size, *precision, *scale)?;
                Ok(vec![format!(
                    "ALTER TABLE {table} ALTER COLUMN {column} {sql_type}"
                )])
            }
            // ALTER COLUMN needs the current type restated, which the
            // expression does not carry.
            AlterColumnChange::SetNullable(_) => {
                self.unsupported_statement("changing column nullability in isolation")
            }
            AlterColumnChange::SetDefault(default) => {
                let constraint = Self::default_constraint_name(&e.table, &e.column);
                Ok(vec![format!(
                    "ALTER TABLE {table} ADD CONSTRAINT {} DEFAULT {} FOR {column}",
                    self.quoter.quote(&constraint),
                    self.quoter.quote_value(default)
                )])
            }
            AlterColumnChange::DropDefault => {
                let constraint = Self::default_constraint_name(&e.table, &e.column);
                Ok(vec![format!(
                    "ALTER TABLE {table} DROP CONSTRAINT {}",
                    self.quoter.quote(&constraint)
                )])
            }
        }
    }

    /// Index names are scoped to the table.
    fn drop_index(&self, e: &DropIndexExpression) -> Result<Vec<String>> {
        let table = e.table.as_deref().ok_or_else(|| {
            GenerateError::InvalidExpression(format!(
                "dropping index '{}' requires a table name",
                e.name
            ))
        })?;
        Ok(vec![format!(
            "DROP INDEX {} ON {}",
            self.quoter.quote(&e.name),
            self.quoter.quote_qualified(e.schema.as_deref(), table)
        )])
    }
}

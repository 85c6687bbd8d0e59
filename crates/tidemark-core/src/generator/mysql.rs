//! MySQL SQL generation.

use super::{GeneratorOptions, SqlGenerator};
use crate::column::DbType;
use crate::error::{GenerateError, Result};
use crate::expression::{
    AlterColumnChange, AlterColumnExpression, CreateSequenceExpression, DropForeignKeyExpression,
    DropIndexExpression, DropSequenceExpression, RenameTableExpression,
};
use crate::quoter::{MySqlQuoter, Quoter};
use crate::typemap::TypeMap;

/// Row-size limit keeps indexed VARCHARs under 8000 bytes.
const MAX_VARCHAR: u32 = 8000;

/// MySQL generator.
#[derive(Debug, Clone)]
pub struct MySqlGenerator {
    quoter: MySqlQuoter,
    type_map: TypeMap,
    options: GeneratorOptions,
}

impl Default for MySqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MySqlGenerator {
    /// Creates a generator with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(GeneratorOptions::default())
    }

    /// Creates a generator with explicit options.
    #[must_use]
    pub fn with_options(options: GeneratorOptions) -> Self {
        Self {
            quoter: MySqlQuoter,
            type_map: build_type_map(),
            options,
        }
    }
}

fn build_type_map() -> TypeMap {
    let mut map = TypeMap::new();
    for s in [DbType::AnsiString, DbType::String] {
        map.set_type(s, "TEXT");
        map.set_type_with_size(s, MAX_VARCHAR, "VARCHAR($size)");
        map.set_type_with_size(s, u32::MAX, "LONGTEXT");
    }
    for s in [DbType::AnsiStringFixedLength, DbType::StringFixedLength] {
        map.set_type(s, "CHAR(255)");
        map.set_type_with_size(s, 255, "CHAR($size)");
    }
    map.set_type(DbType::Binary, "BLOB");
    map.set_type_with_size(DbType::Binary, MAX_VARCHAR, "VARBINARY($size)");
    map.set_type_with_size(DbType::Binary, u32::MAX, "LONGBLOB");
    map.set_type(DbType::Boolean, "TINYINT(1)");
    map.set_type(DbType::Byte, "TINYINT UNSIGNED");
    map.set_type(DbType::Int16, "SMALLINT");
    map.set_type(DbType::Int32, "INTEGER");
    map.set_type(DbType::Int64, "BIGINT");
    map.set_type(DbType::Single, "FLOAT");
    map.set_type(DbType::Double, "DOUBLE");
    map.set_type(DbType::Decimal, "DECIMAL($precision,$scale)");
    map.set_type(DbType::Currency, "DECIMAL(19,4)");
    map.set_type(DbType::Date, "DATE");
    map.set_type(DbType::Time, "TIME");
    map.set_type(DbType::DateTime, "DATETIME");
    map.set_type(DbType::DateTimeOffset, "TIMESTAMP");
    map.set_type(DbType::Guid, "CHAR(36)");
    map.set_type(DbType::Xml, "TEXT");
    map
}

impl SqlGenerator for MySqlGenerator {
    fn dialect(&self) -> &'static str {
        "mysql"
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
        Some("AUTO_INCREMENT")
    }

    fn supports_if_not_exists_indexes(&self) -> bool {
        false
    }

    fn rename_table(&self, e: &RenameTableExpression) -> Result<Vec<String>> {
        self.check_identifier(&e.new_name)?;
        Ok(vec![format!(
            "RENAME TABLE {} TO {}",
            self.quoter.quote_qualified(e.schema.as_deref(), &e.old_name),
            self.quoter.quote_qualified(e.schema.as_deref(), &e.new_name)
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
                    "ALTER TABLE {table} MODIFY COLUMN {column} {sql_type}"
                )])
            }
            // MODIFY COLUMN needs the full current definition, which the
            // expression does not carry.
            AlterColumnChange::SetNullable(_) => {
                self.unsupported_statement("changing column nullability in isolation")
            }
            AlterColumnChange::SetDefault(default) => Ok(vec![format!(
                "ALTER TABLE {table} ALTER COLUMN {column} SET DEFAULT {}",
                self.quoter.quote_value(default)
            )]),
            AlterColumnChange::DropDefault => Ok(vec![format!(
                "ALTER TABLE {table} ALTER COLUMN {column} DROP DEFAULT"
            )]),
        }
    }

    /// MySQL scopes index names to the table.
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

    fn drop_foreign_key(&self, e: &DropForeignKeyExpression) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            self.quoter.quote_qualified(e.schema.as_deref(), &e.table),
            self.quoter.quote(&e.name)
        )])
    }

    fn create_sequence(&self, _e: &CreateSequenceExpression) -> Result<Vec<String>> {
        self.unsupported_statement("sequences")
    }

    fn drop_sequence(&self, _e: &DropSequenceExpression) -> Result<Vec<String>> {
        self.unsupported_statement("sequences")
    }
}

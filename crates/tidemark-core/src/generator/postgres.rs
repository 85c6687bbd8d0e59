//! PostgreSQL SQL generation.

use super::{GeneratorOptions, SqlGenerator};
use crate::column::{ColumnDefinition, DbType};
use crate::error::Result;
use crate::expression::{AlterColumnChange, AlterColumnExpression};
use crate::quoter::{PostgresQuoter, Quoter};
use crate::typemap::TypeMap;

/// The longest VARCHAR PostgreSQL accepts.
const MAX_VARCHAR: u32 = 10_485_760;

/// PostgreSQL generator.
#[derive(Debug, Clone)]
pub struct PostgresGenerator {
    quoter: PostgresQuoter,
    type_map: TypeMap,
    options: GeneratorOptions,
}

impl Default for PostgresGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PostgresGenerator {
    /// Creates a generator with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(GeneratorOptions::default())
    }

    /// Creates a generator with explicit options.
    #[must_use]
    pub fn with_options(options: GeneratorOptions) -> Self {
        Self {
            quoter: PostgresQuoter,
            type_map: build_type_map(),
            options,
        }
    }
}

fn is_serial_type(db_type: DbType) -> bool {
    matches!(db_type, DbType::Int16 | DbType::Int32 | DbType::Int64)
}

fn build_type_map() -> TypeMap {
    let mut map = TypeMap::new();
    map.set_type(DbType::AnsiString, "TEXT");
    map.set_type_with_size(DbType::AnsiString, MAX_VARCHAR, "VARCHAR($size)");
    map.set_type(DbType::AnsiStringFixedLength, "CHAR(255)");
    map.set_type_with_size(DbType::AnsiStringFixedLength, MAX_VARCHAR, "CHAR($size)");
    map.set_type(DbType::String, "TEXT");
    map.set_type_with_size(DbType::String, MAX_VARCHAR, "VARCHAR($size)");
    map.set_type(DbType::StringFixedLength, "CHAR(255)");
    map.set_type_with_size(DbType::StringFixedLength, MAX_VARCHAR, "CHAR($size)");
    map.set_type(DbType::Binary, "BYTEA");
    map.set_type_with_size(DbType::Binary, u32::MAX, "BYTEA");
    map.set_type(DbType::Boolean, "BOOLEAN");
    map.set_type(DbType::Byte, "SMALLINT");
    map.set_type(DbType::Int16, "SMALLINT");
    map.set_type(DbType::Int32, "INTEGER");
    map.set_type(DbType::Int64, "BIGINT");
    map.set_type(DbType::Single, "REAL");
    map.set_type(DbType::Double, "DOUBLE PRECISION");
    map.set_type(DbType::Decimal, "NUMERIC($precision,$scale)");
    map.set_type(DbType::Currency, "MONEY");
    map.set_type(DbType::Date, "DATE");
    map.set_type(DbType::Time, "TIME");
    map.set_type(DbType::DateTime, "TIMESTAMP");
    map.set_type(DbType::DateTimeOffset, "TIMESTAMPTZ");
    map.set_type(DbType::Guid, "UUID");
    map.set_type(DbType::Xml, "XML");
    map
}

impl SqlGenerator for PostgresGenerator {
    fn dialect(&self) -> &'static str {
        "postgresql"
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
        Some("GENERATED BY DEFAULT AS IDENTITY")
    }

    // Integer primary keys become SERIAL pseudo-types, which already
    // encode identity; everything else carries the GENERATED clause.
    fn identity_clause(&self, column: &ColumnDefinition) -> Result<String> {
        if column.primary_key && is_serial_type(column.db_type) {
            Ok(String::new())
        } else {
            Ok("GENERATED BY DEFAULT AS IDENTITY".to_string())
        }
    }

    fn column_type(&self, column: &ColumnDefinition) -> Result<String> {
        if column.identity && column.primary_key {
            match column.db_type {
                DbType::Int16 => return Ok("SMALLSERIAL".to_string()),
                DbType::Int32 => return Ok("SERIAL".to_string()),
                DbType::Int64 => return Ok("BIGSERIAL".to_string()),
                _ => {}
            }
        }
        self.type_map
            .get(column.db_type, column.size, column.precision, column.scale)
    }

    fn alter_column(&self, e: &AlterColumnExpression) -> Result<Vec<String>> {
        let table = self.quoter.quote_qualified(e.schema.as_deref(), &e.table);
        let column = self.quoter.quote(&e.column);

        Ok(vec![match &e.change {
            AlterColumnChange::SetType {
                db_type,
                size,
                precision,
                scale,
            } => {
                let sql_type = self.type_map.get(*db_type, *size, *precision, *scale)?;
                format!("ALTER TABLE {table} ALTER COLUMN {column} TYPE {sql_type}")
            }
            AlterColumnChange::SetNullable(nullable) => {
                if *nullable {
                    format!("ALTER TABLE {table} ALTER COLUMN {column} DROP NOT NULL")
                } else {
                    format!("ALTER TABLE {table} ALTER COLUMN {column} SET NOT NULL")
                }
            }
            AlterColumnChange::SetDefault(default) => format!(
                "ALTER TABLE {table} ALTER COLUMN {column} SET DEFAULT {}",
                self.quoter.quote_value(default)
            ),
            AlterColumnChange::DropDefault => {
                format!("ALTER TABLE {table} ALTER COLUMN {column} DROP DEFAULT")
            }
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{bigint, decimal, guid, integer, string, SystemMethod};
    use crate::table::CreateTableBuilder;

    #[test]
    fn test_type_map() {
        let map = build_type_map();
        assert_eq!(map.get(DbType::Int32, None, None, None).unwrap(), "INTEGER");
        assert_eq!(
            map.get(DbType::String, Some(255), None, None).unwrap(),
            "VARCHAR(255)"
        );
        assert_eq!(map.get(DbType::String, None, None, None).unwrap(), "TEXT");
        assert_eq!(map.get(DbType::Guid, None, None, None).unwrap(), "UUID");
        assert_eq!(
            map.get(DbType::Decimal, None, Some(10), Some(2)).unwrap(),
            "NUMERIC(10,2)"
        );
        assert_eq!(map.get(DbType::Binary, Some(16), None, None).unwrap(), "BYTEA");
    }

    #[test]
    fn test_create_table_with_serial() {
        let generator = PostgresGenerator::new();
        let expr = CreateTableBuilder::new()
            .name("users")
            .column(bigint("id").primary_key().identity().build())
            .column(string("username", 255).not_null().unique().build())
            .build()
            .into();

        let sql = generator.generate(&expr).unwrap();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("CREATE TABLE \"users\""));
        assert!(sql[0].contains("\"id\" BIGSERIAL PRIMARY KEY"));
        assert!(sql[0].contains("\"username\" VARCHAR(255) NOT NULL UNIQUE"));
    }

    #[test]
    fn test_identity_without_primary_key_uses_generated_clause() {
        let generator = PostgresGenerator::new();
        let col = integer("seq_no").identity().not_null().build();
        assert_eq!(
            generator.column_definition(&col).unwrap(),
            "\"seq_no\" INTEGER GENERATED BY DEFAULT AS IDENTITY NOT NULL"
        );
    }

    #[test]
    fn test_schema_qualification() {
        let generator = PostgresGenerator::new();
        let mut expr = CreateTableBuilder::new()
            .name("users")
            .column(bigint("id").primary_key().build())
            .build();
        expr.schema = Some("app".to_string());

        let sql = generator.generate(&expr.into()).unwrap();
        assert!(sql[0].contains("CREATE TABLE \"app\".\"users\""));
    }

    #[test]
    fn test_system_method_default() {
        let generator = PostgresGenerator::new();
        let col = guid("id")
            .primary_key()
            .default_method(SystemMethod::NewGuid)
            .build();
        let sql = generator.column_definition(&col).unwrap();
        assert_eq!(sql, "\"id\" UUID PRIMARY KEY DEFAULT gen_random_uuid()");
    }

    #[test]
    fn test_alter_column() {
        let generator = PostgresGenerator::new();
        let expr = AlterColumnExpression {
            schema: None,
            table: "users".into(),
            column: "email".into(),
            change: AlterColumnChange::SetNullable(false),
        };
        assert_eq!(
            generator.alter_column(&expr).unwrap(),
            vec!["ALTER TABLE \"users\" ALTER COLUMN \"email\" SET NOT NULL"]
        );

        let expr = AlterColumnExpression {
            schema: None,
            table: "users".into(),
            column: "balance".into(),
            change: AlterColumnChange::SetType {
                db_type: DbType::Decimal,
                size: None,
                precision: Some(12),
                scale: Some(2),
            },
        };
        assert_eq!(
            generator.alter_column(&expr).unwrap(),
            vec!["ALTER TABLE \"users\" ALTER COLUMN \"balance\" TYPE NUMERIC(12,2)"]
        );
    }

    #[test]
    fn test_decimal_column() {
        let generator = PostgresGenerator::new();
        let col = decimal("price", 10, 2).not_null().build();
        assert_eq!(
            generator.column_definition(&col).unwrap(),
            "\"price\" NUMERIC(10,2) NOT NULL"
        );
    }
}

//! Oracle SQL generation.
//!
//! Identifiers are capped at 30 characters, identity columns are not
//! expressible (use a sequence and a trigger instead), and column changes go
//! through `ALTER TABLE ... MODIFY`.

use super::{GeneratorOptions, SqlGenerator};
use crate::column::DbType;
use crate::error::Result;
use crate::expression::{
    AddColumnExpression, AlterColumnChange, AlterColumnExpression,
};
use crate::quoter::{OracleQuoter, Quoter};
use crate::typemap::TypeMap;

const MAX_VARCHAR2: u32 = 4000;
const MAX_NVARCHAR2: u32 = 2000;
const MAX_RAW: u32 = 2000;

/// Oracle generator.
#[derive(Debug, Clone)]
pub struct OracleGenerator {
    quoter: OracleQuoter,
    type_map: TypeMap,
    options: GeneratorOptions,
}

impl Default for OracleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OracleGenerator {
    /// Creates a generator with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(GeneratorOptions::default())
    }

    /// Creates a generator with explicit options.
    #[must_use]
    pub fn with_options(options: GeneratorOptions) -> Self {
        Self {
            quoter: OracleQuoter,
            type_map: build_type_map(),
            options,
        }
    }
}

fn build_type_map() -> TypeMap {
    let mut map = TypeMap::new();
    map.set_type(DbType::AnsiString, "VARCHAR2(255)");
    map.set_type_with_size(DbType::AnsiString, MAX_VARCHAR2, "VARCHAR2($size)");
    map.set_type_with_size(DbType::AnsiString, u32::MAX, "CLOB");
    map.set_type(DbType::AnsiStringFixedLength, "CHAR(255)");
    map.set_type_with_size(DbType::AnsiStringFixedLength, 2000, "CHAR($size)");
    map.set_type(DbType::String, "NVARCHAR2(255)");
    map.set_type_with_size(DbType::String, MAX_NVARCHAR2, "NVARCHAR2($size)");
    map.set_type_with_size(DbType::String, u32::MAX, "NCLOB");
    map.set_type(DbType::StringFixedLength, "NCHAR(255)");
    map.set_type_with_size(DbType::StringFixedLength, 1000, "NCHAR($size)");
    map.set_type(DbType::Binary, "BLOB");
    map.set_type_with_size(DbType::Binary, MAX_RAW, "RAW($size)");
    map.set_type_with_size(DbType::Binary, u32::MAX, "BLOB");
    map.set_type(DbType::Boolean, "NUMBER(1)");
    map.set_type(DbType::Byte, "NUMBER(3)");
    map.set_type(DbType::Int16, "NUMBER(5)");
    map.set_type(DbType::Int32, "NUMBER(10)");
    map.set_type(DbType::Int64, "NUMBER(19)");
    map.set_type(DbType::Single, "BINARY_FLOAT");
    map.set_type(DbType::Double, "BINARY_DOUBLE");
    map.set_type(DbType::Decimal, "NUMBER($precision,$scale)");
    map.set_type(DbType::Currency, "NUMBER(19,4)");
    map.set_type(DbType::Date, "DATE");
    map.set_type(DbType::Time, "DATE");
    map.set_type(DbType::DateTime, "TIMESTAMP");
    map.set_type(DbType::DateTimeOffset, "TIMESTAMP WITH TIME ZONE");
    map.set_type(DbType::Guid, "RAW(16)");
    map.set_type(DbType::Xml, "XMLTYPE");
    map
}

impl SqlGenerator for OracleGenerator {
    fn dialect(&self) -> &'static str {
        "oracle"
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

    fn max_identifier_length(&self) -> Option<usize> {
        Some(30)
    }

    fn identity_keyword(&self) -> Option<&'static str> {
        None
    }

    fn supports_if_not_exists_tables(&self) -> bool {
        false
    }

    fn supports_if_not_exists_indexes(&self) -> bool {
        false
    }

    fn supports_if_exists_drops(&self) -> bool {
        false
    }

    /// ADD wraps the definition in parentheses.
    fn add_column(&self, e: &AddColumnExpression) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} ADD ({})",
            self.quoter.quote_qualified(e.schema.as_deref(), &e.table),
            self.column_definition(&e.column)?
        )])
    }

    fn alter_column(&self, e: &AlterColumnExpression) -> Result<Vec<String>> {
        let table = self.quoter.quote_qualified(e.schema.as_deref(), &e.table);
        let column = self.quoter.quote(&e.column);

        let clause = match &e.change {
            AlterColumnChange::SetType {
                db_type,
                size,
                precision,
                scale,
            } => {
                let sql_type = self.type_map.get(*db_type, *size, *precision, *scale)?;
                format!("{column} {sql_type}")
            }
            AlterColumnChange::SetNullable(nullable) => {
                if *nullable {
                    format!("{column} NULL")
                } else {
                    format!("{column} NOT NULL")
                }
            }
            AlterColumnChange::SetDefault(default) => {
                format!("{column} DEFAULT {}", self.quoter.quote_value(default))
            }
            AlterColumnChange::DropDefault => format!("{column} DEFAULT NULL"),
        };
        Ok(vec![format!("ALTER TABLE {table} MODIFY ({clause})")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{bigint, string};
    use crate::error::{CompatibilityMode, GenerateError};
    use crate::table::CreateTableBuilder;

    #[test]
    fn test_type_map() {
        let map = build_type_map();
        assert_eq!(
            map.get(DbType::String, Some(255), None, None).unwrap(),
            "NVARCHAR2(255)"
        );
        assert_eq!(map.get(DbType::String, Some(2001), None, None).unwrap(), "NCLOB");
        assert_eq!(map.get(DbType::Int64, None, None, None).unwrap(), "NUMBER(19)");
        assert_eq!(map.get(DbType::Guid, None, None, None).unwrap(), "RAW(16)");
        assert_eq!(map.get(DbType::Binary, Some(64), None, None).unwrap(), "RAW(64)");
        assert_eq!(
            map.get(DbType::DateTimeOffset, None, None, None).unwrap(),
            "TIMESTAMP WITH TIME ZONE"
        );
    }

    #[test]
    fn test_identifier_length_limit() {
        let generator = OracleGenerator::new();
        let expr = CreateTableBuilder::new()
            .name("a_table_name_well_over_thirty_characters_long")
            .column(bigint("id").primary_key().build())
            .build()
            .into();
        let err = generator.generate(&expr).unwrap_err();
        assert!(matches!(err, GenerateError::IdentifierTooLong { max: 30, .. }));
    }

    #[test]
    fn test_identity_is_strict_error() {
        let generator = OracleGenerator::new();
        let expr = CreateTableBuilder::new()
            .name("users")
            .column(bigint("id").primary_key().identity().build())
            .build()
            .into();
        assert!(matches!(
            generator.generate(&expr).unwrap_err(),
            GenerateError::Unsupported { .. }
        ));
    }

    #[test]
    fn test_identity_degrades_in_loose_mode() {
        let generator = OracleGenerator::with_options(GeneratorOptions {
            compatibility: CompatibilityMode::Loose,
        });
        let expr = CreateTableBuilder::new()
            .name("users")
            .column(bigint("id").primary_key().identity().build())
            .column(string("username", 255).not_null().build())
            .build()
            .into();
        let sql = generator.generate(&expr).unwrap();
        assert!(sql[0].contains("\"id\" NUMBER(19) PRIMARY KEY"));
        assert!(!sql[0].contains("IDENTITY"));
    }

    #[test]
    fn test_add_column_is_parenthesized() {
        let generator = OracleGenerator::new();
        let expr = AddColumnExpression {
            schema: None,
            table: "users".into(),
            column: string("bio", 2000).build(),
        };
        assert_eq!(
            generator.add_column(&expr).unwrap(),
            vec!["ALTER TABLE \"users\" ADD (\"bio\" NVARCHAR2(2000))"]
        );
    }

    #[test]
    fn test_alter_column_modify() {
        let generator = OracleGenerator::new();
        let expr = AlterColumnExpression {
            schema: None,
            table: "users".into(),
            column: "email".into(),
            change: AlterColumnChange::SetNullable(false),
        };
        assert_eq!(
            generator.alter_column(&expr).unwrap(),
            vec!["ALTER TABLE \"users\" MODIFY (\"email\" NOT NULL)"]
        );
    }
}

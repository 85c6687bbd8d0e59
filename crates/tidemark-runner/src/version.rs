//! Version bookkeeping table.
//!
//! Applied migrations are recorded in a table (by default
//! `tidemark_version_info`) holding the version, the migration name, and
//! when it ran. All statements are built as expressions so each dialect
//! renders its own DDL and literals.

use tidemark_core::column::{bigint, datetime, string, SystemMethod, Value};
use tidemark_core::expression::{
    DeleteDataExpression, InsertDataExpression, MigrationExpression,
};
use tidemark_core::quoter::Quoter;
use tidemark_core::table::CreateTableBuilder;

/// Default name of the bookkeeping table.
pub const DEFAULT_VERSION_TABLE: &str = "tidemark_version_info";

/// Describes where applied versions are recorded.
#[derive(Debug, Clone)]
pub struct VersionTable {
    schema: Option<String>,
    name: String,
}

impl Default for VersionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionTable {
    /// Uses the default table name in the default schema.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: None,
            name: DEFAULT_VERSION_TABLE.to_string(),
        }
    }

    /// Overrides the table name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Places the table in a schema.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Returns the schema, if set.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expression creating the table.
    #[must_use]
    pub fn create_expression(&self) -> MigrationExpression {
        let mut builder = CreateTableBuilder::new()
            .name(&self.name)
            .column(bigint("version").primary_key().build())
            .column(string("name", 255).not_null().build())
            .column(datetime("applied_on").not_null().build());
        if let Some(ref schema) = self.schema {
            builder = builder.schema(schema.clone());
        }
        builder.build().into()
    }

    /// Expression recording one applied version.
    #[must_use]
    pub fn insert_expression(&self, version: i64, name: &str) -> MigrationExpression {
        let mut expr = InsertDataExpression::new(&self.name).row(vec![
            ("version".to_string(), Value::Int(version)),
            ("name".to_string(), Value::from(name)),
            (
                "applied_on".to_string(),
                Value::Method(SystemMethod::CurrentUtcDateTime),
            ),
        ]);
        if let Some(ref schema) = self.schema {
            expr = expr.in_schema(schema.clone());
        }
        expr.into()
    }

    /// Expression removing one version on rollback.
    #[must_use]
    pub fn delete_expression(&self, version: i64) -> MigrationExpression {
        let mut expr = DeleteDataExpression::new(&self.name)
            .row(vec![("version".to_string(), Value::Int(version))]);
        if let Some(ref schema) = self.schema {
            expr = expr.in_schema(schema.clone());
        }
        expr.into()
    }

    /// Query returning all applied versions in ascending order.
    #[must_use]
    pub fn select_versions_sql(&self, quoter: &dyn Quoter) -> String {
        let version = quoter.quote("version");
        format!(
            "SELECT {version} FROM {} ORDER BY {version}",
            quoter.quote_qualified(self.schema.as_deref(), &self.name)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidemark_core::generator::{PostgresGenerator, SqlGenerator, SqliteGenerator};
    use tidemark_core::quoter::{PostgresQuoter, SqliteQuoter};

    #[test]
    fn test_create_expression_shape() {
        let table = VersionTable::new();
        let generator = SqliteGenerator::new();
        let sql = generator.generate(&table.create_expression()).unwrap();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("CREATE TABLE \"tidemark_version_info\""));
        assert!(sql[0].contains("\"version\" INTEGER PRIMARY KEY"));
        assert!(sql[0].contains("\"applied_on\" TEXT NOT NULL"));
    }

    #[test]
    fn test_insert_uses_dialect_timestamp() {
        let table = VersionTable::new();
        let generator = PostgresGenerator::new();
        let sql = generator
            .generate(&table.insert_expression(20240101120000, "create_users"))
            .unwrap();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("INSERT INTO \"tidemark_version_info\""));
        assert!(sql[0].contains("20240101120000"));
        assert!(sql[0].contains("'create_users'"));
        assert!(sql[0].contains("now() at time zone 'UTC'"));
    }

    #[test]
    fn test_select_versions_sql() {
        let table = VersionTable::new().in_schema("app");
        assert_eq!(
            table.select_versions_sql(&PostgresQuoter),
            "SELECT \"version\" FROM \"app\".\"tidemark_version_info\" ORDER BY \"version\""
        );
        // Schema-less dialects drop the qualifier.
        assert_eq!(
            table.select_versions_sql(&SqliteQuoter),
            "SELECT \"version\" FROM \"tidemark_version_info\" ORDER BY \"version\""
        );
    }

    #[test]
    fn test_custom_table_name() {
        let table = VersionTable::new().with_name("schema_history");
        let generator = SqliteGenerator::new();
        let sql = generator
            .generate(&table.delete_expression(42))
            .unwrap();
        assert_eq!(
            sql,
            vec!["DELETE FROM \"schema_history\" WHERE \"version\" = 42"]
        );
    }
}

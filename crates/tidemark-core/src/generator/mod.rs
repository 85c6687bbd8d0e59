//! Dialect-specific SQL generation.
//!
//! [`SqlGenerator`] translates one [`MigrationExpression`] into the SQL text
//! for a target dialect. The trait carries default clause assembly; dialects
//! override quoting, type maps, and the places where their syntax deviates.
//!
//! Generation is a pure function of (expression, quoter, type map); no I/O.

mod mssql;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;

pub use mssql::MsSqlGenerator;
pub use mysql::MySqlGenerator;
pub use oracle::OracleGenerator;
pub use postgres::PostgresGenerator;
pub use sqlite::SqliteGenerator;

use crate::column::ColumnDefinition;
use crate::error::{CompatibilityMode, GenerateError, Result};
use crate::expression::{
    AddColumnExpression, AlterColumnExpression, CreateForeignKeyExpression, CreateIndexExpression,
    CreateSequenceExpression, CreateTableExpression, DeleteDataExpression, DropColumnExpression,
    DropForeignKeyExpression, DropIndexExpression, DropSequenceExpression, DropTableExpression,
    IndexColumnDirection, InsertDataExpression, MigrationExpression, RenameColumnExpression,
    RenameTableExpression, Row, TableConstraint, UpdateDataExpression,
};
use crate::quoter::Quoter;
use crate::typemap::TypeMap;

/// Generator configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorOptions {
    /// How unsupported features are handled.
    pub compatibility: CompatibilityMode,
}

/// Where a dialect places its identity keyword inside a column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityPosition {
    /// Between the type and the column constraints (SQL Server, MySQL).
    BeforeConstraints,
    /// Directly after PRIMARY KEY (SQLite).
    AfterPrimaryKey,
}

/// Translates migration expressions into dialect-specific SQL statements.
///
/// One expression may produce several statements (per-row data statements,
/// `sp_rename` pairs); each returned string is one executable unit without a
/// trailing terminator.
pub trait SqlGenerator {
    /// Returns the dialect name.
    fn dialect(&self) -> &'static str;

    /// Returns the dialect quoter.
    fn quoter(&self) -> &dyn Quoter;

    /// Returns the dialect type map.
    fn type_map(&self) -> &TypeMap;

    /// Returns the generator options.
    fn options(&self) -> &GeneratorOptions;

    /// Identifier length limit, if the dialect has one.
    fn max_identifier_length(&self) -> Option<usize> {
        None
    }

    /// Identity keyword, or `None` when the dialect cannot express it.
    fn identity_keyword(&self) -> Option<&'static str>;

    /// Placement of the identity keyword.
    fn identity_position(&self) -> IdentityPosition {
        IdentityPosition::BeforeConstraints
    }

    /// Whether CREATE TABLE accepts IF NOT EXISTS. Dialects without it
    /// drop the flag; callers guard with an existence query instead.
    fn supports_if_not_exists_tables(&self) -> bool {
        true
    }

    /// Whether CREATE INDEX accepts IF NOT EXISTS.
    fn supports_if_not_exists_indexes(&self) -> bool {
        true
    }

    /// Whether DROP statements accept IF EXISTS.
    fn supports_if_exists_drops(&self) -> bool {
        true
    }

    /// Generates SQL for an expression.
    fn generate(&self, expression: &MigrationExpression) -> Result<Vec<String>> {
        match expression {
            MigrationExpression::CreateTable(e) => self.create_table(e),
            MigrationExpression::DropTable(e) => self.drop_table(e),
            MigrationExpression::RenameTable(e) => self.rename_table(e),
            MigrationExpression::AddColumn(e) => self.add_column(e),
            MigrationExpression::AlterColumn(e) => self.alter_column(e),
            MigrationExpression::DropColumn(e) => self.drop_column(e),
            MigrationExpression::RenameColumn(e) => self.rename_column(e),
            MigrationExpression::CreateIndex(e) => self.create_index(e),
            MigrationExpression::DropIndex(e) => self.drop_index(e),
            MigrationExpression::CreateForeignKey(e) => self.create_foreign_key(e),
            MigrationExpression::DropForeignKey(e) => self.drop_foreign_key(e),
            MigrationExpression::CreateSequence(e) => self.create_sequence(e),
            MigrationExpression::DropSequence(e) => self.drop_sequence(e),
            MigrationExpression::InsertData(e) => self.insert_data(e),
            MigrationExpression::DeleteData(e) => self.delete_data(e),
            MigrationExpression::UpdateData(e) => self.update_data(e),
            MigrationExpression::Sql(e) => Ok(vec![e.up_sql.clone()]),
        }
    }

    // =========================================================================
    // Unsupported-feature handling
    // =========================================================================

    /// Statement-level degradation: error in Strict mode, `--` comment in
    /// Loose mode. Executors skip comment statements.
    fn unsupported_statement(&self, feature: &str) -> Result<Vec<String>> {
        match self.options().compatibility {
            CompatibilityMode::Strict => Err(GenerateError::Unsupported {
                dialect: self.dialect(),
                feature: feature.to_string(),
            }),
            CompatibilityMode::Loose => Ok(vec![format!(
                "-- {feature} is not supported by {}",
                self.dialect()
            )]),
        }
    }

    /// Fragment-level degradation: error in Strict mode, dropped in Loose.
    fn unsupported_fragment(&self, feature: &str) -> Result<String> {
        match self.options().compatibility {
            CompatibilityMode::Strict => Err(GenerateError::Unsupported {
                dialect: self.dialect(),
                feature: feature.to_string(),
            }),
            CompatibilityMode::Loose => Ok(String::new()),
        }
    }

    /// Rejects identifiers over the dialect's length limit.
    fn check_identifier(&self, name: &str) -> Result<()> {
        if let Some(max) = self.max_identifier_length() {
            if name.len() > max {
                return Err(GenerateError::IdentifierTooLong {
                    dialect: self.dialect(),
                    name: name.to_string(),
                    max,
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Fragments
    // =========================================================================

    /// Resolves the SQL type for a column.
    fn column_type(&self, column: &ColumnDefinition) -> Result<String> {
        self.type_map()
            .get(column.db_type, column.size, column.precision, column.scale)
    }

    /// Identity clause for a column, empty when the type already encodes
    /// it. Degrades through [`unsupported_fragment`](Self::unsupported_fragment)
    /// when the dialect cannot express identity for this column.
    fn identity_clause(&self, _column: &ColumnDefinition) -> Result<String> {
        match self.identity_keyword() {
            Some(kw) => Ok(kw.to_string()),
            None => self.unsupported_fragment("identity columns"),
        }
    }

    /// Generates a full column definition clause.
    fn column_definition(&self, column: &ColumnDefinition) -> Result<String> {
        self.check_identifier(&column.name)?;
        let quoter = self.quoter();
        let mut sql = format!("{} {}", quoter.quote(&column.name), self.column_type(column)?);

        let identity = if column.identity {
            self.identity_clause(column)?
        } else {
            String::new()
        };

        if !identity.is_empty() && self.identity_position() == IdentityPosition::BeforeConstraints {
            sql.push(' ');
            sql.push_str(&identity);
        }

        if column.primary_key {
            sql.push_str(" PRIMARY KEY");
            if !identity.is_empty() && self.identity_position() == IdentityPosition::AfterPrimaryKey
            {
                sql.push(' ');
                sql.push_str(&identity);
            }
        } else {
            if !column.nullable {
                sql.push_str(" NOT NULL");
            }
            if column.unique {
                sql.push_str(" UNIQUE");
            }
        }

        if let Some(ref default) = column.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&quoter.quote_value(default));
        }

        if let Some(ref fk) = column.references {
            sql.push_str(" REFERENCES ");
            sql.push_str(&quoter.quote(&fk.table));
            sql.push_str(" (");
            sql.push_str(&quoter.quote(&fk.column));
            sql.push(')');
            if let Some(action) = fk.on_delete {
                sql.push_str(" ON DELETE ");
                sql.push_str(action.as_sql());
            }
            if let Some(action) = fk.on_update {
                sql.push_str(" ON UPDATE ");
                sql.push_str(action.as_sql());
            }
        }

        if let Some(ref check) = column.check {
            sql.push_str(&format!(" CHECK ({check})"));
        }

        Ok(sql)
    }

    /// Generates a table-level constraint clause.
    fn table_constraint(&self, constraint: &TableConstraint) -> Result<String> {
        let quoter = self.quoter();
        if let Some(name) = constraint.name() {
            self.check_identifier(name)?;
        }
        let named = |name: &Option<String>| {
            name.as_ref()
                .map(|n| format!("CONSTRAINT {} ", quoter.quote(n)))
                .unwrap_or_default()
        };
        let join = |columns: &[String]| {
            columns
                .iter()
                .map(|c| quoter.quote(c))
                .collect::<Vec<_>>()
                .join(", ")
        };

        Ok(match constraint {
            TableConstraint::PrimaryKey { name, columns } => {
                format!("{}PRIMARY KEY ({})", named(name), join(columns))
            }
            TableConstraint::Unique { name, columns } => {
                format!("{}UNIQUE ({})", named(name), join(columns))
            }
            TableConstraint::ForeignKey {
                name,
                columns,
                references_table,
                references_columns,
                on_delete,
                on_update,
            } => {
                let mut sql = format!(
                    "{}FOREIGN KEY ({}) REFERENCES {} ({})",
                    named(name),
                    join(columns),
                    quoter.quote(references_table),
                    join(references_columns)
                );
                if let Some(action) = on_delete {
                    sql.push_str(" ON DELETE ");
                    sql.push_str(action.as_sql());
                }
                if let Some(action) = on_update {
                    sql.push_str(" ON UPDATE ");
                    sql.push_str(action.as_sql());
                }
                sql
            }
            TableConstraint::Check { name, expression } => {
                format!("{}CHECK ({})", named(name), expression)
            }
        })
    }

    /// Renders a row predicate: `a = 1 AND b IS NULL`.
    fn row_predicate(&self, row: &Row) -> String {
        let quoter = self.quoter();
        row.iter()
            .map(|(column, value)| match value {
                crate::column::Value::Null => format!("{} IS NULL", quoter.quote(column)),
                other => format!("{} = {}", quoter.quote(column), quoter.quote_value(other)),
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Generates CREATE TABLE.
    fn create_table(&self, e: &CreateTableExpression) -> Result<Vec<String>> {
        if e.columns.is_empty() {
            return Err(GenerateError::InvalidExpression(format!(
                "table '{}' has no columns",
                e.name
            )));
        }
        self.check_identifier(&e.name)?;

        let mut sql = String::from("CREATE TABLE ");
        if e.if_not_exists && self.supports_if_not_exists_tables() {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&self.quoter().quote_qualified(e.schema.as_deref(), &e.name));
        sql.push_str(" (\n");

        let mut clauses = Vec::with_capacity(e.columns.len() + e.constraints.len());
        for column in &e.columns {
            clauses.push(format!("    {}", self.column_definition(column)?));
        }
        for constraint in &e.constraints {
            clauses.push(format!("    {}", self.table_constraint(constraint)?));
        }
        sql.push_str(&clauses.join(",\n"));
        sql.push_str("\n)");

        Ok(vec![sql])
    }

    /// Generates DROP TABLE.
    fn drop_table(&self, e: &DropTableExpression) -> Result<Vec<String>> {
        let mut sql = String::from("DROP TABLE ");
        if e.if_exists && self.supports_if_exists_drops() {
            sql.push_str("IF EXISTS ");
        }
        sql.push_str(&self.quoter().quote_qualified(e.schema.as_deref(), &e.name));
        Ok(vec![sql])
    }

    /// Generates RENAME TABLE.
    fn rename_table(&self, e: &RenameTableExpression) -> Result<Vec<String>> {
        self.check_identifier(&e.new_name)?;
        Ok(vec![format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quoter().quote_qualified(e.schema.as_deref(), &e.old_name),
            self.quoter().quote(&e.new_name)
        )])
    }

    /// Generates ADD COLUMN.
    fn add_column(&self, e: &AddColumnExpression) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quoter().quote_qualified(e.schema.as_deref(), &e.table),
            self.column_definition(&e.column)?
        )])
    }

    /// Generates ALTER COLUMN. Syntax differs enough that every dialect
    /// supplies its own.
    fn alter_column(&self, e: &AlterColumnExpression) -> Result<Vec<String>>;

    /// Generates DROP COLUMN.
    fn drop_column(&self, e: &DropColumnExpression) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quoter().quote_qualified(e.schema.as_deref(), &e.table),
            self.quoter().quote(&e.column)
        )])
    }

    /// Generates RENAME COLUMN.
    fn rename_column(&self, e: &RenameColumnExpression) -> Result<Vec<String>> {
        self.check_identifier(&e.new_name)?;
        Ok(vec![format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quoter().quote_qualified(e.schema.as_deref(), &e.table),
            self.quoter().quote(&e.old_name),
            self.quoter().quote(&e.new_name)
        )])
    }

    /// Generates CREATE INDEX.
    fn create_index(&self, e: &CreateIndexExpression) -> Result<Vec<String>> {
        if e.columns.is_empty() {
            return Err(GenerateError::InvalidExpression(format!(
                "index '{}' has no columns",
                e.name
            )));
        }
        self.check_identifier(&e.name)?;

        let quoter = self.quoter();
        let mut sql = String::from("CREATE ");
        if e.unique {
            sql.push_str("UNIQUE ");
        }
        sql.push_str("INDEX ");
        if e.if_not_exists && self.supports_if_not_exists_indexes() {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&quoter.quote(&e.name));
        sql.push_str(" ON ");
        sql.push_str(&quoter.quote_qualified(e.schema.as_deref(), &e.table));
        sql.push_str(" (");
        let cols: Vec<String> = e
            .columns
            .iter()
            .map(|c| match c.direction {
                IndexColumnDirection::Ascending => quoter.quote(&c.name),
                IndexColumnDirection::Descending => format!("{} DESC", quoter.quote(&c.name)),
            })
            .collect();
        sql.push_str(&cols.join(", "));
        sql.push(')');
        Ok(vec![sql])
    }

    /// Generates DROP INDEX.
    fn drop_index(&self, e: &DropIndexExpression) -> Result<Vec<String>> {
        let mut sql = String::from("DROP INDEX ");
        if e.if_exists && self.supports_if_exists_drops() {
            sql.push_str("IF EXISTS ");
        }
        sql.push_str(&self.quoter().quote_qualified(e.schema.as_deref(), &e.name));
        Ok(vec![sql])
    }

    /// Generates ADD CONSTRAINT ... FOREIGN KEY.
    fn create_foreign_key(&self, e: &CreateForeignKeyExpression) -> Result<Vec<String>> {
        let quoter = self.quoter();
        let mut sql = format!(
            "ALTER TABLE {} ADD ",
            quoter.quote_qualified(e.schema.as_deref(), &e.table)
        );
        if let Some(ref name) = e.name {
            self.check_identifier(name)?;
            sql.push_str(&format!("CONSTRAINT {} ", quoter.quote(name)));
        }
        let cols: Vec<String> = e.columns.iter().map(|c| quoter.quote(c)).collect();
        let ref_cols: Vec<String> = e.references_columns.iter().map(|c| quoter.quote(c)).collect();
        sql.push_str(&format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            cols.join(", "),
            quoter.quote_qualified(e.references_schema.as_deref(), &e.references_table),
            ref_cols.join(", ")
        ));
        if let Some(action) = e.on_delete {
            sql.push_str(" ON DELETE ");
            sql.push_str(action.as_sql());
        }
        if let Some(action) = e.on_update {
            sql.push_str(" ON UPDATE ");
            sql.push_str(action.as_sql());
        }
        Ok(vec![sql])
    }

    /// Generates DROP CONSTRAINT.
    fn drop_foreign_key(&self, e: &DropForeignKeyExpression) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.quoter().quote_qualified(e.schema.as_deref(), &e.table),
            self.quoter().quote(&e.name)
        )])
    }

    /// Generates CREATE SEQUENCE.
    fn create_sequence(&self, e: &CreateSequenceExpression) -> Result<Vec<String>> {
        self.check_identifier(&e.name)?;
        let mut sql = format!(
            "CREATE SEQUENCE {}",
            self.quoter().quote_qualified(e.schema.as_deref(), &e.name)
        );
        if let Some(start) = e.start {
            sql.push_str(&format!(" START WITH {start}"));
        }
        if let Some(increment) = e.increment {
            sql.push_str(&format!(" INCREMENT BY {increment}"));
        }
        if let Some(min) = e.min_value {
            sql.push_str(&format!(" MINVALUE {min}"));
        }
        if let Some(max) = e.max_value {
            sql.push_str(&format!(" MAXVALUE {max}"));
        }
        if e.cycle {
            sql.push_str(" CYCLE");
        }
        Ok(vec![sql])
    }

    /// Generates DROP SEQUENCE.
    fn drop_sequence(&self, e: &DropSequenceExpression) -> Result<Vec<String>> {
        let mut sql = String::from("DROP SEQUENCE ");
        if e.if_exists && self.supports_if_exists_drops() {
            sql.push_str("IF EXISTS ");
        }
        sql.push_str(&self.quoter().quote_qualified(e.schema.as_deref(), &e.name));
        Ok(vec![sql])
    }

    /// Generates one INSERT per row.
    fn insert_data(&self, e: &InsertDataExpression) -> Result<Vec<String>> {
        let quoter = self.quoter();
        let table = quoter.quote_qualified(e.schema.as_deref(), &e.table);
        let mut statements = Vec::with_capacity(e.rows.len());
        for row in &e.rows {
            if row.is_empty() {
                return Err(GenerateError::InvalidExpression(format!(
                    "insert into '{}' with an empty row",
                    e.table
                )));
            }
            let columns: Vec<String> = row.iter().map(|(c, _)| quoter.quote(c)).collect();
            let values: Vec<String> = row.iter().map(|(_, v)| quoter.quote_value(v)).collect();
            statements.push(format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                columns.join(", "),
                values.join(", ")
            ));
        }
        Ok(statements)
    }

    /// Generates one DELETE per row predicate, or a single unconditional
    /// DELETE when `all_rows` is set.
    fn delete_data(&self, e: &DeleteDataExpression) -> Result<Vec<String>> {
        let table = self.quoter().quote_qualified(e.schema.as_deref(), &e.table);
        if e.all_rows {
            return Ok(vec![format!("DELETE FROM {table}")]);
        }
        if e.rows.is_empty() {
            return Err(GenerateError::InvalidExpression(format!(
                "delete from '{}' without a predicate; set all_rows to delete everything",
                e.table
            )));
        }
        Ok(e.rows
            .iter()
            .map(|row| format!("DELETE FROM {} WHERE {}", table, self.row_predicate(row)))
            .collect())
    }

    /// Generates UPDATE.
    fn update_data(&self, e: &UpdateDataExpression) -> Result<Vec<String>> {
        if e.set.is_empty() {
            return Err(GenerateError::InvalidExpression(format!(
                "update of '{}' with no SET pairs",
                e.table
            )));
        }
        if !e.all_rows && e.where_columns.is_empty() {
            return Err(GenerateError::InvalidExpression(format!(
                "update of '{}' without a predicate; set all_rows to update everything",
                e.table
            )));
        }
        let quoter = self.quoter();
        let assignments: Vec<String> = e
            .set
            .iter()
            .map(|(c, v)| format!("{} = {}", quoter.quote(c), quoter.quote_value(v)))
            .collect();
        let mut sql = format!(
            "UPDATE {} SET {}",
            quoter.quote_qualified(e.schema.as_deref(), &e.table),
            assignments.join(", ")
        );
        if !e.all_rows {
            sql.push_str(" WHERE ");
            sql.push_str(&self.row_predicate(&e.where_columns));
        }
        Ok(vec![sql])
    }
}

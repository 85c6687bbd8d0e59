//! Migration expressions.
//!
//! One [`MigrationExpression`] variant per DDL/DML intent. Expressions are
//! built by the fluent builders, handed once to a generator, and discarded.

use serde::{Deserialize, Serialize};

use crate::column::{ColumnDefinition, DbType, ForeignKeyAction, Value};

/// A single row for data expressions: (column, value) pairs.
pub type Row = Vec<(String, Value)>;

/// All expressible schema and data changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MigrationExpression {
    /// Create a new table.
    CreateTable(CreateTableExpression),
    /// Drop an existing table.
    DropTable(DropTableExpression),
    /// Rename a table.
    RenameTable(RenameTableExpression),
    /// Add a column to an existing table.
    AddColumn(AddColumnExpression),
    /// Alter a column definition.
    AlterColumn(AlterColumnExpression),
    /// Drop a column from a table.
    DropColumn(DropColumnExpression),
    /// Rename a column.
    RenameColumn(RenameColumnExpression),
    /// Create an index.
    CreateIndex(CreateIndexExpression),
    /// Drop an index.
    DropIndex(DropIndexExpression),
    /// Add a foreign key constraint.
    CreateForeignKey(CreateForeignKeyExpression),
    /// Drop a foreign key constraint.
    DropForeignKey(DropForeignKeyExpression),
    /// Create a sequence.
    CreateSequence(CreateSequenceExpression),
    /// Drop a sequence.
    DropSequence(DropSequenceExpression),
    /// Insert rows.
    InsertData(InsertDataExpression),
    /// Delete rows.
    DeleteData(DeleteDataExpression),
    /// Update rows.
    UpdateData(UpdateDataExpression),
    /// Run raw SQL.
    Sql(SqlExpression),
}

impl MigrationExpression {
    /// Creates a drop table expression.
    #[must_use]
    pub fn drop_table(name: impl Into<String>) -> Self {
        Self::DropTable(DropTableExpression {
            schema: None,
            name: name.into(),
            if_exists: false,
        })
    }

    /// Creates a rename table expression.
    #[must_use]
    pub fn rename_table(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self::RenameTable(RenameTableExpression {
            schema: None,
            old_name: old_name.into(),
            new_name: new_name.into(),
        })
    }

    /// Creates an add column expression.
    #[must_use]
    pub fn add_column(table: impl Into<String>, column: ColumnDefinition) -> Self {
        Self::AddColumn(AddColumnExpression {
            schema: None,
            table: table.into(),
            column,
        })
    }

    /// Creates a drop column expression.
    #[must_use]
    pub fn drop_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::DropColumn(DropColumnExpression {
            schema: None,
            table: table.into(),
            column: column.into(),
        })
    }

    /// Creates a rename column expression.
    #[must_use]
    pub fn rename_column(
        table: impl Into<String>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self::RenameColumn(RenameColumnExpression {
            schema: None,
            table: table.into(),
            old_name: old_name.into(),
            new_name: new_name.into(),
        })
    }

    /// Creates a drop sequence expression.
    #[must_use]
    pub fn drop_sequence(name: impl Into<String>) -> Self {
        Self::DropSequence(DropSequenceExpression {
            schema: None,
            name: name.into(),
            if_exists: false,
        })
    }

    /// Creates a raw SQL expression.
    #[must_use]
    pub fn sql(up_sql: impl Into<String>) -> Self {
        Self::Sql(SqlExpression {
            up_sql: up_sql.into(),
            down_sql: None,
        })
    }

    /// Creates a raw SQL expression with both directions.
    #[must_use]
    pub fn sql_reversible(up_sql: impl Into<String>, down_sql: impl Into<String>) -> Self {
        Self::Sql(SqlExpression {
            up_sql: up_sql.into(),
            down_sql: Some(down_sql.into()),
        })
    }

    /// Attempts to produce the inverse expression.
    ///
    /// Returns `None` if the expression cannot be reversed without
    /// information that was destroyed (dropped columns, dropped tables).
    #[must_use]
    pub fn reverse(&self) -> Option<Self> {
        match self {
            Self::CreateTable(e) => Some(Self::DropTable(DropTableExpression {
                schema: e.schema.clone(),
                name: e.name.clone(),
                if_exists: false,
            })),
            Self::DropTable(_) => None,
            Self::RenameTable(e) => Some(Self::RenameTable(RenameTableExpression {
                schema: e.schema.clone(),
                old_name: e.new_name.clone(),
                new_name: e.old_name.clone(),
            })),
            Self::AddColumn(e) => Some(Self::DropColumn(DropColumnExpression {
                schema: e.schema.clone(),
                table: e.table.clone(),
                column: e.column.name.clone(),
            })),
            Self::AlterColumn(_) | Self::DropColumn(_) => None,
            Self::RenameColumn(e) => Some(Self::RenameColumn(RenameColumnExpression {
                schema: e.schema.clone(),
                table: e.table.clone(),
                old_name: e.new_name.clone(),
                new_name: e.old_name.clone(),
            })),
            Self::CreateIndex(e) => Some(Self::DropIndex(DropIndexExpression {
                schema: e.schema.clone(),
                name: e.name.clone(),
                table: Some(e.table.clone()),
                if_exists: false,
            })),
            Self::DropIndex(_) => None,
            Self::CreateForeignKey(e) => e.name.as_ref().map(|name| {
                Self::DropForeignKey(DropForeignKeyExpression {
                    schema: e.schema.clone(),
                    table: e.table.clone(),
                    name: name.clone(),
                })
            }),
            Self::DropForeignKey(_) => None,
            Self::CreateSequence(e) => Some(Self::DropSequence(DropSequenceExpression {
                schema: e.schema.clone(),
                name: e.name.clone(),
                if_exists: false,
            })),
            Self::DropSequence(_) => None,
            // Inserted rows are deleted by matching every inserted value.
            Self::InsertData(e) => Some(Self::DeleteData(DeleteDataExpression {
                schema: e.schema.clone(),
                table: e.table.clone(),
                rows: e.rows.clone(),
                all_rows: false,
            })),
            Self::DeleteData(_) | Self::UpdateData(_) => None,
            Self::Sql(e) => e.down_sql.as_ref().map(|down| Self::sql(down.clone())),
        }
    }

    /// Returns whether this expression is reversible.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        self.reverse().is_some()
    }
}

/// Table-level constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableConstraint {
    /// Primary key constraint.
    PrimaryKey {
        /// Optional constraint name.
        name: Option<String>,
        /// Column names.
        columns: Vec<String>,
    },
    /// Unique constraint.
    Unique {
        /// Optional constraint name.
        name: Option<String>,
        /// Column names.
        columns: Vec<String>,
    },
    /// Foreign key constraint.
    ForeignKey {
        /// Optional constraint name.
        name: Option<String>,
        /// Columns in this table.
        columns: Vec<String>,
        /// Referenced table.
        references_table: String,
        /// Referenced columns.
        references_columns: Vec<String>,
        /// ON DELETE action.
        on_delete: Option<ForeignKeyAction>,
        /// ON UPDATE action.
        on_update: Option<ForeignKeyAction>,
    },
    /// Check constraint.
    Check {
        /// Optional constraint name.
        name: Option<String>,
        /// Check expression.
        expression: String,
    },
}

impl TableConstraint {
    /// Returns the explicit constraint name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::PrimaryKey { name, .. }
            | Self::Unique { name, .. }
            | Self::ForeignKey { name, .. }
            | Self::Check { name, .. } => name.as_deref(),
        }
    }
}

/// Create table expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
    /// Column definitions.
    pub columns: Vec<ColumnDefinition>,
    /// Table-level constraints, emitted after the columns in order.
    pub constraints: Vec<TableConstraint>,
    /// Whether to use IF NOT EXISTS where the dialect allows it.
    pub if_not_exists: bool,
}

/// Drop table expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTableExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
    /// Whether to use IF EXISTS.
    pub if_exists: bool,
}

/// Rename table expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTableExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Current table name.
    pub old_name: String,
    /// New table name.
    pub new_name: String,
}

/// Add column expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddColumnExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
    /// Column definition.
    pub column: ColumnDefinition,
}

/// The change carried by an alter column expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlterColumnChange {
    /// Change the data type.
    SetType {
        /// New abstract type.
        db_type: DbType,
        /// New capacity.
        size: Option<u32>,
        /// New precision.
        precision: Option<u8>,
        /// New scale.
        scale: Option<u8>,
    },
    /// Set or remove the NOT NULL constraint.
    SetNullable(bool),
    /// Set a new default value.
    SetDefault(Value),
    /// Remove the default value.
    DropDefault,
}

/// Alter column expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterColumnExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
    /// Column name.
    pub column: String,
    /// The change to apply.
    pub change: AlterColumnChange,
}

/// Drop column expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumnExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
    /// Column name.
    pub column: String,
}

/// Rename column expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameColumnExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
    /// Current column name.
    pub old_name: String,
    /// New column name.
    pub new_name: String,
}

/// Sort direction for an index column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IndexColumnDirection {
    /// Ascending order (default).
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

/// A single indexed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumn {
    /// Column name.
    pub name: String,
    /// Sort direction.
    pub direction: IndexColumnDirection,
}

impl IndexColumn {
    /// Creates an ascending index column.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: IndexColumnDirection::Ascending,
        }
    }

    /// Creates a descending index column.
    #[must_use]
    pub fn descending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: IndexColumnDirection::Descending,
        }
    }
}

/// Create index expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Index name.
    pub name: String,
    /// Table name.
    pub table: String,
    /// Indexed columns in order.
    pub columns: Vec<IndexColumn>,
    /// Whether this is a unique index.
    pub unique: bool,
    /// Whether to use IF NOT EXISTS where the dialect allows it.
    pub if_not_exists: bool,
}

/// Drop index expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropIndexExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Index name.
    pub name: String,
    /// Table name (required by some dialects).
    pub table: Option<String>,
    /// Whether to use IF EXISTS.
    pub if_exists: bool,
}

/// Create foreign key expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateForeignKeyExpression {
    /// Optional constraint name. Required for reversibility.
    pub name: Option<String>,
    /// Optional schema of the referencing table.
    pub schema: Option<String>,
    /// Referencing table.
    pub table: String,
    /// Referencing columns.
    pub columns: Vec<String>,
    /// Optional schema of the referenced table.
    pub references_schema: Option<String>,
    /// Referenced table.
    pub references_table: String,
    /// Referenced columns.
    pub references_columns: Vec<String>,
    /// ON DELETE action.
    pub on_delete: Option<ForeignKeyAction>,
    /// ON UPDATE action.
    pub on_update: Option<ForeignKeyAction>,
}

/// Drop foreign key expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropForeignKeyExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
    /// Constraint name.
    pub name: String,
}

/// Create sequence expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSequenceExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Sequence name.
    pub name: String,
    /// START WITH value.
    pub start: Option<i64>,
    /// INCREMENT BY value.
    pub increment: Option<i64>,
    /// MINVALUE.
    pub min_value: Option<i64>,
    /// MAXVALUE.
    pub max_value: Option<i64>,
    /// Whether the sequence cycles.
    pub cycle: bool,
}

impl CreateSequenceExpression {
    /// Creates a sequence expression with defaults.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            start: None,
            increment: None,
            min_value: None,
            max_value: None,
            cycle: false,
        }
    }

    /// Sets the schema.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the START WITH value.
    #[must_use]
    pub fn start_with(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the INCREMENT BY value.
    #[must_use]
    pub fn increment_by(mut self, increment: i64) -> Self {
        self.increment = Some(increment);
        self
    }

    /// Sets the MINVALUE.
    #[must_use]
    pub fn min_value(mut self, min: i64) -> Self {
        self.min_value = Some(min);
        self
    }

    /// Sets the MAXVALUE.
    #[must_use]
    pub fn max_value(mut self, max: i64) -> Self {
        self.max_value = Some(max);
        self
    }

    /// Makes the sequence cycle when it reaches its bound.
    #[must_use]
    pub fn cycle(mut self) -> Self {
        self.cycle = true;
        self
    }
}

/// Drop sequence expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSequenceExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Sequence name.
    pub name: String,
    /// Whether to use IF EXISTS.
    pub if_exists: bool,
}

/// Insert data expression. Each row becomes one INSERT statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertDataExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
    /// Rows to insert.
    pub rows: Vec<Row>,
}

impl InsertDataExpression {
    /// Creates an insert expression for the given table.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
            rows: Vec::new(),
        }
    }

    /// Sets the schema.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Adds a row of (column, value) pairs.
    #[must_use]
    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }
}

/// Delete data expression.
///
/// With `all_rows` set, a single unconditional DELETE is produced; otherwise
/// one DELETE per row, matching every (column, value) pair with AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteDataExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
    /// Row predicates.
    pub rows: Vec<Row>,
    /// Delete all rows without a predicate.
    pub all_rows: bool,
}

impl DeleteDataExpression {
    /// Creates a delete expression for the given table.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
            rows: Vec::new(),
            all_rows: false,
        }
    }

    /// Sets the schema.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Adds a row predicate.
    #[must_use]
    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Deletes every row instead of matching predicates.
    #[must_use]
    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }
}

/// Update data expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDataExpression {
    /// Optional schema name.
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
    /// SET pairs.
    pub set: Row,
    /// WHERE predicate pairs, matched with AND.
    pub where_columns: Row,
    /// Update all rows without a predicate.
    pub all_rows: bool,
}

impl UpdateDataExpression {
    /// Creates an update expression for the given table.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
            set: Vec::new(),
            where_columns: Vec::new(),
            all_rows: false,
        }
    }

    /// Sets the schema.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Adds a SET pair.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: Value) -> Self {
        self.set.push((column.into(), value));
        self
    }

    /// Adds a WHERE pair.
    #[must_use]
    pub fn where_column(mut self, column: impl Into<String>, value: Value) -> Self {
        self.where_columns.push((column.into(), value));
        self
    }

    /// Updates every row instead of matching a predicate.
    #[must_use]
    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }
}

/// Raw SQL expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlExpression {
    /// SQL to run for the up migration.
    pub up_sql: String,
    /// SQL to run for the down migration (if reversible).
    pub down_sql: Option<String>,
}

macro_rules! impl_from_expression {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for MigrationExpression {
            fn from(e: $ty) -> Self {
                Self::$variant(e)
            }
        })*
    };
}

impl_from_expression!(
    CreateTableExpression => CreateTable,
    DropTableExpression => DropTable,
    RenameTableExpression => RenameTable,
    AddColumnExpression => AddColumn,
    AlterColumnExpression => AlterColumn,
    DropColumnExpression => DropColumn,
    RenameColumnExpression => RenameColumn,
    CreateIndexExpression => CreateIndex,
    DropIndexExpression => DropIndex,
    CreateForeignKeyExpression => CreateForeignKey,
    DropForeignKeyExpression => DropForeignKey,
    CreateSequenceExpression => CreateSequence,
    DropSequenceExpression => DropSequence,
    InsertDataExpression => InsertData,
    DeleteDataExpression => DeleteData,
    UpdateDataExpression => UpdateData,
    SqlExpression => Sql,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{string, Value};

    #[test]
    fn test_drop_table_constructor() {
        let expr = MigrationExpression::drop_table("users");
        match expr {
            MigrationExpression::DropTable(e) => {
                assert_eq!(e.name, "users");
                assert!(!e.if_exists);
            }
            _ => panic!("expected DropTable"),
        }
    }

    #[test]
    fn test_reverse_create_table() {
        let expr = MigrationExpression::CreateTable(CreateTableExpression {
            schema: Some("app".into()),
            name: "users".into(),
            columns: vec![string("username", 255).build()],
            constraints: vec![],
            if_not_exists: false,
        });
        let reversed = expr.reverse().expect("reversible");
        match reversed {
            MigrationExpression::DropTable(e) => {
                assert_eq!(e.name, "users");
                assert_eq!(e.schema.as_deref(), Some("app"));
            }
            _ => panic!("expected DropTable"),
        }
    }

    #[test]
    fn test_reverse_rename_swaps_names() {
        let expr = MigrationExpression::rename_table("old", "new");
        let reversed = expr.reverse().expect("reversible");
        match reversed {
            MigrationExpression::RenameTable(e) => {
                assert_eq!(e.old_name, "new");
                assert_eq!(e.new_name, "old");
            }
            _ => panic!("expected RenameTable"),
        }
    }

    #[test]
    fn test_reverse_insert_becomes_row_delete() {
        let expr: MigrationExpression = InsertDataExpression::new("config")
            .row(vec![
                ("key".into(), Value::from("retries")),
                ("value".into(), Value::Int(3)),
            ])
            .into();
        let reversed = expr.reverse().expect("reversible");
        match reversed {
            MigrationExpression::DeleteData(e) => {
                assert_eq!(e.table, "config");
                assert_eq!(e.rows.len(), 1);
                assert!(!e.all_rows);
            }
            _ => panic!("expected DeleteData"),
        }
    }

    #[test]
    fn test_unnamed_foreign_key_not_reversible() {
        let expr = MigrationExpression::CreateForeignKey(CreateForeignKeyExpression {
            name: None,
            schema: None,
            table: "invoices".into(),
            columns: vec!["user_id".into()],
            references_schema: None,
            references_table: "users".into(),
            references_columns: vec!["id".into()],
            on_delete: None,
            on_update: None,
        });
        assert!(!expr.is_reversible());
    }

    #[test]
    fn test_raw_sql_reversibility() {
        assert!(!MigrationExpression::sql("DROP VIEW v").is_reversible());
        assert!(
            MigrationExpression::sql_reversible("CREATE VIEW v AS SELECT 1", "DROP VIEW v")
                .is_reversible()
        );
    }
}

//! Fluent builders for table, index, and foreign key expressions.
//!
//! The create-table builder uses the typestate pattern so that a table
//! without a name or without at least one column does not compile.

use std::marker::PhantomData;

use crate::column::{ColumnDefinition, ForeignKeyAction};
use crate::expression::{
    CreateForeignKeyExpression, CreateIndexExpression, CreateTableExpression, IndexColumn,
    TableConstraint,
};

// =============================================================================
// Typestate markers
// =============================================================================

/// Marker: table has no name set.
#[derive(Debug, Clone, Copy)]
pub struct NoName;

/// Marker: table has a name set.
#[derive(Debug, Clone, Copy)]
pub struct HasName;

/// Marker: table has no columns.
#[derive(Debug, Clone, Copy)]
pub struct NoColumns;

/// Marker: table has at least one column.
#[derive(Debug, Clone, Copy)]
pub struct HasColumns;

/// Type-safe CREATE TABLE builder.
///
/// # Example
///
/// ```rust
/// use tidemark_core::table::CreateTableBuilder;
/// use tidemark_core::column::{bigint, string};
///
/// let expr = CreateTableBuilder::new()
///     .name("users")
///     .column(bigint("id").primary_key().identity().build())
///     .column(string("username", 255).not_null().unique().build())
///     .build();
///
/// assert_eq!(expr.name, "users");
/// assert_eq!(expr.columns.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CreateTableBuilder<Name, Cols> {
    schema: Option<String>,
    name: Option<String>,
    columns: Vec<ColumnDefinition>,
    constraints: Vec<TableConstraint>,
    if_not_exists: bool,
    _state: PhantomData<(Name, Cols)>,
}

impl Default for CreateTableBuilder<NoName, NoColumns> {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateTableBuilder<NoName, NoColumns> {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: None,
            name: None,
            columns: Vec::new(),
            constraints: Vec::new(),
            if_not_exists: false,
            _state: PhantomData,
        }
    }
}

impl<Cols> CreateTableBuilder<NoName, Cols> {
    /// Sets the table name.
    #[must_use]
    pub fn name(self, name: impl Into<String>) -> CreateTableBuilder<HasName, Cols> {
        CreateTableBuilder {
            schema: self.schema,
            name: Some(name.into()),
            columns: self.columns,
            constraints: self.constraints,
            if_not_exists: self.if_not_exists,
            _state: PhantomData,
        }
    }
}

impl<Name> CreateTableBuilder<Name, NoColumns> {
    /// Adds the first column.
    #[must_use]
    pub fn column(self, column: ColumnDefinition) -> CreateTableBuilder<Name, HasColumns> {
        CreateTableBuilder {
            schema: self.schema,
            name: self.name,
            columns: vec![column],
            constraints: self.constraints,
            if_not_exists: self.if_not_exists,
            _state: PhantomData,
        }
    }
}

impl<Name> CreateTableBuilder<Name, HasColumns> {
    /// Adds another column.
    #[must_use]
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }
}

impl<Name, Cols> CreateTableBuilder<Name, Cols> {
    /// Sets the schema name.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Uses IF NOT EXISTS where the dialect allows it.
    #[must_use]
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Adds a composite primary key constraint.
    #[must_use]
    pub fn primary_key(mut self, name: Option<&str>, columns: &[&str]) -> Self {
        self.constraints.push(TableConstraint::PrimaryKey {
            name: name.map(ToString::to_string),
            columns: columns.iter().map(ToString::to_string).collect(),
        });
        self
    }

    /// Adds a composite unique constraint.
    #[must_use]
    pub fn unique(mut self, name: Option<&str>, columns: &[&str]) -> Self {
        self.constraints.push(TableConstraint::Unique {
            name: name.map(ToString::to_string),
            columns: columns.iter().map(ToString::to_string).collect(),
        });
        self
    }

    /// Adds a check constraint.
    #[must_use]
    pub fn check(mut self, name: Option<&str>, expression: impl Into<String>) -> Self {
        self.constraints.push(TableConstraint::Check {
            name: name.map(ToString::to_string),
            expression: expression.into(),
        });
        self
    }

    /// Adds a table-level foreign key constraint.
    #[must_use]
    pub fn foreign_key(
        mut self,
        name: Option<&str>,
        columns: &[&str],
        references_table: impl Into<String>,
        references_columns: &[&str],
    ) -> Self {
        self.constraints.push(TableConstraint::ForeignKey {
            name: name.map(ToString::to_string),
            columns: columns.iter().map(ToString::to_string).collect(),
            references_table: references_table.into(),
            references_columns: references_columns.iter().map(ToString::to_string).collect(),
            on_delete: None,
            on_update: None,
        });
        self
    }
}

impl CreateTableBuilder<HasName, HasColumns> {
    /// Builds the expression.
    #[must_use]
    pub fn build(self) -> CreateTableExpression {
        CreateTableExpression {
            schema: self.schema,
            name: self.name.unwrap_or_default(),
            columns: self.columns,
            constraints: self.constraints,
            if_not_exists: self.if_not_exists,
        }
    }
}

/// Fluent builder for [`CreateIndexExpression`].
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    expr: CreateIndexExpression,
}

impl IndexBuilder {
    /// Creates an index builder for the given index and table.
    #[must_use]
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            expr: CreateIndexExpression {
                schema: None,
                name: name.into(),
                table: table.into(),
                columns: Vec::new(),
                unique: false,
                if_not_exists: false,
            },
        }
    }

    /// Sets the schema name.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.expr.schema = Some(schema.into());
        self
    }

    /// Adds an ascending column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.expr.columns.push(IndexColumn::new(name));
        self
    }

    /// Adds a descending column.
    #[must_use]
    pub fn column_descending(mut self, name: impl Into<String>) -> Self {
        self.expr.columns.push(IndexColumn::descending(name));
        self
    }

    /// Makes the index unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.expr.unique = true;
        self
    }

    /// Uses IF NOT EXISTS where the dialect allows it.
    #[must_use]
    pub fn if_not_exists(mut self) -> Self {
        self.expr.if_not_exists = true;
        self
    }

    /// Builds the expression.
    #[must_use]
    pub fn build(self) -> CreateIndexExpression {
        self.expr
    }
}

/// Fluent builder for [`CreateForeignKeyExpression`].
#[derive(Debug, Clone)]
pub struct ForeignKeyBuilder {
    expr: CreateForeignKeyExpression,
}

impl ForeignKeyBuilder {
    /// Creates a foreign key builder between two tables.
    #[must_use]
    pub fn new(table: impl Into<String>, references_table: impl Into<String>) -> Self {
        Self {
            expr: CreateForeignKeyExpression {
                name: None,
                schema: None,
                table: table.into(),
                columns: Vec::new(),
                references_schema: None,
                references_table: references_table.into(),
                references_columns: Vec::new(),
                on_delete: None,
                on_update: None,
            },
        }
    }

    /// Sets the constraint name. Named keys are reversible.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.expr.name = Some(name.into());
        self
    }

    /// Sets the schema of the referencing table.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.expr.schema = Some(schema.into());
        self
    }

    /// Sets the schema of the referenced table.
    #[must_use]
    pub fn references_schema(mut self, schema: impl Into<String>) -> Self {
        self.expr.references_schema = Some(schema.into());
        self
    }

    /// Adds a referencing/referenced column pair.
    #[must_use]
    pub fn column_pair(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.expr.columns.push(from.into());
        self.expr.references_columns.push(to.into());
        self
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.expr.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.expr.on_update = Some(action);
        self
    }

    /// Builds the expression.
    #[must_use]
    pub fn build(self) -> CreateForeignKeyExpression {
        self.expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{bigint, integer, string};

    #[test]
    fn test_create_table_builder() {
        let expr = CreateTableBuilder::new()
            .name("users")
            .column(bigint("id").primary_key().identity().build())
            .column(string("username", 255).not_null().build())
            .if_not_exists()
            .build();

        assert_eq!(expr.name, "users");
        assert_eq!(expr.columns.len(), 2);
        assert!(expr.if_not_exists);
    }

    #[test]
    fn test_composite_primary_key() {
        let expr = CreateTableBuilder::new()
            .name("order_items")
            .column(bigint("order_id").not_null().build())
            .column(bigint("product_id").not_null().build())
            .column(integer("quantity").not_null().build())
            .primary_key(Some("pk_order_items"), &["order_id", "product_id"])
            .build();

        assert_eq!(expr.constraints.len(), 1);
        match &expr.constraints[0] {
            TableConstraint::PrimaryKey { name, columns } => {
                assert_eq!(name.as_deref(), Some("pk_order_items"));
                assert_eq!(columns, &["order_id", "product_id"]);
            }
            _ => panic!("expected PrimaryKey"),
        }
    }

    #[test]
    fn test_index_builder() {
        let expr = IndexBuilder::new("ix_users_email", "users")
            .column("email")
            .column_descending("created_at")
            .unique()
            .build();

        assert_eq!(expr.name, "ix_users_email");
        assert_eq!(expr.columns.len(), 2);
        assert!(expr.unique);
    }

    #[test]
    fn test_foreign_key_builder() {
        let expr = ForeignKeyBuilder::new("invoices", "users")
            .name("fk_invoices_user")
            .column_pair("user_id", "id")
            .on_delete(ForeignKeyAction::Cascade)
            .build();

        assert_eq!(expr.columns, vec!["user_id"]);
        assert_eq!(expr.references_columns, vec!["id"]);
        assert_eq!(expr.on_delete, Some(ForeignKeyAction::Cascade));
    }
}

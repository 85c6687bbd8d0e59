//! Integration tests for expression-to-SQL generation.
//!
//! These build expressions through the fluent builders and verify the SQL
//! each dialect produces, including the degradation paths in loose
//! compatibility mode.

use tidemark_core::error::CompatibilityMode;
use tidemark_core::expression::{MigrationExpression, TableConstraint};
use tidemark_core::generator::{
    GeneratorOptions, MsSqlGenerator, MySqlGenerator, OracleGenerator, PostgresGenerator,
    SqlGenerator, SqliteGenerator,
};
use tidemark_core::prelude::*;
use tidemark_core::table::{CreateTableBuilder, ForeignKeyBuilder, IndexBuilder};

fn all_generators() -> Vec<Box<dyn SqlGenerator>> {
    vec![
        Box::new(PostgresGenerator::new()),
        Box::new(SqliteGenerator::new()),
        Box::new(MySqlGenerator::new()),
        Box::new(MsSqlGenerator::new()),
        Box::new(OracleGenerator::new()),
    ]
}

// =============================================================================
// Create table structure
// =============================================================================

#[test]
fn create_table_emits_one_clause_per_column() {
    let expr: MigrationExpression = CreateTableBuilder::new()
        .name("invoices")
        .column(bigint("id").primary_key().build())
        .column(string("reference", 100).not_null().build())
        .column(decimal("total", 10, 2).not_null().build())
        .column(boolean("paid").not_null().default_value(Value::Bool(false)).build())
        .build()
        .into();

    for generator in all_generators() {
        let sql = generator.generate(&expr).unwrap();
        assert_eq!(sql.len(), 1, "{}", generator.dialect());
        let body = &sql[0];
        // One comma-separated clause per column, no table constraints.
        let clauses: Vec<&str> = body
            .trim_end_matches(')')
            .split_once('(')
            .expect("column list")
            .1
            .split(",\n")
            .collect();
        assert_eq!(clauses.len(), 4, "{}: {body}", generator.dialect());
    }
}

#[test]
fn table_constraints_follow_columns_in_order() {
    let expr: MigrationExpression = CreateTableBuilder::new()
        .name("order_items")
        .column(bigint("order_id").not_null().build())
        .column(bigint("product_id").not_null().build())
        .primary_key(Some("pk_order_items"), &["order_id", "product_id"])
        .unique(Some("uq_order_product"), &["product_id", "order_id"])
        .check(None, "order_id > 0")
        .build()
        .into();

    let generator = PostgresGenerator::new();
    let sql = generator.generate(&expr).unwrap();
    let body = &sql[0];

    let pk = body.find("CONSTRAINT \"pk_order_items\" PRIMARY KEY").unwrap();
    let uq = body.find("CONSTRAINT \"uq_order_product\" UNIQUE").unwrap();
    let check = body.find("CHECK (order_id > 0)").unwrap();
    let last_column = body.find("\"product_id\" BIGINT NOT NULL").unwrap();
    assert!(last_column < pk);
    assert!(pk < uq);
    assert!(uq < check);
}

#[test]
fn empty_tables_and_indexes_are_rejected() {
    let table = MigrationExpression::CreateTable(tidemark_core::expression::CreateTableExpression {
        schema: None,
        name: "empty".into(),
        columns: vec![],
        constraints: vec![],
        if_not_exists: false,
    });
    for generator in all_generators() {
        assert!(matches!(
            generator.generate(&table).unwrap_err(),
            GenerateError::InvalidExpression(_)
        ));
    }
}

// =============================================================================
// Dialect type strings
// =============================================================================

#[test]
fn guid_column_type_per_dialect() {
    let expr: MigrationExpression = CreateTableBuilder::new()
        .name("events")
        .column(guid("id").primary_key().build())
        .build()
        .into();

    let expectations = [
        ("postgresql", "\"id\" UUID"),
        ("sqlite", "\"id\" TEXT"),
        ("mysql", "`id` CHAR(36)"),
        ("mssql", "[id] UNIQUEIDENTIFIER"),
        ("oracle", "\"id\" RAW(16)"),
    ];
    for generator in all_generators() {
        let sql = generator.generate(&expr).unwrap();
        let expected = expectations
            .iter()
            .find(|(d, _)| *d == generator.dialect())
            .unwrap()
            .1;
        assert!(sql[0].contains(expected), "{}: {}", generator.dialect(), sql[0]);
    }
}

#[test]
fn sized_string_selects_threshold_per_dialect() {
    let expr = MigrationExpression::add_column("notes", string("body", 5000).build());

    let expectations = [
        ("postgresql", "VARCHAR(5000)"),
        ("sqlite", "TEXT"),
        ("mysql", "VARCHAR(5000)"),
        ("mssql", "NVARCHAR(MAX)"),
        ("oracle", "NCLOB"),
    ];
    for generator in all_generators() {
        let sql = generator.generate(&expr).unwrap();
        let expected = expectations
            .iter()
            .find(|(d, _)| *d == generator.dialect())
            .unwrap()
            .1;
        assert!(sql[0].contains(expected), "{}: {}", generator.dialect(), sql[0]);
    }
}

// =============================================================================
// Indexes and foreign keys
// =============================================================================

#[test]
fn unique_index_with_mixed_directions() {
    let expr: MigrationExpression = IndexBuilder::new("ix_events_at", "events")
        .column("kind")
        .column_descending("occurred_at")
        .unique()
        .build()
        .into();

    let generator = PostgresGenerator::new();
    let sql = generator.generate(&expr).unwrap();
    assert_eq!(
        sql,
        vec!["CREATE UNIQUE INDEX \"ix_events_at\" ON \"events\" (\"kind\", \"occurred_at\" DESC)"]
    );
}

#[test]
fn foreign_key_with_actions() {
    let expr: MigrationExpression = ForeignKeyBuilder::new("invoices", "users")
        .name("fk_invoices_user")
        .column_pair("user_id", "id")
        .on_delete(ForeignKeyAction::Cascade)
        .on_update(ForeignKeyAction::SetNull)
        .build()
        .into();

    let generator = PostgresGenerator::new();
    let sql = generator.generate(&expr).unwrap();
    assert_eq!(
        sql,
        vec![
            "ALTER TABLE \"invoices\" ADD CONSTRAINT \"fk_invoices_user\" \
             FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\") \
             ON DELETE CASCADE ON UPDATE SET NULL"
        ]
    );
}

#[test]
fn unnamed_foreign_key_is_not_reversible() {
    let named: MigrationExpression = ForeignKeyBuilder::new("invoices", "users")
        .name("fk_invoices_user")
        .column_pair("user_id", "id")
        .build()
        .into();
    let unnamed: MigrationExpression = ForeignKeyBuilder::new("invoices", "users")
        .column_pair("user_id", "id")
        .build()
        .into();

    assert!(named.is_reversible());
    assert!(!unnamed.is_reversible());
}

// =============================================================================
// Data expressions
// =============================================================================

#[test]
fn insert_emits_one_statement_per_row() {
    let expr: MigrationExpression = InsertDataExpression::new("roles")
        .row(vec![
            ("id".to_string(), Value::Int(1)),
            ("name".to_string(), Value::from("admin")),
        ])
        .row(vec![
            ("id".to_string(), Value::Int(2)),
            ("name".to_string(), Value::from("user")),
        ])
        .into();

    let generator = SqliteGenerator::new();
    let sql = generator.generate(&expr).unwrap();
    assert_eq!(
        sql,
        vec![
            "INSERT INTO \"roles\" (\"id\", \"name\") VALUES (1, 'admin')",
            "INSERT INTO \"roles\" (\"id\", \"name\") VALUES (2, 'user')",
        ]
    );
}

#[test]
fn delete_without_predicate_requires_all_rows() {
    let generator = SqliteGenerator::new();

    let bare: MigrationExpression = DeleteDataExpression::new("roles").into();
    assert!(matches!(
        generator.generate(&bare).unwrap_err(),
        GenerateError::InvalidExpression(_)
    ));

    let all: MigrationExpression = DeleteDataExpression::new("roles").all_rows().into();
    assert_eq!(generator.generate(&all).unwrap(), vec!["DELETE FROM \"roles\""]);
}

#[test]
fn update_renders_null_predicates_with_is_null() {
    let expr: MigrationExpression = UpdateDataExpression::new("users")
        .set("active", Value::Bool(false))
        .where_column("deleted_at", Value::Null)
        .into();

    let generator = PostgresGenerator::new();
    let sql = generator.generate(&expr).unwrap();
    assert_eq!(
        sql,
        vec!["UPDATE \"users\" SET \"active\" = FALSE WHERE \"deleted_at\" IS NULL"]
    );
}

// =============================================================================
// Compatibility modes
// =============================================================================

#[test]
fn strict_mode_refuses_what_loose_mode_comments_out() {
    let expr: MigrationExpression = CreateSequenceExpression::new("seq_orders")
        .start_with(100)
        .into();

    let strict = SqliteGenerator::new();
    assert!(matches!(
        strict.generate(&expr).unwrap_err(),
        GenerateError::Unsupported { .. }
    ));

    let loose = SqliteGenerator::with_options(GeneratorOptions {
        compatibility: CompatibilityMode::Loose,
    });
    let sql = loose.generate(&expr).unwrap();
    assert_eq!(sql, vec!["-- sequences is not supported by sqlite"]);
}

#[test]
fn sequences_render_where_supported() {
    let expr: MigrationExpression = CreateSequenceExpression::new("seq_orders")
        .start_with(100)
        .increment_by(10)
        .max_value(1_000_000)
        .into();

    let generator = PostgresGenerator::new();
    assert_eq!(
        generator.generate(&expr).unwrap(),
        vec!["CREATE SEQUENCE \"seq_orders\" START WITH 100 INCREMENT BY 10 MAXVALUE 1000000"]
    );
}

// =============================================================================
// Raw SQL passthrough
// =============================================================================

#[test]
fn raw_sql_passes_through_unchanged() {
    let expr = MigrationExpression::sql("CREATE EXTENSION IF NOT EXISTS pgcrypto");
    for generator in all_generators() {
        assert_eq!(
            generator.generate(&expr).unwrap(),
            vec!["CREATE EXTENSION IF NOT EXISTS pgcrypto".to_string()],
            "{}",
            generator.dialect()
        );
    }
}

// =============================================================================
// Constraint metadata
// =============================================================================

#[test]
fn constraint_names_are_exposed() {
    let named = TableConstraint::PrimaryKey {
        name: Some("pk_users".into()),
        columns: vec!["id".into()],
    };
    let anonymous = TableConstraint::Check {
        name: None,
        expression: "id > 0".into(),
    };
    assert_eq!(named.name(), Some("pk_users"));
    assert_eq!(anonymous.name(), None);
}

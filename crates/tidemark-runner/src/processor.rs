//! Database processors.
//!
//! A [`Processor`] pairs a dialect generator with a live connection pool:
//! it executes generated statements, answers catalog existence queries, and
//! scopes work in transactions. One processor per supported backend.

use sqlx::postgres::PgPool;
use sqlx::sqlite::SqlitePool;
use sqlx::{Postgres, Sqlite, Transaction};
use tracing::{debug, warn};

use tidemark_core::generator::{PostgresGenerator, SqlGenerator, SqliteGenerator};

use crate::error::{MigrateError, Result};

/// Executes migration SQL against one database backend.
///
/// Statements made entirely of `--` comment lines are degraded placeholders
/// emitted in loose compatibility mode; processors log and skip them.
#[allow(async_fn_in_trait)]
pub trait Processor {
    /// The generator producing SQL for this backend.
    type Generator: SqlGenerator;

    /// Returns the dialect generator.
    fn generator(&self) -> &Self::Generator;

    /// Executes one statement, inside the open transaction if any.
    async fn execute(&mut self, sql: &str) -> Result<()>;

    /// Runs a query returning one i64 column per row.
    async fn query_versions(&mut self, sql: &str) -> Result<Vec<i64>>;

    /// Whether a table exists.
    async fn table_exists(&mut self, schema: Option<&str>, table: &str) -> Result<bool>;

    /// Whether a column exists on a table.
    async fn column_exists(
        &mut self,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<bool>;

    /// Whether an index exists.
    async fn index_exists(&mut self, schema: Option<&str>, index: &str) -> Result<bool>;

    /// Whether a named constraint exists on a table.
    async fn constraint_exists(
        &mut self,
        schema: Option<&str>,
        table: &str,
        constraint: &str,
    ) -> Result<bool>;

    /// Whether a sequence exists.
    async fn sequence_exists(&mut self, schema: Option<&str>, sequence: &str) -> Result<bool>;

    /// Opens a transaction. Subsequent calls run inside it.
    async fn begin(&mut self) -> Result<()>;

    /// Commits the open transaction, if any.
    async fn commit(&mut self) -> Result<()>;

    /// Rolls back the open transaction, if any.
    async fn rollback(&mut self) -> Result<()>;
}

fn execution_error(sql: &str, source: sqlx::Error) -> MigrateError {
    MigrateError::Execution {
        sql: sql.to_string(),
        source,
    }
}

/// True when every non-blank line is a `--` comment, i.e. the statement is
/// a loose-mode placeholder with nothing executable in it.
fn is_comment_only(sql: &str) -> bool {
    sql.lines()
        .map(str::trim_start)
        .filter(|line| !line.is_empty())
        .all(|line| line.starts_with("--"))
}

/// SQLite processor.
///
/// SQLite has no catalog for constraints or sequences, so those existence
/// checks always report false.
pub struct SqliteProcessor {
    pool: SqlitePool,
    generator: SqliteGenerator,
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteProcessor {
    /// Creates a processor over an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool, generator: SqliteGenerator) -> Self {
        Self {
            pool,
            generator,
            tx: None,
        }
    }
}

impl Processor for SqliteProcessor {
    type Generator = SqliteGenerator;

    fn generator(&self) -> &Self::Generator {
        &self.generator
    }

    async fn execute(&mut self, sql: &str) -> Result<()> {
        if is_comment_only(sql) {
            warn!(comment = %sql, "skipping placeholder for unsupported statement");
            return Ok(());
        }
        debug!(sql = %sql, "executing");
        let result = match self.tx.as_mut() {
            Some(tx) => sqlx::query(sql).execute(&mut **tx).await,
            None => sqlx::query(sql).execute(&self.pool).await,
        };
        result.map_err(|e| execution_error(sql, e))?;
        Ok(())
    }

    async fn query_versions(&mut self, sql: &str) -> Result<Vec<i64>> {
        let query = sqlx::query_scalar::<_, i64>(sql);
        Ok(match self.tx.as_mut() {
            Some(tx) => query.fetch_all(&mut **tx).await?,
            None => query.fetch_all(&self.pool).await?,
        })
    }

    async fn table_exists(&mut self, _schema: Option<&str>, table: &str) -> Result<bool> {
        let query = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table);
        let row = match self.tx.as_mut() {
            Some(tx) => query.fetch_optional(&mut **tx).await?,
            None => query.fetch_optional(&self.pool).await?,
        };
        Ok(row.is_some())
    }

    async fn column_exists(
        &mut self,
        _schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<bool> {
        let query = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM pragma_table_info(?) WHERE name = ?",
        )
        .bind(table)
        .bind(column);
        let row = match self.tx.as_mut() {
            Some(tx) => query.fetch_optional(&mut **tx).await?,
            None => query.fetch_optional(&self.pool).await?,
        };
        Ok(row.is_some())
    }

    async fn index_exists(&mut self, _schema: Option<&str>, index: &str) -> Result<bool> {
        let query = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = ?",
        )
        .bind(index);
        let row = match self.tx.as_mut() {
            Some(tx) => query.fetch_optional(&mut **tx).await?,
            None => query.fetch_optional(&self.pool).await?,
        };
        Ok(row.is_some())
    }

    async fn constraint_exists(
        &mut self,
        _schema: Option<&str>,
        _table: &str,
        _constraint: &str,
    ) -> Result<bool> {
        Ok(false)
    }

    async fn sequence_exists(&mut self, _schema: Option<&str>, _sequence: &str) -> Result<bool> {
        Ok(false)
    }

    async fn begin(&mut self) -> Result<()> {
        if self.tx.is_none() {
            self.tx = Some(self.pool.begin().await?);
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}

/// PostgreSQL processor. Catalog queries go through `information_schema`,
/// defaulting to the connection's current schema.
pub struct PostgresProcessor {
    pool: PgPool,
    generator: PostgresGenerator,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PostgresProcessor {
    /// Creates a processor over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool, generator: PostgresGenerator) -> Self {
        Self {
            pool,
            generator,
            tx: None,
        }
    }

    async fn fetch_exists(
        &mut self,
        sql: &str,
        binds: &[Option<&str>],
    ) -> Result<bool> {
        let mut query = sqlx::query_scalar::<_, bool>(sql);
        for bind in binds {
            query = query.bind(bind.map(ToString::to_string));
        }
        Ok(match self.tx.as_mut() {
            Some(tx) => query.fetch_one(&mut **tx).await?,
            None => query.fetch_one(&self.pool).await?,
        })
    }
}

impl Processor for PostgresProcessor {
    type Generator = PostgresGenerator;

    fn generator(&self) -> &Self::Generator {
        &self.generator
    }

    async fn execute(&mut self, sql: &str) -> Result<()> {
        if is_comment_only(sql) {
            warn!(comment = %sql, "skipping placeholder for unsupported statement");
            return Ok(());
        }
        debug!(sql = %sql, "executing");
        let result = match self.tx.as_mut() {
            Some(tx) => sqlx::query(sql).execute(&mut **tx).await,
            None => sqlx::query(sql).execute(&self.pool).await,
        };
        result.map_err(|e| execution_error(sql, e))?;
        Ok(())
    }

    async fn query_versions(&mut self, sql: &str) -> Result<Vec<i64>> {
        let query = sqlx::query_scalar::<_, i64>(sql);
        Ok(match self.tx.as_mut() {
            Some(tx) => query.fetch_all(&mut **tx).await?,
            None => query.fetch_all(&self.pool).await?,
        })
    }

    async fn table_exists(&mut self, schema: Option<&str>, table: &str) -> Result<bool> {
        self.fetch_exists(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema = COALESCE($1, current_schema()) AND table_name = $2)",
            &[schema, Some(table)],
        )
        .await
    }

    async fn column_exists(
        &mut self,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<bool> {
        self.fetch_exists(
            "SELECT EXISTS (SELECT 1 FROM information_schema.columns \
             WHERE table_schema = COALESCE($1, current_schema()) \
             AND table_name = $2 AND column_name = $3)",
            &[schema, Some(table), Some(column)],
        )
        .await
    }

    async fn index_exists(&mut self, schema: Option<&str>, index: &str) -> Result<bool> {
        self.fetch_exists(
            "SELECT EXISTS (SELECT 1 FROM pg_indexes \
             WHERE schemaname = COALESCE($1, current_schema()) AND indexname = $2)",
            &[schema, Some(index)],
        )
        .await
    }

    async fn constraint_exists(
        &mut self,
        schema: Option<&str>,
        table: &str,
        constraint: &str,
    ) -> Result<bool> {
        self.fetch_exists(
            "SELECT EXISTS (SELECT 1 FROM information_schema.table_constraints \
             WHERE constraint_schema = COALESCE($1, current_schema()) \
             AND table_name = $2 AND constraint_name = $3)",
            &[schema, Some(table), Some(constraint)],
        )
        .await
    }

    async fn sequence_exists(&mut self, schema: Option<&str>, sequence: &str) -> Result<bool> {
        self.fetch_exists(
            "SELECT EXISTS (SELECT 1 FROM information_schema.sequences \
             WHERE sequence_schema = COALESCE($1, current_schema()) AND sequence_name = $2)",
            &[schema, Some(sequence)],
        )
        .await
    }

    async fn begin(&mut self) -> Result<()> {
        if self.tx.is_none() {
            self.tx = Some(self.pool.begin().await?);
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}

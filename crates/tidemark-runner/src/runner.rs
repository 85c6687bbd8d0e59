//! The migration runner.
//!
//! Holds the registered migrations, computes the pending set against the
//! version table, and drives a [`Processor`] to apply or roll back. Preview
//! mode collects the SQL that would run instead of executing it.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use tidemark_core::expression::MigrationExpression;
use tidemark_core::generator::SqlGenerator;
use tidemark_core::Migration;

use crate::error::{MigrateError, Result};
use crate::processor::Processor;
use crate::version::VersionTable;

/// A migration captured for the runner.
///
/// Function pointers keep registration free of boxing; `register` fills
/// them in from a [`Migration`] impl.
#[derive(Debug, Clone, Copy)]
pub struct RegisteredMigration {
    /// Ordering version.
    pub version: i64,
    /// Migration name.
    pub name: &'static str,
    up: fn() -> Vec<MigrationExpression>,
    down: fn() -> Vec<MigrationExpression>,
    reversible: fn() -> bool,
}

impl RegisteredMigration {
    /// Expressions for applying the migration.
    #[must_use]
    pub fn up(&self) -> Vec<MigrationExpression> {
        (self.up)()
    }

    /// Expressions for rolling the migration back.
    #[must_use]
    pub fn down(&self) -> Vec<MigrationExpression> {
        (self.down)()
    }

    /// Whether the migration can be rolled back.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        (self.reversible)()
    }
}

/// Captures a [`Migration`] impl for registration.
#[must_use]
pub fn register<M: Migration>() -> RegisteredMigration {
    RegisteredMigration {
        version: M::VERSION,
        name: M::NAME,
        up: M::up,
        down: M::down,
        reversible: M::is_reversible,
    }
}

/// How transactions wrap a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionBehavior {
    /// One transaction per migration; a failure keeps earlier migrations.
    #[default]
    PerMigration,
    /// One transaction for the whole run; a failure undoes everything.
    PerRun,
}

/// Runner configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunnerOptions {
    /// Transaction scoping.
    pub transaction: TransactionBehavior,
    /// Collect SQL instead of executing it.
    pub preview: bool,
}

/// Status of one registered migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Migration version.
    pub version: i64,
    /// Migration name.
    pub name: &'static str,
    /// Whether the version table records it.
    pub applied: bool,
}

/// Applies and rolls back migrations through a [`Processor`].
pub struct MigrationRunner<P: Processor> {
    processor: P,
    migrations: Vec<RegisteredMigration>,
    version_table: VersionTable,
    options: RunnerOptions,
    preview_sql: Vec<String>,
}

impl<P: Processor> MigrationRunner<P> {
    /// Creates a runner with default options.
    pub fn new(processor: P) -> Self {
        Self {
            processor,
            migrations: Vec::new(),
            version_table: VersionTable::new(),
            options: RunnerOptions::default(),
            preview_sql: Vec::new(),
        }
    }

    /// Overrides the runner options.
    #[must_use]
    pub fn with_options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }

    /// Overrides where versions are recorded.
    #[must_use]
    pub fn with_version_table(mut self, table: VersionTable) -> Self {
        self.version_table = table;
        self
    }

    /// Registers a migration, rejecting duplicate versions.
    pub fn add<M: Migration>(&mut self) -> Result<&mut Self> {
        let candidate = register::<M>();
        if let Some(existing) = self
            .migrations
            .iter()
            .find(|m| m.version == candidate.version)
        {
            return Err(MigrateError::DuplicateVersion {
                version: candidate.version,
                first: existing.name.to_string(),
                second: candidate.name.to_string(),
            });
        }
        self.migrations.push(candidate);
        self.migrations.sort_by_key(|m| m.version);
        Ok(self)
    }

    /// Returns the processor, releasing the runner.
    pub fn into_processor(self) -> P {
        self.processor
    }

    /// SQL collected so far in preview mode.
    #[must_use]
    pub fn preview_sql(&self) -> &[String] {
        &self.preview_sql
    }

    /// Applies every pending migration.
    pub async fn migrate_up(&mut self) -> Result<()> {
        self.migrate_up_to(i64::MAX).await
    }

    /// Applies pending migrations with `version <= target`.
    pub async fn migrate_up_to(&mut self, target: i64) -> Result<()> {
        self.ensure_version_table().await?;
        let applied = self.applied_versions().await?;

        let pending: Vec<RegisteredMigration> = self
            .migrations
            .iter()
            .filter(|m| m.version <= target && !applied.contains(&m.version))
            .copied()
            .collect();

        if pending.is_empty() {
            info!("no pending migrations");
            return Ok(());
        }

        let per_run = self.options.transaction == TransactionBehavior::PerRun;
        if per_run {
            self.begin().await?;
        }
        for migration in pending {
            if !per_run {
                self.begin().await?;
            }
            info!(version = migration.version, name = migration.name, "applying migration");
            let result = self.apply_one(&migration).await;
            if let Err(e) = result {
                warn!(version = migration.version, "migration failed, rolling back");
                self.processor.rollback().await?;
                return Err(e);
            }
            if !per_run {
                self.commit().await?;
            }
        }
        if per_run {
            self.commit().await?;
        }
        Ok(())
    }

    /// Rolls back the last `steps` applied migrations.
    pub async fn rollback(&mut self, steps: usize) -> Result<()> {
        self.ensure_version_table().await?;
        let applied = self.applied_versions().await?;
        let targets: Vec<i64> = applied.iter().rev().take(steps).copied().collect();
        self.rollback_versions(&targets).await
    }

    /// Rolls back every applied migration with `version > target`.
    pub async fn rollback_to(&mut self, target: i64) -> Result<()> {
        self.ensure_version_table().await?;
        let applied = self.applied_versions().await?;
        let targets: Vec<i64> = applied
            .iter()
            .rev()
            .filter(|v| **v > target)
            .copied()
            .collect();
        self.rollback_versions(&targets).await
    }

    /// Reports every registered migration and whether it has run.
    pub async fn status(&mut self) -> Result<Vec<MigrationStatus>> {
        self.ensure_version_table().await?;
        let applied = self.applied_versions().await?;
        Ok(self
            .migrations
            .iter()
            .map(|m| MigrationStatus {
                version: m.version,
                name: m.name,
                applied: applied.contains(&m.version),
            })
            .collect())
    }

    async fn rollback_versions(&mut self, versions: &[i64]) -> Result<()> {
        // Validate the whole set before any transaction is opened.
        let mut targets = Vec::with_capacity(versions.len());
        for version in versions {
            let migration = *self
                .migrations
                .iter()
                .find(|m| m.version == *version)
                .ok_or(MigrateError::VersionNotFound(*version))?;
            if !migration.is_reversible() {
                return Err(MigrateError::NotReversible {
                    version: migration.version,
                    name: migration.name.to_string(),
                });
            }
            targets.push(migration);
        }

        let per_run = self.options.transaction == TransactionBehavior::PerRun;
        if per_run {
            self.begin().await?;
        }
        for migration in targets {
            if !per_run {
                self.begin().await?;
            }
            info!(version = migration.version, name = migration.name, "rolling back migration");
            let result = self.revert_one(&migration).await;
            if let Err(e) = result {
                warn!(version = migration.version, "rollback failed");
                self.processor.rollback().await?;
                return Err(e);
            }
            if !per_run {
                self.commit().await?;
            }
        }
        if per_run {
            self.commit().await?;
        }
        Ok(())
    }

    async fn apply_one(&mut self, migration: &RegisteredMigration) -> Result<()> {
        let mut statements = self.generate_all(&migration.up())?;
        statements.extend(
            self.processor
                .generator()
                .generate(&self.version_table.insert_expression(
                    migration.version,
                    migration.name,
                ))?,
        );
        for sql in statements {
            self.run_sql(&sql).await?;
        }
        Ok(())
    }

    async fn revert_one(&mut self, migration: &RegisteredMigration) -> Result<()> {
        let mut statements = self.generate_all(&migration.down())?;
        statements.extend(
            self.processor
                .generator()
                .generate(&self.version_table.delete_expression(migration.version))?,
        );
        for sql in statements {
            self.run_sql(&sql).await?;
        }
        Ok(())
    }

    fn generate_all(&self, expressions: &[MigrationExpression]) -> Result<Vec<String>> {
        let generator = self.processor.generator();
        let mut statements = Vec::new();
        for expression in expressions {
            statements.extend(generator.generate(expression)?);
        }
        Ok(statements)
    }

    async fn ensure_version_table(&mut self) -> Result<()> {
        let exists = self
            .processor
            .table_exists(self.version_table.schema(), self.version_table.name())
            .await?;
        if exists {
            return Ok(());
        }
        debug!(table = self.version_table.name(), "creating version table");
        let statements = self
            .processor
            .generator()
            .generate(&self.version_table.create_expression())?;
        for sql in statements {
            self.run_sql(&sql).await?;
        }
        Ok(())
    }

    async fn applied_versions(&mut self) -> Result<BTreeSet<i64>> {
        if self.options.preview {
            // The table may only exist in the previewed SQL.
            let exists = self
                .processor
                .table_exists(self.version_table.schema(), self.version_table.name())
                .await?;
            if !exists {
                return Ok(BTreeSet::new());
            }
        }
        let sql = self
            .version_table
            .select_versions_sql(self.processor.generator().quoter());
        Ok(self.processor.query_versions(&sql).await?.into_iter().collect())
    }

    async fn run_sql(&mut self, sql: &str) -> Result<()> {
        if self.options.preview {
            self.preview_sql.push(sql.to_string());
            return Ok(());
        }
        self.processor.execute(sql).await
    }

    async fn begin(&mut self) -> Result<()> {
        if self.options.preview {
            return Ok(());
        }
        self.processor.begin().await
    }

    async fn commit(&mut self) -> Result<()> {
        if self.options.preview {
            return Ok(());
        }
        self.processor.commit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use tidemark_core::prelude::*;

    use crate::processor::SqliteProcessor;

    struct CreateUsers;

    impl Migration for CreateUsers {
        const VERSION: i64 = 20240101120000;
        const NAME: &'static str = "create_users";

        fn up() -> Vec<MigrationExpression> {
            vec![CreateTableBuilder::new()
                .name("users")
                .column(bigint("id").primary_key().identity().build())
                .column(string("username", 255).not_null().unique().build())
                .build()
                .into()]
        }
    }

    struct AddEmail;

    impl Migration for AddEmail {
        const VERSION: i64 = 20240102090000;
        const NAME: &'static str = "add_email";

        fn up() -> Vec<MigrationExpression> {
            vec![MigrationExpression::add_column(
                "users",
                string("email", 255).build(),
            )]
        }
    }

    struct DuplicateOfCreateUsers;

    impl Migration for DuplicateOfCreateUsers {
        const VERSION: i64 = 20240101120000;
        const NAME: &'static str = "create_users_again";

        fn up() -> Vec<MigrationExpression> {
            Vec::new()
        }
    }

    struct IrreversibleCleanup;

    impl Migration for IrreversibleCleanup {
        const VERSION: i64 = 20240103080000;
        const NAME: &'static str = "cleanup";

        fn up() -> Vec<MigrationExpression> {
            vec![DeleteDataExpression::new("users").all_rows().into()]
        }
    }

    async fn create_runner() -> MigrationRunner<SqliteProcessor> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("in-memory pool");
        MigrationRunner::new(SqliteProcessor::new(pool, SqliteGenerator::new()))
    }

    #[tokio::test]
    async fn test_migrate_up_applies_and_records() {
        let mut runner = create_runner().await;
        runner.add::<CreateUsers>().unwrap();
        runner.add::<AddEmail>().unwrap();
        runner.migrate_up().await.unwrap();

        let mut processor = runner.into_processor();
        assert!(processor.table_exists(None, "users").await.unwrap());
        assert!(processor.column_exists(None, "users", "email").await.unwrap());

        let versions = processor
            .query_versions("SELECT version FROM tidemark_version_info ORDER BY version")
            .await
            .unwrap();
        assert_eq!(versions, vec![CreateUsers::VERSION, AddEmail::VERSION]);
    }

    #[tokio::test]
    async fn test_migrate_up_is_idempotent() {
        let mut runner = create_runner().await;
        runner.add::<CreateUsers>().unwrap();
        runner.migrate_up().await.unwrap();
        runner.migrate_up().await.unwrap();

        let mut processor = runner.into_processor();
        let versions = processor
            .query_versions("SELECT version FROM tidemark_version_info")
            .await
            .unwrap();
        assert_eq!(versions.len(), 1);
    }

    #[tokio::test]
    async fn test_migrate_up_to_stops_at_target() {
        let mut runner = create_runner().await;
        runner.add::<CreateUsers>().unwrap();
        runner.add::<AddEmail>().unwrap();
        runner.migrate_up_to(CreateUsers::VERSION).await.unwrap();

        let status = runner.status().await.unwrap();
        assert!(status[0].applied);
        assert!(!status[1].applied);
    }

    #[tokio::test]
    async fn test_rollback_reverses_and_unrecords() {
        let mut runner = create_runner().await;
        runner.add::<CreateUsers>().unwrap();
        runner.migrate_up().await.unwrap();
        runner.rollback(1).await.unwrap();

        let mut processor = runner.into_processor();
        assert!(!processor.table_exists(None, "users").await.unwrap());
        let versions = processor
            .query_versions("SELECT version FROM tidemark_version_info")
            .await
            .unwrap();
        assert!(versions.is_empty());
    }

    #[tokio::test]
    async fn test_rollback_to_keeps_earlier_versions() {
        let mut runner = create_runner().await;
        runner.add::<CreateUsers>().unwrap();
        runner.add::<AddEmail>().unwrap();
        runner.migrate_up().await.unwrap();
        runner.rollback_to(CreateUsers::VERSION).await.unwrap();

        let status = runner.status().await.unwrap();
        assert!(status[0].applied);
        assert!(!status[1].applied);
    }

    #[tokio::test]
    async fn test_rollback_of_irreversible_migration_errors() {
        let mut runner = create_runner().await;
        runner.add::<CreateUsers>().unwrap();
        runner.add::<IrreversibleCleanup>().unwrap();
        runner.migrate_up().await.unwrap();

        let err = runner.rollback(1).await.unwrap_err();
        assert!(matches!(err, MigrateError::NotReversible { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_version_is_rejected() {
        let mut runner = create_runner().await;
        runner.add::<CreateUsers>().unwrap();
        let err = match runner.add::<DuplicateOfCreateUsers>() {
            Ok(_) => panic!("duplicate version was accepted"),
            Err(err) => err,
        };
        assert!(matches!(err, MigrateError::DuplicateVersion { .. }));
    }

    #[tokio::test]
    async fn test_preview_collects_sql_without_executing() {
        let mut runner = create_runner().await.with_options(RunnerOptions {
            transaction: TransactionBehavior::PerMigration,
            preview: true,
        });
        runner.add::<CreateUsers>().unwrap();
        runner.migrate_up().await.unwrap();

        assert!(runner
            .preview_sql()
            .iter()
            .any(|sql| sql.contains("CREATE TABLE \"users\"")));
        assert!(runner
            .preview_sql()
            .iter()
            .any(|sql| sql.contains("INSERT INTO \"tidemark_version_info\"")));

        let mut processor = runner.into_processor();
        assert!(!processor.table_exists(None, "users").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_migration_rolls_back_its_transaction() {
        struct Broken;
        impl Migration for Broken {
            const VERSION: i64 = 20240104070000;
            const NAME: &'static str = "broken";

            fn up() -> Vec<MigrationExpression> {
                vec![
                    CreateTableBuilder::new()
                        .name("half_done")
                        .column(bigint("id").primary_key().build())
                        .build()
                        .into(),
                    MigrationExpression::Sql(SqlExpression {
                        up_sql: "THIS IS NOT SQL".to_string(),
                        down_sql: None,
                    }),
                ]
            }
        }

        let mut runner = create_runner().await;
        runner.add::<Broken>().unwrap();
        let err = runner.migrate_up().await.unwrap_err();
        assert!(matches!(err, MigrateError::Execution { .. }));

        // The transaction wraps the whole migration.
        let mut processor = runner.into_processor();
        assert!(!processor.table_exists(None, "half_done").await.unwrap());
    }
}

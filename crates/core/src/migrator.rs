//! Sequential migration execution
//!
//! The engine builds execution groups from pending migrations, drives each
//! group through the transactional template and the plugin-dispatched
//! reader/executor pair, and records every attempt in the schema history
//! ledger. Migrations run strictly one at a time, group by group, in list
//! order.

use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::callbacks::{CallbackManager, Event};
use crate::config::MigrateConfig;
use crate::database::{Database, ParsingContext};
use crate::descriptor::MigrationDescriptor;
use crate::error::{CoreError, CoreResult, MigrateFailure};
use crate::history::LedgerRecord;
use crate::plugin::{Executor, PluginRegistry, Reader};
use crate::result::MigrateResult;
use crate::state::MigrationState;
use crate::transaction::{TransactionalExecutionTemplate, TransactionalWork};

/// A batch of one or more migrations sharing one transactional boundary
#[derive(Debug, Clone)]
pub struct ExecutionGroup {
    /// Ordered, non-empty list of migrations
    pub migrations: Vec<MigrationDescriptor>,
    /// True only if every migration in the group supports running inside a
    /// transaction
    pub execute_in_transaction: bool,
}

impl ExecutionGroup {
    pub fn new(migrations: Vec<MigrationDescriptor>, execute_in_transaction: bool) -> Self {
        Self {
            migrations,
            execute_in_transaction,
        }
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

/// Sequential migration engine
pub struct SequentialMigrator {
    config: MigrateConfig,
    registry: PluginRegistry,
    callbacks: CallbackManager,
    context: ParsingContext,
}

impl SequentialMigrator {
    pub fn new(config: MigrateConfig, registry: PluginRegistry, callbacks: CallbackManager) -> Self {
        Self {
            config,
            registry,
            callbacks,
            context: ParsingContext::new(),
        }
    }

    pub fn with_context(mut self, context: ParsingContext) -> Self {
        self.context = context;
        self
    }

    pub fn config(&self) -> &MigrateConfig {
        &self.config
    }

    /// Run every pending migration among the resolved descriptors.
    ///
    /// Ledger ranks are assigned consecutively starting at `start_rank`,
    /// in execution order, with a failed attempt still consuming its rank.
    /// On failure the run stops immediately and the raised error carries
    /// the failing migration's identity and the partial result.
    pub async fn migrate(
        &self,
        database: &mut dyn Database,
        resolved: Vec<MigrationDescriptor>,
        start_rank: i32,
    ) -> CoreResult<MigrateResult> {
        // Plugin resolution must surface configuration errors before any
        // migration is attempted.
        let connection_type = database.connection_type();
        let reader = self.registry.reader_for(connection_type)?;
        let executor = self.registry.executor_for(connection_type)?;

        let pending = self.filter_pending(resolved)?;
        let groups = self.create_groups(&*database, pending);

        let mut result = MigrateResult::new();
        if groups.is_empty() {
            info!("No pending migrations to apply");
            return Ok(result);
        }

        database.ensure_history_table(&self.config.table).await?;

        let mut rank = start_rank;
        for group in &groups {
            let (next_rank, next_result) = self
                .run_group(
                    database,
                    group,
                    reader.as_ref(),
                    executor.as_ref(),
                    rank,
                    result,
                )
                .await?;
            rank = next_rank;
            result = next_result;
        }

        info!(
            "Successfully applied {} migration(s)",
            result.migrations_executed
        );
        Ok(result)
    }

    /// Decide which resolved migrations this run executes.
    ///
    /// Pending migrations always run; out-of-order ones run when allowed by
    /// configuration. Already applied migrations are dropped silently. Any
    /// other state must be allowed by an ignore pattern, otherwise the run
    /// refuses to start.
    pub fn filter_pending(
        &self,
        resolved: Vec<MigrationDescriptor>,
    ) -> CoreResult<Vec<MigrationDescriptor>> {
        let mut pending = Vec::new();
        for migration in resolved {
            match migration.state {
                MigrationState::Pending => pending.push(migration),
                MigrationState::OutOfOrder if self.config.out_of_order => pending.push(migration),
                MigrationState::Success => {}
                state => {
                    let allowed = self
                        .config
                        .ignore_migration_patterns
                        .iter()
                        .any(|pattern| pattern.matches(migration.is_versioned(), state));
                    if allowed {
                        debug!(
                            "Ignoring migration {} in state {}",
                            migration.migration_text(false),
                            state
                        );
                    } else {
                        return Err(CoreError::Validation(format!(
                            "Detected migration {} in state {} ({})",
                            migration.migration_text(false),
                            state.display_name(),
                            state.pattern()
                        )));
                    }
                }
            }
        }
        Ok(pending)
    }

    /// Every pending migration becomes its own single-element group.
    ///
    /// Transactional eligibility starts true and is downgraded only when
    /// the migration's own nature forbids transactional execution.
    pub fn create_groups(
        &self,
        database: &dyn Database,
        pending: Vec<MigrationDescriptor>,
    ) -> Vec<ExecutionGroup> {
        pending
            .into_iter()
            .map(|migration| {
                let transactional = database.supports_transactional_execution(&migration);
                ExecutionGroup::new(vec![migration], transactional)
            })
            .collect()
    }

    async fn run_group(
        &self,
        database: &mut dyn Database,
        group: &ExecutionGroup,
        reader: &dyn Reader,
        executor: &dyn Executor,
        start_rank: i32,
        result: MigrateResult,
    ) -> CoreResult<(i32, MigrateResult)> {
        let execute_in_transaction =
            self.config.execute_in_transaction && group.execute_in_transaction;

        let mut work = GroupWork {
            migrator: self,
            group,
            reader,
            executor,
            start_rank,
            result,
        };

        let outcome = if execute_in_transaction {
            debug!(
                "Executing group of {} migration(s) in a transaction",
                group.len()
            );
            TransactionalExecutionTemplate::new(true)
                .execute(database, &mut work)
                .await
        } else {
            work.run(database).await
        };

        match outcome {
            Ok(result) => Ok((start_rank + group.len() as i32, result)),
            Err(mut failure) => {
                // The failed attempt's ledger row must survive any group
                // rollback, so it is appended only after the transaction
                // has been unwound.
                if let CoreError::Migrate(migrate_failure) = &mut failure {
                    if let Some(record) = migrate_failure.failed_record.take() {
                        if let Err(append_error) = database
                            .append_history_row(&self.config.table, &record)
                            .await
                        {
                            error!(
                                "Unable to record failed migration in schema history table: {}",
                                append_error
                            );
                        }
                    }
                }
                Err(failure)
            }
        }
    }

    async fn run_one(
        &self,
        database: &mut dyn Database,
        migration: &MigrationDescriptor,
        reader: &dyn Reader,
        executor: &dyn Executor,
        installed_rank: i32,
        mut result: MigrateResult,
    ) -> CoreResult<MigrateResult> {
        let out_of_order =
            migration.state == MigrationState::OutOfOrder && self.config.out_of_order;
        let migration_text = migration.migration_text(out_of_order);

        let watch = Instant::now();
        let run = self
            .execute_migration(database, migration, reader, executor, &migration_text)
            .await;
        let execution_time_ms = watch.elapsed().as_millis() as i64;

        let installed_by = database.installed_by(&self.config);

        match run {
            Ok(()) => {
                result.migrations_executed += 1;
                let record = LedgerRecord::from_migration(
                    migration,
                    installed_rank,
                    &installed_by,
                    execution_time_ms,
                    true,
                );
                database
                    .append_history_row(&self.config.table, &record)
                    .await?;
                result.put_successful_migration(migration, execution_time_ms);
                if migration.is_versioned() {
                    if let Some(version) = &migration.version {
                        result.target_schema_version = Some(version.to_string());
                    }
                }
                Ok(result)
            }
            Err(cause) => {
                if migration.kind.is_undo() {
                    error!("Undo of migration of {} failed!", migration_text);
                } else {
                    error!(
                        "Migration of {} failed! Please restore backups and roll back database and code!",
                        migration_text
                    );
                }

                result.put_failed_migration(migration, execution_time_ms);
                let record = LedgerRecord::from_migration(
                    migration,
                    installed_rank,
                    &installed_by,
                    execution_time_ms,
                    false,
                );
                Err(CoreError::Migrate(Box::new(MigrateFailure {
                    version: migration.version.as_ref().map(|v| v.to_string()),
                    description: migration.description.clone(),
                    script: migration.script.clone(),
                    message: compose_diagnostic(migration, &cause),
                    result,
                    failed_record: Some(record),
                })))
            }
        }
    }

    async fn execute_migration(
        &self,
        database: &mut dyn Database,
        migration: &MigrationDescriptor,
        reader: &dyn Reader,
        executor: &dyn Executor,
        migration_text: &str,
    ) -> CoreResult<()> {
        if self.config.skip_executing_migrations {
            debug!("Skipping execution of migration of {}", migration_text);
            return Ok(());
        }

        debug!("Starting migration of {} ...", migration_text);
        if migration.kind.is_undo() {
            info!("Undoing migration of {}", migration_text);
        } else {
            self.callbacks
                .handle_event(Event::BeforeEachMigrate, database, &self.config, &self.context)
                .await?;
            info!("Migrating {}", migration_text);
        }

        if let Some(resource) = &migration.resource {
            let units = reader
                .read(&self.config, &*database, &self.context, resource.as_ref())
                .await?;
            for unit in &units {
                executor.execute(database, unit, &self.config).await?;
            }
            executor.finish_execution(database, &self.config).await?;
        }

        if !migration.kind.is_undo() {
            self.callbacks
                .handle_event(Event::AfterEachMigrate, database, &self.config, &self.context)
                .await?;
        }

        Ok(())
    }
}

/// Unit of work running one execution group under the template
struct GroupWork<'a> {
    migrator: &'a SequentialMigrator,
    group: &'a ExecutionGroup,
    reader: &'a dyn Reader,
    executor: &'a dyn Executor,
    start_rank: i32,
    result: MigrateResult,
}

#[async_trait]
impl TransactionalWork for GroupWork<'_> {
    type Output = MigrateResult;

    async fn run(&mut self, database: &mut dyn Database) -> CoreResult<MigrateResult> {
        let mut result = std::mem::take(&mut self.result);
        let mut rank = self.start_rank;
        for migration in &self.group.migrations {
            result = self
                .migrator
                .run_one(database, migration, self.reader, self.executor, rank, result)
                .await?;
            rank += 1;
        }
        Ok(result)
    }
}

/// Diagnostic raised for a failing migration: a title built from the script
/// file name, the script's physical location and the underlying message
fn compose_diagnostic(migration: &MigrationDescriptor, cause: &CoreError) -> String {
    let file_name = Path::new(&migration.script)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(migration.script.as_str());
    let title = format!("Script {} failed", file_name);
    let underline = "-".repeat(title.len());
    format!(
        "{}\n{}\nLocation   : {}\nMessage    : {}\n",
        title, underline, migration.physical_location, cause
    )
}

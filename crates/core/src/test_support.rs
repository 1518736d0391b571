//! Shared mocks for engine tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::MigrateConfig;
use crate::database::{ConnectionType, Database, ParsingContext};
use crate::error::{CoreError, CoreResult};
use crate::history::LedgerRecord;
use crate::plugin::{Executor, Reader};
use crate::resource::LoadableResource;

/// In-memory database recording every call it receives
pub struct MockDatabase {
    pub journal: Arc<Mutex<Vec<String>>>,
    pub ledger: Arc<Mutex<Vec<LedgerRecord>>>,
    pub autocommit: bool,
    pub fail_statements_containing: Option<String>,
    pub fail_commit: bool,
    pub fail_rollback: bool,
    /// Scripts reported as unable to run inside a transaction
    pub non_transactional_scripts: Vec<String>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self {
            journal: Arc::new(Mutex::new(Vec::new())),
            ledger: Arc::new(Mutex::new(Vec::new())),
            autocommit: true,
            fail_statements_containing: None,
            fail_commit: false,
            fail_rollback: false,
            non_transactional_scripts: Vec::new(),
        }
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }

    pub fn ledger(&self) -> Vec<LedgerRecord> {
        self.ledger.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.journal.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl Database for MockDatabase {
    fn connection_type(&self) -> ConnectionType {
        ConnectionType::Postgres
    }

    fn current_user(&self) -> &str {
        "tester"
    }

    async fn execute(&mut self, sql: &str) -> CoreResult<u64> {
        self.record(format!("execute: {}", sql));
        if let Some(fragment) = &self.fail_statements_containing {
            if sql.contains(fragment.as_str()) {
                return Err(CoreError::sql("Unable to execute statement", sql));
            }
        }
        Ok(0)
    }

    async fn autocommit(&mut self) -> CoreResult<bool> {
        Ok(self.autocommit)
    }

    async fn set_autocommit(&mut self, autocommit: bool) -> CoreResult<()> {
        self.record(format!("set_autocommit: {}", autocommit));
        self.autocommit = autocommit;
        Ok(())
    }

    async fn commit(&mut self) -> CoreResult<()> {
        self.record("commit");
        if self.fail_commit {
            return Err(CoreError::sql("commit", "forced failure"));
        }
        Ok(())
    }

    async fn rollback(&mut self) -> CoreResult<()> {
        self.record("rollback");
        if self.fail_rollback {
            return Err(CoreError::sql("rollback", "forced failure"));
        }
        Ok(())
    }

    async fn ensure_history_table(&mut self, table: &str) -> CoreResult<()> {
        self.record(format!("ensure_history_table: {}", table));
        Ok(())
    }

    async fn append_history_row(&mut self, table: &str, record: &LedgerRecord) -> CoreResult<()> {
        self.record(format!(
            "ledger: table={} rank={} success={}",
            table, record.installed_rank, record.success
        ));
        self.ledger.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn supports_transactional_execution(&self, migration: &crate::descriptor::MigrationDescriptor) -> bool {
        !self.non_transactional_scripts.contains(&migration.script)
    }
}

/// Reader splitting the resource content on semicolons
pub struct MockReader {
    accepts: ConnectionType,
}

impl MockReader {
    pub fn new(accepts: ConnectionType) -> Self {
        Self { accepts }
    }
}

#[async_trait]
impl Reader for MockReader {
    fn can_read(&self, connection_type: ConnectionType) -> bool {
        connection_type == self.accepts
    }

    async fn read(
        &self,
        _config: &MigrateConfig,
        _database: &dyn Database,
        _context: &ParsingContext,
        resource: &dyn LoadableResource,
    ) -> CoreResult<Vec<String>> {
        let content = resource.load_as_string().await?;
        Ok(content
            .split(';')
            .map(str::trim)
            .filter(|unit| !unit.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Executor submitting each unit straight to the database
pub struct MockExecutor {
    accepts: ConnectionType,
}

impl MockExecutor {
    pub fn new(accepts: ConnectionType) -> Self {
        Self { accepts }
    }
}

#[async_trait]
impl Executor for MockExecutor {
    fn can_execute(&self, connection_type: ConnectionType) -> bool {
        connection_type == self.accepts
    }

    async fn execute(
        &self,
        database: &mut dyn Database,
        execution_unit: &str,
        _config: &MigrateConfig,
    ) -> CoreResult<()> {
        database.execute(execution_unit).await?;
        Ok(())
    }

    async fn finish_execution(
        &self,
        _database: &mut dyn Database,
        _config: &MigrateConfig,
    ) -> CoreResult<()> {
        Ok(())
    }
}

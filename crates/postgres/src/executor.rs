//! Statement executor
//!
//! Submits each execution unit to the database as soon as it is produced;
//! there is nothing left to flush when execution finishes.

use async_trait::async_trait;
use tracing::debug;

use schemaflow_core::{ConnectionType, CoreResult, Database, Executor, MigrateConfig};

/// Executor for PostgreSQL statements
pub struct PostgresExecutor;

#[async_trait]
impl Executor for PostgresExecutor {
    fn can_execute(&self, connection_type: ConnectionType) -> bool {
        connection_type == ConnectionType::Postgres
    }

    async fn execute(
        &self,
        database: &mut dyn Database,
        execution_unit: &str,
        _config: &MigrateConfig,
    ) -> CoreResult<()> {
        let rows = database.execute(execution_unit).await?;
        debug!("Statement executed, {} row(s) affected", rows);
        Ok(())
    }

    async fn finish_execution(
        &self,
        _database: &mut dyn Database,
        _config: &MigrateConfig,
    ) -> CoreResult<()> {
        debug!("Finished submitting statements");
        Ok(())
    }
}

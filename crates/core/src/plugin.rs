//! Reader/Executor plugin dispatch
//!
//! Statement decomposition (Reader) and submission semantics (Executor) are
//! the only dialect-specific parts of a run. Plugins advertise which
//! connection types they accept; the registry returns the first candidate
//! whose capability predicate matches, and a missing match is a fatal
//! configuration error raised before any migration is attempted.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::MigrateConfig;
use crate::database::{ConnectionType, Database, ParsingContext};
use crate::error::{CoreError, CoreResult};
use crate::resource::LoadableResource;

/// Turns a script resource into ordered executable statement units
#[async_trait]
pub trait Reader: Send + Sync {
    /// Capability predicate for plugin dispatch
    fn can_read(&self, connection_type: ConnectionType) -> bool;

    async fn read(
        &self,
        config: &MigrateConfig,
        database: &dyn Database,
        context: &ParsingContext,
        resource: &dyn LoadableResource,
    ) -> CoreResult<Vec<String>>;
}

/// Submits execution units to the database
#[async_trait]
pub trait Executor: Send + Sync {
    /// Capability predicate for plugin dispatch
    fn can_execute(&self, connection_type: ConnectionType) -> bool;

    async fn execute(
        &self,
        database: &mut dyn Database,
        execution_unit: &str,
        config: &MigrateConfig,
    ) -> CoreResult<()>;

    /// Called once after the last unit of a migration has been submitted
    async fn finish_execution(
        &self,
        database: &mut dyn Database,
        config: &MigrateConfig,
    ) -> CoreResult<()>;
}

/// Registry of enabled Reader/Executor plugin candidates
#[derive(Default)]
pub struct PluginRegistry {
    readers: Vec<Arc<dyn Reader>>,
    executors: Vec<Arc<dyn Executor>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_reader(&mut self, reader: Arc<dyn Reader>) {
        self.readers.push(reader);
    }

    pub fn register_executor(&mut self, executor: Arc<dyn Executor>) {
        self.executors.push(executor);
    }

    /// First registered reader accepting the connection type
    pub fn reader_for(&self, connection_type: ConnectionType) -> CoreResult<Arc<dyn Reader>> {
        self.readers
            .iter()
            .find(|reader| reader.can_read(connection_type))
            .cloned()
            .ok_or_else(|| {
                CoreError::Configuration(format!(
                    "No reader found for connection type: {}",
                    connection_type
                ))
            })
    }

    /// First registered executor accepting the connection type
    pub fn executor_for(&self, connection_type: ConnectionType) -> CoreResult<Arc<dyn Executor>> {
        self.executors
            .iter()
            .find(|executor| executor.can_execute(connection_type))
            .cloned()
            .ok_or_else(|| {
                CoreError::Configuration(format!(
                    "No executor found for connection type: {}",
                    connection_type
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockExecutor, MockReader};

    #[test]
    fn test_empty_registry_is_a_configuration_error() {
        let registry = PluginRegistry::new();

        let err = registry.reader_for(ConnectionType::MySql).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Configuration error: No reader found for connection type: MySQL"
        );

        let err = registry.executor_for(ConnectionType::Sqlite).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Configuration error: No executor found for connection type: SQLite"
        );
    }

    #[test]
    fn test_dispatch_by_connection_type() {
        let mut registry = PluginRegistry::new();
        registry.register_reader(Arc::new(MockReader::new(ConnectionType::Postgres)));
        registry.register_executor(Arc::new(MockExecutor::new(ConnectionType::Postgres)));

        assert!(registry.reader_for(ConnectionType::Postgres).is_ok());
        assert!(registry.executor_for(ConnectionType::Postgres).is_ok());
        assert!(registry.reader_for(ConnectionType::SqlServer).is_err());
    }
}

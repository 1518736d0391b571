//! PostgreSQL plugin for the schemaflow migration engine
//!
//! Provides the [`PostgresDatabase`] connection, a delimiter-aware script
//! [`PostgresReader`] and a statement [`PostgresExecutor`], all dispatched
//! by the `Postgres` connection type.

pub mod database;
pub mod executor;
pub mod reader;

pub use database::PostgresDatabase;
pub use executor::PostgresExecutor;
pub use reader::PostgresReader;

use std::sync::Arc;

use schemaflow_core::PluginRegistry;

/// Install the PostgreSQL reader and executor into a plugin registry
pub fn register(registry: &mut PluginRegistry) {
    registry.register_reader(Arc::new(PostgresReader::new()));
    registry.register_executor(Arc::new(PostgresExecutor));
}

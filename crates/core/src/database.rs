//! Database connection abstraction
//!
//! The engine drives every database through this trait: the same group,
//! ledger and transaction logic runs against any dialect, and only the
//! Reader/Executor plugins selected by connection type vary.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::config::MigrateConfig;
use crate::descriptor::MigrationDescriptor;
use crate::error::CoreResult;
use crate::history::LedgerRecord;

/// Tag identifying which database dialect/driver family a connection
/// belongs to; used to dispatch Reader/Executor plugins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    Postgres,
    MySql,
    Sqlite,
    SqlServer,
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionType::Postgres => "PostgreSQL",
            ConnectionType::MySql => "MySQL",
            ConnectionType::Sqlite => "SQLite",
            ConnectionType::SqlServer => "SQL Server",
        };
        write!(f, "{}", name)
    }
}

/// Context handed to readers and callbacks; placeholder values are resolved
/// by external configuration, substitution itself happens outside the engine
#[derive(Debug, Clone, Default)]
pub struct ParsingContext {
    pub placeholders: HashMap<String, String>,
}

impl ParsingContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One live database connection, owned by a single run
#[async_trait]
pub trait Database: Send + Sync {
    fn connection_type(&self) -> ConnectionType;

    /// User the connection authenticated as
    fn current_user(&self) -> &str;

    /// Submit a single statement, returning the number of affected rows
    async fn execute(&mut self, sql: &str) -> CoreResult<u64>;

    async fn autocommit(&mut self) -> CoreResult<bool>;

    async fn set_autocommit(&mut self, autocommit: bool) -> CoreResult<()>;

    async fn commit(&mut self) -> CoreResult<()>;

    async fn rollback(&mut self) -> CoreResult<()>;

    /// Create the schema history table if it does not exist yet
    async fn ensure_history_table(&mut self, table: &str) -> CoreResult<()>;

    /// Append one row to the schema history table
    async fn append_history_row(&mut self, table: &str, record: &LedgerRecord) -> CoreResult<()>;

    /// Whether the given migration can run inside a transaction on this
    /// database (non-transactional DDL downgrades this)
    fn supports_transactional_execution(&self, _migration: &MigrationDescriptor) -> bool {
        true
    }

    /// Identity recorded in the ledger's installed_by column
    fn installed_by(&self, config: &MigrateConfig) -> String {
        config
            .installed_by
            .clone()
            .unwrap_or_else(|| self.current_user().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_type_display() {
        assert_eq!(ConnectionType::Postgres.to_string(), "PostgreSQL");
        assert_eq!(ConnectionType::SqlServer.to_string(), "SQL Server");
    }
}

//! Error types for the migration engine
//!
//! Configuration errors and migration-execution failures always reach the
//! caller; secondary cleanup failures (rollback, autocommit restore) are
//! logged where they happen and never surface as the returned error.

use thiserror::Error;

use crate::history::LedgerRecord;
use crate::result::MigrateResult;

/// Result type alias for engine operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Error types for engine operations
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid configuration input (bad pattern syntax, missing plugin, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A resolved migration was in a state the run cannot accept
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database driver failure, wrapped with the operation that failed
    #[error("{context}: {message}")]
    Sql { context: String, message: String },

    /// Callback handler failure
    #[error("Callback error: {0}")]
    Callback(String),

    /// A migration failed mid-run; carries the partial run result
    #[error("{}", .0.message)]
    Migrate(Box<MigrateFailure>),

    /// Anything that does not fit the categories above
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Wrap a driver-level failure with the operation that failed
    pub fn sql(context: impl Into<String>, error: impl std::fmt::Display) -> Self {
        CoreError::Sql {
            context: context.into(),
            message: error.to_string(),
        }
    }
}

/// Fatal migration failure carrying the identity of the failing migration,
/// a composed diagnostic, and the aggregate result accumulated so far.
#[derive(Debug)]
pub struct MigrateFailure {
    /// Version of the failing migration, if versioned
    pub version: Option<String>,
    /// Description of the failing migration
    pub description: String,
    /// Script identifier of the failing migration
    pub script: String,
    /// Composed diagnostic (script file name, location, underlying message)
    pub message: String,
    /// Aggregate result accumulated up to and including this failure
    pub result: MigrateResult,
    /// Failed ledger row still to be persisted, written by the engine once
    /// any enclosing transaction has been rolled back
    pub failed_record: Option<LedgerRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_error_display() {
        let err = CoreError::sql("Unable to commit transaction", "connection reset");
        assert_eq!(
            err.to_string(),
            "Unable to commit transaction: connection reset"
        );
    }

    #[test]
    fn test_configuration_error_display() {
        let err = CoreError::Configuration("No reader found for connection type: MySQL".to_string());
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}

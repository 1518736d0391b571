//! Engine configuration

use crate::pattern::ValidatePattern;

/// Configuration consumed by the migration engine
#[derive(Debug, Clone)]
pub struct MigrateConfig {
    /// Wrap eligible execution groups in a transaction
    pub execute_in_transaction: bool,
    /// Allow pending versioned migrations below the highest applied version
    pub out_of_order: bool,
    /// Record migrations in the ledger without submitting any statements
    pub skip_executing_migrations: bool,
    /// Name of the schema history table
    pub table: String,
    /// Identity recorded in the ledger; defaults to the database user
    pub installed_by: Option<String>,
    /// Patterns allowing specific type/state combinations through validation
    pub ignore_migration_patterns: Vec<ValidatePattern>,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            execute_in_transaction: true,
            out_of_order: false,
            skip_executing_migrations: false,
            table: "schema_history".to_string(),
            installed_by: None,
            ignore_migration_patterns: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = MigrateConfig::default();
        assert!(config.execute_in_transaction);
        assert!(!config.out_of_order);
        assert!(!config.skip_executing_migrations);
        assert_eq!(config.table, "schema_history");
        assert!(config.installed_by.is_none());
        assert!(config.ignore_migration_patterns.is_empty());
    }
}

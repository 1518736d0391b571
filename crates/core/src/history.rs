//! Schema history ledger records
//!
//! The ledger is append-only: the engine writes exactly one row per
//! migration attempt, success or failure, and never mutates or deletes a
//! row once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::descriptor::MigrationDescriptor;

/// One row of the schema history table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Unique, strictly increasing primary key; a failed attempt still
    /// consumes its rank
    pub installed_rank: i32,
    pub version: Option<String>,
    pub description: String,
    pub migration_type: String,
    pub script: String,
    pub checksum: Option<i32>,
    pub installed_by: String,
    /// None lets the database default the timestamp to now
    pub installed_on: Option<DateTime<Utc>>,
    pub execution_time_ms: i64,
    pub success: bool,
}

impl LedgerRecord {
    /// Build the ledger row for one migration attempt
    pub fn from_migration(
        migration: &MigrationDescriptor,
        installed_rank: i32,
        installed_by: &str,
        execution_time_ms: i64,
        success: bool,
    ) -> Self {
        Self {
            installed_rank,
            version: migration.version.as_ref().map(|v| v.to_string()),
            description: migration.description.clone(),
            migration_type: migration.kind.label().to_string(),
            script: migration.script.clone(),
            checksum: migration.checksum,
            installed_by: installed_by.to_string(),
            installed_on: None,
            execution_time_ms,
            success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MigrationDescriptor;
    use crate::version::MigrationVersion;

    #[test]
    fn test_from_migration() {
        let migration = MigrationDescriptor::versioned(
            MigrationVersion::parse("4.1").unwrap(),
            "add orders",
            "V4_1__add_orders.sql",
        )
        .with_checksum(-1089432);

        let record = LedgerRecord::from_migration(&migration, 7, "deployer", 153, true);
        assert_eq!(record.installed_rank, 7);
        assert_eq!(record.version.as_deref(), Some("4.1"));
        assert_eq!(record.description, "add orders");
        assert_eq!(record.migration_type, "VERSIONED");
        assert_eq!(record.script, "V4_1__add_orders.sql");
        assert_eq!(record.checksum, Some(-1089432));
        assert_eq!(record.installed_by, "deployer");
        assert!(record.installed_on.is_none());
        assert_eq!(record.execution_time_ms, 153);
        assert!(record.success);
    }
}

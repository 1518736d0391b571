//! Run result aggregation
//!
//! A `MigrateResult` is owned and mutated by exactly one run. It moves
//! through the call chain by value and, when a migration fails, travels
//! inside the raised error so the caller still sees what was applied.

use serde::{Deserialize, Serialize};

use crate::descriptor::MigrationDescriptor;

/// Outcome entry for a single migration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrateOutput {
    pub version: Option<String>,
    pub description: String,
    pub kind: String,
    pub filepath: String,
    pub execution_time_ms: i64,
}

impl MigrateOutput {
    pub fn from_migration(migration: &MigrationDescriptor, execution_time_ms: i64) -> Self {
        Self {
            version: migration.version.as_ref().map(|v| v.to_string()),
            description: migration.description.clone(),
            kind: migration.kind.label().to_string(),
            filepath: migration.physical_location.clone(),
            execution_time_ms,
        }
    }
}

/// Aggregate result of one migration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrateResult {
    /// Number of migrations executed by this run
    pub migrations_executed: usize,
    pub successful_migrations: Vec<MigrateOutput>,
    pub failed_migrations: Vec<MigrateOutput>,
    /// False as soon as any migration fails
    pub success: bool,
    /// Highest applied versioned target
    pub target_schema_version: Option<String>,
}

impl MigrateResult {
    pub fn new() -> Self {
        Self {
            migrations_executed: 0,
            successful_migrations: Vec::new(),
            failed_migrations: Vec::new(),
            success: true,
            target_schema_version: None,
        }
    }

    pub fn put_successful_migration(
        &mut self,
        migration: &MigrationDescriptor,
        execution_time_ms: i64,
    ) {
        self.successful_migrations
            .push(MigrateOutput::from_migration(migration, execution_time_ms));
    }

    pub fn put_failed_migration(
        &mut self,
        migration: &MigrationDescriptor,
        execution_time_ms: i64,
    ) {
        self.failed_migrations
            .push(MigrateOutput::from_migration(migration, execution_time_ms));
        self.success = false;
    }
}

/// A fresh result starts successful
impl Default for MigrateResult {
    fn default() -> Self {
        Self::new()
    }
}

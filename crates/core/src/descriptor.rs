//! Migration descriptors
//!
//! A descriptor is the engine's read-only view of one resolved migration:
//! identity, script location, checksum and plan-time state. Descriptors are
//! produced by an external resolver and never mutated by the engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::resource::LoadableResource;
use crate::state::MigrationState;
use crate::version::MigrationVersion;

/// Kind of a migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MigrationKind {
    /// One-time, strictly ordered schema change identified by a version
    Versioned,
    /// Re-applied whenever its checksum changes; unordered relative to
    /// versioned migrations
    Repeatable,
    /// Reverts a previously applied versioned migration
    Undo,
}

impl MigrationKind {
    pub fn is_undo(&self) -> bool {
        matches!(self, MigrationKind::Undo)
    }

    /// Undo migrations count as versioned: they target a version
    pub fn is_versioned(&self) -> bool {
        matches!(self, MigrationKind::Versioned | MigrationKind::Undo)
    }

    /// Label recorded in the ledger's type column
    pub fn label(&self) -> &'static str {
        match self {
            MigrationKind::Versioned => "VERSIONED",
            MigrationKind::Repeatable => "REPEATABLE",
            MigrationKind::Undo => "UNDO",
        }
    }
}

/// One resolved migration, immutable once produced by the resolver
#[derive(Debug, Clone)]
pub struct MigrationDescriptor {
    /// Version, present only for versioned and undo migrations
    pub version: Option<MigrationVersion>,
    pub description: String,
    pub kind: MigrationKind,
    /// Checksum of the script content, if one was computed
    pub checksum: Option<i32>,
    /// Script identifier, e.g. "V1__create_users.sql"
    pub script: String,
    /// Physical location of the script, used in diagnostics
    pub physical_location: String,
    /// State resolved against the ledger, authoritative at plan time
    pub state: MigrationState,
    /// Handle to the loadable script content, absent for bookkeeping-only
    /// descriptors
    pub resource: Option<Arc<dyn LoadableResource>>,
}

impl MigrationDescriptor {
    pub fn versioned(
        version: MigrationVersion,
        description: impl Into<String>,
        script: impl Into<String>,
    ) -> Self {
        let script = script.into();
        Self {
            version: Some(version),
            description: description.into(),
            kind: MigrationKind::Versioned,
            checksum: None,
            physical_location: script.clone(),
            script,
            state: MigrationState::Pending,
            resource: None,
        }
    }

    pub fn repeatable(description: impl Into<String>, script: impl Into<String>) -> Self {
        let script = script.into();
        Self {
            version: None,
            description: description.into(),
            kind: MigrationKind::Repeatable,
            checksum: None,
            physical_location: script.clone(),
            script,
            state: MigrationState::Pending,
            resource: None,
        }
    }

    pub fn with_kind(mut self, kind: MigrationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_checksum(mut self, checksum: i32) -> Self {
        self.checksum = Some(checksum);
        self
    }

    pub fn with_state(mut self, state: MigrationState) -> Self {
        self.state = state;
        self
    }

    pub fn with_physical_location(mut self, location: impl Into<String>) -> Self {
        self.physical_location = location.into();
        self
    }

    pub fn with_resource(mut self, resource: Arc<dyn LoadableResource>) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn is_versioned(&self) -> bool {
        self.kind.is_versioned()
    }

    /// Human-readable label used in logs and error messages
    pub fn migration_text(&self, out_of_order: bool) -> String {
        let suffix = if out_of_order { " [out of order]" } else { "" };
        match &self.version {
            Some(version) => format!("version {} - {}{}", version, self.description, suffix),
            None => format!("repeatable migration {}{}", self.description, suffix),
        }
    }
}

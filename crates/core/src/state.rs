//! Migration state taxonomy
//!
//! States are resolved externally by comparing resolved against applied
//! migrations; the engine treats a descriptor's state as authoritative at
//! plan time and never recomputes it mid-run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// State of a resolved migration relative to the schema history ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MigrationState {
    /// Not yet applied, next in order
    Pending,
    /// Pending versioned migration below the highest applied version
    OutOfOrder,
    /// Resolved but excluded from this run
    Ignored,
    /// Applied successfully but no longer resolved
    MissingSuccess,
    /// Applied successfully with a version above the highest resolved one
    FutureSuccess,
    /// Applied successfully
    Success,
    /// Applied and failed
    Failed,
}

impl MigrationState {
    /// Human-readable name used in logs and error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            MigrationState::Pending => "Pending",
            MigrationState::OutOfOrder => "Out of Order",
            MigrationState::Ignored => "Ignored",
            MigrationState::MissingSuccess => "Missing",
            MigrationState::FutureSuccess => "Future",
            MigrationState::Success => "Success",
            MigrationState::Failed => "Failed",
        }
    }

    /// External label matched by the `<type>:<state>` pattern mini-language
    pub fn pattern(&self) -> &'static str {
        match self {
            MigrationState::Pending => "pending",
            MigrationState::OutOfOrder => "out_of_order",
            MigrationState::Ignored => "ignored",
            MigrationState::MissingSuccess => "missing_success",
            MigrationState::FutureSuccess => "future_success",
            MigrationState::Success => "success",
            MigrationState::Failed => "failed",
        }
    }

    /// Whether the migration has been applied successfully in some form
    pub fn is_applied(&self) -> bool {
        matches!(
            self,
            MigrationState::Success | MigrationState::MissingSuccess | MigrationState::FutureSuccess
        )
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

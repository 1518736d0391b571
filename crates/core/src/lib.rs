//! # schemaflow-core: Sequential Schema Migration Engine
//!
//! Incrementally evolves a relational schema by applying versioned and
//! repeatable change scripts in a deterministic order, recording every
//! attempt in a durable, append-only schema history ledger.
//!
//! The engine stays agnostic to the underlying database: one [`Database`]
//! connection drives the run, while statement decomposition and submission
//! are delegated to [`Reader`]/[`Executor`] plugins selected by connection
//! type. Script discovery, dialect DDL rendering, checksum computation and
//! state reconciliation are external collaborators consumed through the
//! narrow interfaces in this crate.

pub mod callbacks;
pub mod config;
pub mod database;
pub mod delimiter;
pub mod descriptor;
pub mod error;
pub mod history;
pub mod migrator;
pub mod pattern;
pub mod plugin;
pub mod resource;
pub mod result;
pub mod state;
pub mod transaction;
pub mod version;

#[cfg(test)]
mod test_support;

// Re-export core traits and types
pub use callbacks::*;
pub use config::*;
pub use database::*;
pub use delimiter::*;
pub use descriptor::*;
pub use error::*;
pub use history::*;
pub use migrator::*;
pub use pattern::*;
pub use plugin::*;
pub use resource::*;
pub use result::*;
pub use state::*;
pub use transaction::*;
pub use version::*;

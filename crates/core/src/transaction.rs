//! Transactional execution template
//!
//! Generic begin/commit/rollback discipline around a unit of work on a
//! connection. The template is the single mandatory path for every
//! transactional mutation in the engine; no other code touches the
//! connection's autocommit flag.

use async_trait::async_trait;
use tracing::{debug, error};

use crate::database::Database;
use crate::error::{CoreError, CoreResult};

/// A unit of work executed under the template's transaction discipline.
///
/// Implementations own whatever state the work needs to thread through, so
/// results propagate by returning rather than by shared mutation.
#[async_trait]
pub trait TransactionalWork: Send {
    type Output: Send;

    async fn run(&mut self, database: &mut dyn Database) -> CoreResult<Self::Output>;
}

/// Template for executing a unit of work inside a transaction
pub struct TransactionalExecutionTemplate {
    /// Whether to roll back the transaction when the work fails. When
    /// false, the template commits instead, preserving partial
    /// non-transactional side effects such as already committed DDL.
    rollback_on_exception: bool,
}

impl TransactionalExecutionTemplate {
    pub fn new(rollback_on_exception: bool) -> Self {
        Self {
            rollback_on_exception,
        }
    }

    /// Execute the work within a transaction.
    ///
    /// The connection's autocommit setting is captured first and restored
    /// on every exit path; a failure to restore is logged and never raised,
    /// so it cannot mask the primary outcome.
    pub async fn execute<W>(
        &self,
        database: &mut dyn Database,
        work: &mut W,
    ) -> CoreResult<W::Output>
    where
        W: TransactionalWork + ?Sized,
    {
        let mut old_autocommit = true;
        let attempt = attempt(database, work, &mut old_autocommit).await;

        let outcome = match attempt {
            Ok(value) => Ok(value),
            Err(error) => {
                if self.rollback_on_exception {
                    debug!("Rolling back transaction...");
                    match database.rollback().await {
                        Ok(()) => debug!("Transaction rolled back"),
                        Err(rollback_error) => {
                            error!("Unable to rollback transaction: {}", rollback_error)
                        }
                    }
                } else if let Err(commit_error) = database.commit().await {
                    error!("Unable to commit transaction: {}", commit_error);
                }
                Err(error)
            }
        };

        if let Err(restore_error) = database.set_autocommit(old_autocommit).await {
            error!(
                "Unable to restore autocommit to original value for connection: {}",
                restore_error
            );
        }

        outcome
    }
}

async fn attempt<W>(
    database: &mut dyn Database,
    work: &mut W,
    old_autocommit: &mut bool,
) -> CoreResult<W::Output>
where
    W: TransactionalWork + ?Sized,
{
    *old_autocommit = database.autocommit().await?;
    database.set_autocommit(false).await?;
    let value = work.run(database).await?;
    database
        .commit()
        .await
        .map_err(|e| CoreError::sql("Unable to commit transaction", e))?;
    Ok(value)
}

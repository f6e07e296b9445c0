//! Statement execution against caller-supplied connections
//!
//! Binds parameters per dialect convention, runs the assembled statement as
//! a single non-query command, and returns the engine-reported affected-row
//! count unmodified. No retry; engine failures propagate unchanged with
//! entity/operation context attached.

use std::fmt;

use async_trait::async_trait;
use log::debug;
use tokio::sync::oneshot;
use tokio::time::{timeout, Duration};

use crate::dialect::EngineKind;
use crate::sql_generator::{BatchStatement, BoundParam};

mod errors;

pub use errors::{EngineError, ExecuteError};

pub type Result<T> = std::result::Result<T, ExecuteError>;

/// Statement direction, carried as error and log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    Update,
    Delete,
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchOperation::Update => write!(f, "update"),
            BatchOperation::Delete => write!(f, "delete"),
        }
    }
}

/// An open connection/session handle owned by the collaborating ORM runtime.
/// Implementations bind the given parameters (by name or position per their
/// engine's convention) and execute the text as one non-query command.
#[async_trait]
pub trait BatchConnection: Send + Sync {
    fn engine(&self) -> EngineKind;

    async fn execute(
        &self,
        sql: &str,
        params: &[BoundParam],
    ) -> std::result::Result<u64, EngineError>;
}

/// Run one assembled statement and return the affected-row count.
pub async fn execute_statement(
    conn: &dyn BatchConnection,
    statement: &BatchStatement,
    entity: &str,
    operation: BatchOperation,
) -> Result<u64> {
    debug!(
        "executing batch {} on '{}' ({} params): {}",
        operation,
        entity,
        statement.params.len(),
        statement.sql
    );
    let affected = conn
        .execute(&statement.sql, &statement.params)
        .await
        .map_err(|source| ExecuteError::BatchExecution {
            entity: entity.to_string(),
            operation,
            source,
        })?;
    debug!("batch {} on '{}' affected {} rows", operation, entity, affected);
    Ok(affected)
}

/// Like [`execute_statement`], aborting with [`ExecuteError::Cancelled`]
/// when the cancel signal fires. Dropping the sender without signalling
/// disarms cancellation and lets the statement run to completion.
pub async fn execute_cancellable(
    conn: &dyn BatchConnection,
    statement: &BatchStatement,
    entity: &str,
    operation: BatchOperation,
    mut cancel: oneshot::Receiver<()>,
) -> Result<u64> {
    let run = execute_statement(conn, statement, entity, operation);
    tokio::pin!(run);
    let mut armed = true;
    loop {
        tokio::select! {
            signal = &mut cancel, if armed => {
                match signal {
                    Ok(()) => {
                        return Err(ExecuteError::Cancelled {
                            entity: entity.to_string(),
                            operation,
                        });
                    }
                    // Sender dropped: no cancellation can arrive anymore.
                    Err(_) => armed = false,
                }
            }
            result = &mut run => return result,
        }
    }
}

/// Like [`execute_statement`] with a deadline; an elapsed timeout surfaces
/// as [`ExecuteError::Cancelled`].
pub async fn execute_with_timeout(
    conn: &dyn BatchConnection,
    statement: &BatchStatement,
    entity: &str,
    operation: BatchOperation,
    limit: Duration,
) -> Result<u64> {
    match timeout(limit, execute_statement(conn, statement, entity, operation)).await {
        Ok(result) => result,
        Err(_) => Err(ExecuteError::Cancelled {
            entity: entity.to_string(),
            operation,
        }),
    }
}

// ABOUTME: Transaction management with an RAII guard and bounded retry of conflicting writes
// ABOUTME: Retries optimistic-version conflicts and locked-database errors with exponential backoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Transaction management
//!
//! - `TransactionGuard`: wraps a `SQLx` transaction and rolls back on drop
//!   unless committed
//! - `retry_on_conflict`: re-runs a read-plan-write closure with fresh state
//!   when the write lost an optimistic version race
//!
//! ```text
//! retry_on_conflict(|| async {
//!     let row = store.landmark(user_id, muscle).await?;
//!     store.update_landmark(user_id, muscle, &update, row.version).await
//! }, &config.concurrency).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use sqlx::{Database, Transaction};
use stimulus_core::{AppError, AppResult, ErrorCode};
use stimulus_intelligence::config::ConcurrencyConfig;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Run `f` until it succeeds, fails permanently, or the attempt budget is spent
///
/// Optimistic version conflicts and locked-database errors are retried after
/// `base_backoff_ms * 2^(attempt - 1)`. Every other error is returned
/// immediately. After `max_update_attempts` the last conflict is returned
/// unchanged, so the caller still sees a retryable error.
///
/// # Errors
///
/// Returns the last error of `f`
pub async fn retry_on_conflict<F, Fut, T>(mut f: F, policy: &ConcurrencyConfig) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let max_attempts = policy.max_update_attempts.max(1);
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if !is_transient(&e) {
                    return Err(e);
                }
                if attempts >= max_attempts {
                    error!(
                        attempts = attempts,
                        max_attempts = max_attempts,
                        error = %e,
                        "write still conflicting after max attempts"
                    );
                    return Err(e);
                }
                let backoff_ms = policy
                    .base_backoff_ms
                    .saturating_mul(1_u64.checked_shl(attempts - 1).unwrap_or(u64::MAX));
                warn!(
                    attempt = attempts,
                    max_attempts = max_attempts,
                    backoff_ms = backoff_ms,
                    error = %e,
                    "write conflicted, retrying with fresh state"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// Whether an error may disappear when the operation is re-run
fn is_transient(error: &AppError) -> bool {
    if error.is_retryable() {
        return true;
    }
    if error.code != ErrorCode::DatabaseError {
        return false;
    }
    let message = error.message.to_lowercase();
    message.contains("database is locked") || message.contains("busy")
}

/// RAII guard for database transactions
///
/// Dropping the guard without `commit()` rolls the transaction back.
pub struct TransactionGuard<'c, DB: Database> {
    transaction: Option<Transaction<'c, DB>>,
    committed: bool,
}

impl<'c, DB: Database> TransactionGuard<'c, DB> {
    /// Wrap a transaction obtained from `pool.begin().await`
    #[must_use]
    pub fn new(transaction: Transaction<'c, DB>) -> Self {
        debug!("transaction guard created");
        Self {
            transaction: Some(transaction),
            committed: false,
        }
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails or the transaction was already consumed
    pub async fn commit(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.commit()
                    .await
                    .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;
                self.committed = true;
                debug!("transaction committed");
                Ok(())
            }
            None => Err(AppError::internal(
                "Transaction already consumed - cannot commit",
            )),
        }
    }

    /// Roll the transaction back and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails or the transaction was already consumed
    pub async fn rollback(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.rollback()
                    .await
                    .map_err(|e| AppError::database(format!("Transaction rollback failed: {e}")))?;
                debug!("transaction rolled back");
                Ok(())
            }
            None => Err(AppError::internal(
                "Transaction already consumed - cannot rollback",
            )),
        }
    }

    /// Connection to run queries on inside the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already committed or rolled back
    pub fn executor(&mut self) -> AppResult<&mut <DB as Database>::Connection> {
        self.transaction.as_deref_mut().ok_or_else(|| {
            AppError::internal("Transaction already consumed - guard used after commit/rollback")
        })
    }
}

impl<DB: Database> Drop for TransactionGuard<'_, DB> {
    fn drop(&mut self) {
        if self.transaction.is_some() && !self.committed {
            warn!("transaction guard dropped without commit - rolling back");
        }
    }
}

/// `SQLite` transaction guard
pub type SqliteTransactionGuard<'c> = TransactionGuard<'c, sqlx::Sqlite>;

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast_policy(max_update_attempts: u32) -> ConcurrencyConfig {
        ConcurrencyConfig {
            max_update_attempts,
            base_backoff_ms: 1,
        }
    }

    #[tokio::test]
    async fn test_conflict_is_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_on_conflict(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(AppError::conflict("landmark chest", 1, 2))
                } else {
                    Ok(7)
                }
            },
            &fast_policy(3),
        )
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_budget_surfaces_retryable_conflict() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = retry_on_conflict(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::conflict("state", 3, 4))
            },
            &fast_policy(3),
        )
        .await;
        let error = result.unwrap_err();
        assert!(error.is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_configuration_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = retry_on_conflict(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::config("bad constraints"))
            },
            &fast_policy(5),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_locked_database_is_transient() {
        assert!(is_transient(&AppError::database("database is locked")));
        assert!(!is_transient(&AppError::database("UNIQUE constraint failed")));
    }
}

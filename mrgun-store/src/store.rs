//! `LedgerStore` and the `with_tx` contract (§4.1, §9 "ORM session objects
//! crossing layers -> WithTx(fn)"). Every data-mutating call in this crate
//! takes `&mut Transaction<'_, Postgres>` explicitly; only the caller that
//! opened the transaction (via [`LedgerStore::with_tx`]) ever commits or
//! rolls it back.

use std::future::Future;

use sqlx::{PgPool, Postgres, Transaction};

use crate::error::StoreError;

#[derive(Clone)]
pub struct LedgerStore {
    pool: PgPool,
}

impl LedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Opens one transaction, runs `work`, and commits on `Ok` or rolls back
    /// on `Err`. Nested logical units of work should take a transaction
    /// handle as a parameter rather than calling this again (there is no
    /// single writer nesting `with_tx` within this codebase; every service
    /// entry point owns exactly one transaction for its whole request).
    ///
    /// Generic over the error type so a caller whose unit of work mixes
    /// store errors with its own closed rule-failure enum (C3's
    /// `EngineError`, for instance) can return that enum directly via `?`,
    /// as long as it implements `From<StoreError>`.
    pub async fn with_tx<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: for<'c> FnOnce(
            &'c mut Transaction<'_, Postgres>,
        ) -> std::pin::Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>,
    {
        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;
        match work(&mut tx).await {
            Ok(value) => {
                tx.commit().await.map_err(StoreError::from)?;
                Ok(value)
            }
            Err(err) => {
                // best-effort: the transaction drops and auto-rolls-back
                // even if this explicit rollback fails.
                let _ = tx.rollback().await;
                Err(err)
            }
        }
    }
}

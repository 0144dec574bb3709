//! Store-level failures. These are translated to [`mrgun_api::ApiErrorKind`]
//! at the handler boundary; this crate never depends on `mrgun-api` so the
//! ledger store stays usable from anything (engine, back-office, tests)
//! without dragging in axum.

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("operator not found")]
    OperatorNotFound,
    #[error("application not found")]
    AppNotFound,
    #[error("site not found")]
    SiteNotFound,
    #[error("usage record session_id already exists")]
    SessionConflict,
    #[error("no usage record for that session_id")]
    SessionNotFound,
    #[error("refund not found")]
    RefundNotFound,
    #[error("invoice not found")]
    InvoiceNotFound,
    #[error("application request not found")]
    ApplicationRequestNotFound,
    #[error("recharge order not found")]
    RechargeOrderNotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// `true` for the class of failures C4's retry loop should transparently
    /// retry (§4.4's deadlock / serialisation-failure row in the failure
    /// table). Postgres reports these as SQLSTATE 40001 (serialization
    /// failure) and 40P01 (deadlock detected).
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::Database(db_err)) => {
                matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
            }
            _ => false,
        }
    }

    /// `true` when a unique-constraint violation fired on `session_id`
    /// specifically, vs. some unrelated constraint.
    pub fn is_session_id_collision(&self) -> bool {
        matches!(self, StoreError::SessionConflict)
            || matches!(
                self,
                StoreError::Database(sqlx::Error::Database(db_err))
                    if db_err.code().as_deref() == Some("23505")
                        && db_err.constraint() == Some("usage_records_session_id_key")
            )
    }
}

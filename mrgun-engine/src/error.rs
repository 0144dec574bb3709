//! The closed rule-failure taxonomy C3/C4/session-upload can return (§7).
//! Kept independent of `mrgun-api` so the engine (and its property tests)
//! never need axum in scope; `mrgun-server` maps each variant onto
//! `ApiErrorKind` at the handler boundary.

use mrgun_common::Money;
use mrgun_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("operator not found")]
    OperatorNotFound,
    #[error("operator account is locked or inactive")]
    AccountLocked,
    #[error("unknown app_code")]
    AppNotFound,
    #[error("application not granted to this operator")]
    AppNotAuthorised,
    #[error("unknown site_id")]
    SiteNotFound,
    #[error("site belongs to another operator")]
    SiteNotOwned,
    #[error("player_count outside the application's allowed range")]
    InvalidPlayerCount,
    #[error("balance {current_balance} is less than required {required}")]
    InsufficientBalance { current_balance: Money, required: Money },
    #[error("no usage record for that session_id")]
    SessionNotFound,
    #[error("session belongs to a different operator")]
    SessionAccessDenied,
    #[error("internal error: {0}")]
    Internal(String),
    /// A database deadlock, serialisation failure, or `session_id` collision
    /// (§4.4's failure table) -- the caller's retry loop should attempt the
    /// whole transaction again rather than surface this to the client.
    #[error("transient failure: {0}")]
    Retryable(String),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OperatorNotFound => EngineError::OperatorNotFound,
            StoreError::AppNotFound => EngineError::AppNotFound,
            StoreError::SiteNotFound => EngineError::SiteNotFound,
            StoreError::SessionNotFound => EngineError::SessionNotFound,
            StoreError::SessionConflict => EngineError::Retryable("session_id collision".into()),
            other if other.is_retryable() => EngineError::Retryable(other.to_string()),
            other => EngineError::Internal(other.to_string()),
        }
    }
}

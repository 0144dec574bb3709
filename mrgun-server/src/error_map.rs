//! Maps each service crate's closed error enum onto [`ApiErrorKind`] (§7).
//! This is the one place those mappings live; every handler goes through
//! these functions instead of hand-rolling its own `match`.

use mrgun_api::{ApiError, ApiErrorKind};
use mrgun_auth::{PasswordError, TokenError};
use mrgun_backoffice::BackofficeError;
use mrgun_engine::EngineError;

pub fn engine_error(err: EngineError) -> ApiError {
    match err {
        EngineError::OperatorNotFound => {
            ApiError::new(ApiErrorKind::OperatorNotFound, err.to_string())
        }
        EngineError::AccountLocked => ApiError::new(ApiErrorKind::AccountLocked, err.to_string()),
        EngineError::AppNotFound => ApiError::new(ApiErrorKind::AppNotFound, err.to_string()),
        EngineError::AppNotAuthorised => {
            ApiError::new(ApiErrorKind::AppNotAuthorised, err.to_string())
        }
        EngineError::SiteNotFound => ApiError::new(ApiErrorKind::SiteNotFound, err.to_string()),
        EngineError::SiteNotOwned => ApiError::new(ApiErrorKind::SiteNotOwned, err.to_string()),
        EngineError::InvalidPlayerCount => ApiError::invalid_player_count(),
        EngineError::InsufficientBalance { current_balance, required } => {
            ApiError::insufficient_balance(&current_balance.to_string(), &required.to_string())
        }
        EngineError::SessionNotFound => {
            ApiError::new(ApiErrorKind::SessionNotFound, err.to_string())
        }
        EngineError::SessionAccessDenied => {
            ApiError::new(ApiErrorKind::SessionAccessDenied, err.to_string())
        }
        EngineError::Internal(_) | EngineError::Retryable(_) => ApiError::internal(),
    }
}

pub fn backoffice_error(err: BackofficeError) -> ApiError {
    match err {
        BackofficeError::OperatorNotFound => {
            ApiError::new(ApiErrorKind::OperatorNotFound, err.to_string())
        }
        BackofficeError::RefundNotFound
        | BackofficeError::InvoiceNotFound
        | BackofficeError::ApplicationRequestNotFound
        | BackofficeError::RechargeOrderNotFound => {
            ApiError::new(ApiErrorKind::NotFound, err.to_string())
        }
        BackofficeError::InvalidState => ApiError::new(ApiErrorKind::InvalidState, err.to_string()),
        BackofficeError::InsufficientBalance => {
            ApiError::new(ApiErrorKind::InsufficientBalance, err.to_string())
        }
        BackofficeError::Internal(_) => ApiError::internal(),
    }
}

pub fn token_error(err: TokenError) -> ApiError {
    match err {
        TokenError::InvalidToken => ApiError::new(ApiErrorKind::InvalidToken, err.to_string()),
        TokenError::InvalidTokenType => {
            ApiError::new(ApiErrorKind::InvalidTokenType, err.to_string())
        }
    }
}

/// Bad credentials and hashing failures both surface as `InvalidRequest`
/// with a generic message (§7 "Token failures never leak which of
/// signature / expiry / subject failed"); a login endpoint applies the same
/// principle to username/password.
pub fn password_error(_err: PasswordError) -> ApiError {
    ApiError::new(ApiErrorKind::InvalidRequest, "invalid username or password")
}

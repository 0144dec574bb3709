//! Bearer-token axum extractors for the three session kinds (§4.2, §6).
//!
//! Grounded on `mrgun_api::extract::Json`'s shape (a newtype `FromRequestParts`
//! that reports failures through our own [`ApiError`] instead of axum's raw
//! rejections) and on `lexe-api::auth`'s scoped-bearer-token extractor
//! pattern, adapted from that crate's client-signed tokens to this service's
//! server-minted HMAC ones.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use mrgun_api::{ApiError, ApiErrorKind};
use mrgun_auth::{Claims, ExpectedTokenType, TokenError, TokenService};
use mrgun_common::ids::{AdminId, OperatorId};

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::new(ApiErrorKind::InvalidToken, "missing bearer token"))
}

fn map_token_error(err: TokenError) -> ApiError {
    match err {
        TokenError::InvalidToken => ApiError::new(ApiErrorKind::InvalidToken, err.to_string()),
        TokenError::InvalidTokenType => {
            ApiError::new(ApiErrorKind::InvalidTokenType, err.to_string())
        }
    }
}

/// An authenticated operator session (§4.2 "Operator session").
pub struct OperatorAuth {
    pub operator_id: OperatorId,
}

#[async_trait]
impl<S> FromRequestParts<S> for OperatorAuth
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenService::from_ref(state);
        let token = bearer_token(parts)?;
        let claims = tokens
            .verify(token, ExpectedTokenType::Operator)
            .map_err(map_token_error)?;
        parse_operator_subject(&claims)
    }
}

/// An authenticated admin-or-finance session; the handler checks the
/// fine-grained [`mrgun_common::role::Capability`] itself via `claims.role`.
pub struct AdminAuth {
    pub admin_id: AdminId,
    pub claims: Claims,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenService::from_ref(state);
        let token = bearer_token(parts)?;
        let claims = tokens
            .verify(token, ExpectedTokenType::AdminOrFinance)
            .map_err(map_token_error)?;
        let admin_id = claims
            .sub
            .parse::<uuid::Uuid>()
            .map(AdminId::new)
            .map_err(|_| ApiError::new(ApiErrorKind::InvalidToken, "malformed subject claim"))?;
        Ok(AdminAuth { admin_id, claims })
    }
}

/// A headset session token minted by the "launch application" action.
pub struct HeadsetAuth {
    pub operator_id: OperatorId,
}

#[async_trait]
impl<S> FromRequestParts<S> for HeadsetAuth
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenService::from_ref(state);
        let token = bearer_token(parts)?;
        let claims = tokens
            .verify(token, ExpectedTokenType::Headset)
            .map_err(map_token_error)?;
        parse_operator_subject(&claims).map(|OperatorAuth { operator_id }| HeadsetAuth { operator_id })
    }
}

fn parse_operator_subject(claims: &Claims) -> Result<OperatorAuth, ApiError> {
    claims
        .sub
        .parse::<uuid::Uuid>()
        .map(|id| OperatorAuth { operator_id: OperatorId::new(id) })
        .map_err(|_| ApiError::new(ApiErrorKind::InvalidToken, "malformed subject claim"))
}

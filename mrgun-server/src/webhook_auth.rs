//! Shared-secret check for the recharge payment provider's callback (§4.5).
//!
//! The provider isn't an operator, admin, or headset, so it doesn't fit any
//! of the three bearer-token kinds in [`mrgun_auth::TokenType`]. Instead it
//! sends a pre-shared secret in `X-Webhook-Secret`, checked in constant time
//! the way `node`'s host-to-enclave comparisons avoid leaking a timing
//! oracle on a byte-by-byte match. Applied as a `route_layer` on just the
//! webhook route rather than a `FromRequestParts` extractor, since it isn't
//! part of the claims/session model the other extractors share.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::state::AppState;

pub async fn require_webhook_secret(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let presented = req
        .headers()
        .get("X-Webhook-Secret")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let expected = state.config.recharge_webhook_secret.as_bytes();
    let matches = presented.len() == expected.len() && presented.as_bytes().ct_eq(expected).into();

    if matches {
        Ok(next.run(req).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

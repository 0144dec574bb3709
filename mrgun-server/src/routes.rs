//! Route table (§6): wires every endpoint onto its handler. `GET /health`
//! is the only unauthenticated route besides the two login endpoints and
//! the recharge webhook.

use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use mrgun_api::dto::HealthResponse;

use crate::{handlers, state::AppState, webhook_auth::require_webhook_secret};

pub fn router(state: AppState) -> Router {
    let webhooks = Router::new()
        .route("/webhooks/recharge", post(handlers::finance::recharge_webhook))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_webhook_secret));

    Router::new()
        .route("/health", get(health))
        .route("/auth/operators/login", post(handlers::auth::operator_login))
        .route("/auth/admins/login", post(handlers::auth::admin_login))
        .route("/auth/operators/launch", post(handlers::auth::launch_headset))
        .route("/auth/game/pre-authorize", post(handlers::game::pre_authorize))
        .route("/auth/game/authorize", post(handlers::game::authorize))
        .route("/auth/game/session/upload", post(handlers::game::session_upload))
        .route("/operators/me/balance", get(handlers::operator::balance))
        .route("/operators/me/transactions", get(handlers::operator::transactions))
        .route("/operators/me/refunds", post(handlers::operator::apply_refund))
        .route("/operators/me/invoices", post(handlers::finance::apply_invoice))
        .route(
            "/operators/me/application-requests",
            post(handlers::finance::apply_application_request),
        )
        .route("/finance/refunds/:refund_id/approve", post(handlers::finance::approve_refund))
        .route("/finance/refunds/:refund_id/reject", post(handlers::finance::reject_refund))
        .route("/finance/refunds/:refund_id/settle", post(handlers::finance::settle_refund))
        .route("/finance/invoices/:invoice_id/approve", post(handlers::finance::approve_invoice))
        .route("/finance/invoices/:invoice_id/reject", post(handlers::finance::reject_invoice))
        .route("/finance/invoices/:invoice_id/issue", put(handlers::finance::issue_invoice))
        .route(
            "/finance/application-requests/:request_id/approve",
            post(handlers::finance::approve_application_request),
        )
        .route(
            "/finance/application-requests/:request_id/reject",
            post(handlers::finance::reject_application_request),
        )
        .route("/finance/operators/:operator_id/balance", post(handlers::finance::adjust_balance))
        .route("/finance/operators/:operator_id/lock", post(handlers::finance::lock_operator))
        .route("/finance/operators/:operator_id/unlock", post(handlers::finance::unlock_operator))
        .merge(webhooks)
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

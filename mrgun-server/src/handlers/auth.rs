//! Operator/admin login and the "launch application" action that mints a
//! headset token (§4.2, §6).

use axum::extract::State;
use mrgun_api::{
    dto::{
        AdminLoginRequest, AdminLoginResponse, AdminSummary, LaunchHeadsetRequest,
        LaunchHeadsetResponse, OperatorLoginRequest, OperatorLoginResponse, OperatorSummary,
    },
    extract::Json,
    ApiError, ApiErrorKind,
};
use mrgun_common::ids::{ApplicationId, SiteId};
use tracing::instrument;

use crate::{auth_extract::OperatorAuth, error_map, state::AppState};

#[instrument(skip_all)]
pub async fn operator_login(
    State(state): State<AppState>,
    Json(req): Json<OperatorLoginRequest>,
) -> Result<Json<OperatorLoginResponse>, ApiError> {
    let operator = mrgun_store::operator::find_by_username(state.store.pool(), &req.username)
        .await
        .map_err(|_| ApiError::internal())?
        .ok_or_else(|| ApiError::new(ApiErrorKind::InvalidRequest, "invalid username or password"))?;

    let verified = mrgun_auth::verify_password(&req.password, &operator.password_hash)
        .map_err(error_map::password_error)?;
    if !verified {
        return Err(ApiError::new(ApiErrorKind::InvalidRequest, "invalid username or password"));
    }
    if !operator.is_active || operator.is_locked {
        return Err(ApiError::new(ApiErrorKind::AccountLocked, "operator account is locked"));
    }

    let issued = state
        .tokens
        .issue_operator_token(operator.id())
        .map_err(error_map::token_error)?;

    let balance = operator.balance();
    Ok(Json(OperatorLoginResponse {
        access_token: issued.token,
        expires_in: issued.expires_in,
        operator: OperatorSummary {
            operator_id: operator.id().to_string(),
            username: operator.username,
            display_name: operator.display_name,
            balance,
        },
    }))
}

#[instrument(skip_all)]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, ApiError> {
    let admin = mrgun_store::admin::find_by_username(state.store.pool(), &req.username)
        .await
        .map_err(|_| ApiError::internal())?
        .ok_or_else(|| ApiError::new(ApiErrorKind::InvalidRequest, "invalid username or password"))?;

    let verified = mrgun_auth::verify_password(&req.password, &admin.password_hash)
        .map_err(error_map::password_error)?;
    if !verified {
        return Err(ApiError::new(ApiErrorKind::InvalidRequest, "invalid username or password"));
    }
    if !admin.is_active {
        return Err(ApiError::new(ApiErrorKind::AccountLocked, "admin account is deactivated"));
    }

    let role = admin.role();
    let issued = state
        .tokens
        .issue_admin_token(admin.id(), role)
        .map_err(error_map::token_error)?;

    Ok(Json(AdminLoginResponse {
        access_token: issued.token,
        expires_in: issued.expires_in,
        user: AdminSummary { id: admin.id().to_string(), role },
    }))
}

/// The operator UI's "launch application" action (§4.2): mints a headset
/// token scoped to `(operator, application, site)` after re-running the
/// C3 eligibility check, so a headset token is never handed out for an
/// application/site the operator couldn't authorise against anyway.
#[instrument(skip_all)]
pub async fn launch_headset(
    State(state): State<AppState>,
    OperatorAuth { operator_id }: OperatorAuth,
    Json(req): Json<LaunchHeadsetRequest>,
) -> Result<Json<LaunchHeadsetResponse>, ApiError> {
    let site_id = SiteId::parse(&req.site_id).map_err(|_| ApiError::invalid_site_id(&req.site_id))?;

    let application_id: ApplicationId =
        mrgun_engine::check_launch_eligibility(&state.store, operator_id, &req.app_code, site_id)
            .await
            .map_err(error_map::engine_error)?;

    let issued = state
        .tokens
        .issue_headset_token(operator_id, application_id, site_id)
        .map_err(error_map::token_error)?;

    Ok(Json(LaunchHeadsetResponse {
        headset_token: issued.token,
        expires_in: issued.expires_in,
    }))
}

//! Game auth endpoints (C3/C4, §4.4, §6): pre-authorise, authorise, and
//! session upload. All three take a headset session token.

use axum::extract::State;
use mrgun_api::{
    dto::{
        AuthorizeResponse, GameAuthRequest, PreAuthorizeResponse, SessionUploadRequest,
        SuccessResponse,
    },
    extract::Json,
    ApiError,
};
use mrgun_common::{ids::SiteId, Timestamp};
use mrgun_engine::upload::HeadsetDeviceUpload;
use tracing::instrument;

use crate::{auth_extract::HeadsetAuth, error_map, state::AppState};

fn parse_site_id(raw: &str) -> Result<SiteId, ApiError> {
    SiteId::parse(raw).map_err(|_| ApiError::invalid_site_id(raw))
}

fn parse_player_count(raw: u32) -> Result<i32, ApiError> {
    i32::try_from(raw).map_err(|_| ApiError::invalid_player_count())
}

#[instrument(skip_all)]
pub async fn pre_authorize(
    State(state): State<AppState>,
    HeadsetAuth { operator_id }: HeadsetAuth,
    Json(req): Json<GameAuthRequest>,
) -> Result<Json<PreAuthorizeResponse>, ApiError> {
    let site_id = parse_site_id(&req.site_id)?;
    let player_count = parse_player_count(req.player_count)?;

    let result = mrgun_engine::pre_authorise(&state.store, operator_id, &req.app_code, site_id, player_count)
        .await
        .map_err(error_map::engine_error)?;

    Ok(Json(PreAuthorizeResponse {
        can_authorize: result.can_authorize,
        app_name: result.app_name,
        unit_price: result.unit_price,
        total_cost: result.total_cost,
        current_balance: result.current_balance,
    }))
}

#[instrument(skip_all)]
pub async fn authorize(
    State(state): State<AppState>,
    HeadsetAuth { operator_id }: HeadsetAuth,
    Json(req): Json<GameAuthRequest>,
) -> Result<Json<AuthorizeResponse>, ApiError> {
    let site_id = parse_site_id(&req.site_id)?;
    let player_count = parse_player_count(req.player_count)?;

    let result = mrgun_engine::authorise(&state.store, operator_id, &req.app_code, site_id, player_count)
        .await
        .map_err(error_map::engine_error)?;

    let player_count = u32::try_from(result.player_count).map_err(|_| ApiError::internal())?;

    Ok(Json(AuthorizeResponse {
        session_id: result.session_id,
        app_name: result.app_name,
        player_count,
        unit_price: result.unit_price,
        total_cost: result.total_cost,
        balance_after: result.balance_after,
        authorized_at: Timestamp::from_datetime(result.authorized_at),
    }))
}

#[instrument(skip_all)]
pub async fn session_upload(
    State(state): State<AppState>,
    HeadsetAuth { operator_id }: HeadsetAuth,
    Json(req): Json<SessionUploadRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let headsets = req
        .headset_devices
        .into_iter()
        .map(|h| HeadsetDeviceUpload {
            device_id: h.device_id,
            device_name: Some(h.device_name),
            start_time: h.start_time.map(|t| t.as_datetime()),
            end_time: h.end_time.map(|t| t.as_datetime()),
            process_info: h.process_info,
        })
        .collect();

    mrgun_engine::upload_session(
        &state.store,
        operator_id,
        &req.session_id,
        req.start_time.map(|t| t.as_datetime()),
        req.end_time.map(|t| t.as_datetime()),
        req.process_info,
        headsets,
    )
    .await
    .map_err(error_map::engine_error)?;

    Ok(Json(SuccessResponse { success: true }))
}

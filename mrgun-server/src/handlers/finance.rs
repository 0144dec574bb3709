//! Back-office handlers (C5, §4.5, §6): refund/invoice/application-request
//! review, balance adjustment, operator lock/unlock, and recharge-order
//! settlement. Every handler here (other than the recharge webhook) takes
//! an admin or finance session and checks a [`Capability`] before touching
//! the state machine.

use axum::extract::{Path, State};
use mrgun_api::{
    dto::{
        ApplicationRequestApplyRequest, ApplicationRequestReviewRequest, ApplicationRequestView,
        BalanceAdjustmentRequest, BalanceAdjustmentResponse, InvoiceApplyRequest,
        InvoiceIssueRequest, InvoiceView, RechargeCallbackRequest, RechargeCallbackResponse,
        RefundRejectRequest, RefundReviewRequest, RefundView,
    },
    extract::Json,
    ApiError,
};
use mrgun_backoffice::adjustment::Direction;
use mrgun_common::{
    ids::{ApplicationId, ApplicationRequestId, InvoiceId, OperatorId, RechargeOrderId, RefundId},
    role::Capability,
};

use crate::{
    auth_extract::{AdminAuth, OperatorAuth},
    error_map,
    state::AppState,
};

fn require(admin: &AdminAuth, capability: Capability) -> Result<(), ApiError> {
    let role = admin.claims.role.ok_or_else(ApiError::internal)?;
    if role.can(capability) {
        Ok(())
    } else {
        Err(ApiError::forbidden("this role cannot perform this action"))
    }
}

fn parse_id<T>(raw: &str, parse: impl Fn(&str) -> Result<T, mrgun_common::ids::IdParseError>) -> Result<T, ApiError> {
    parse(raw).map_err(|_| ApiError::invalid_request(format!("invalid id: '{raw}'")))
}

// --- refunds --- //

pub async fn approve_refund(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(refund_id): Path<String>,
    Json(req): Json<RefundReviewRequest>,
) -> Result<Json<RefundView>, ApiError> {
    require(&admin, Capability::ReviewRefund)?;
    let refund_id: RefundId = parse_id(&refund_id, RefundId::parse)?;

    let refund = mrgun_backoffice::refund::approve_refund(
        &state.store,
        refund_id,
        admin.admin_id.as_uuid(),
        req.admin_note,
    )
    .await
    .map_err(error_map::backoffice_error)?;

    Ok(Json(refund_view(refund)))
}

pub async fn reject_refund(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(refund_id): Path<String>,
    Json(req): Json<RefundRejectRequest>,
) -> Result<Json<RefundView>, ApiError> {
    require(&admin, Capability::ReviewRefund)?;
    let refund_id: RefundId = parse_id(&refund_id, RefundId::parse)?;

    let refund = mrgun_backoffice::refund::reject_refund(
        &state.store,
        refund_id,
        admin.admin_id.as_uuid(),
        req.reject_reason,
    )
    .await
    .map_err(error_map::backoffice_error)?;

    Ok(Json(refund_view(refund)))
}

pub async fn settle_refund(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(refund_id): Path<String>,
) -> Result<Json<RefundView>, ApiError> {
    require(&admin, Capability::ReviewRefund)?;
    let refund_id: RefundId = parse_id(&refund_id, RefundId::parse)?;

    let refund = mrgun_backoffice::refund::settle_refund(&state.store, refund_id)
        .await
        .map_err(error_map::backoffice_error)?;

    Ok(Json(refund_view(refund)))
}

fn refund_view(refund: mrgun_store::models::RefundRow) -> RefundView {
    RefundView {
        refund_id: refund.id().to_string(),
        operator_id: refund.operator_id.to_string(),
        requested_amount: refund.requested_amount(),
        reason: refund.reason,
        status: refund.status.to_string(),
        reviewer_id: refund.reviewer_id.map(|id| id.to_string()),
        admin_note: refund.admin_note,
    }
}

// --- invoices --- //

pub async fn apply_invoice(
    State(state): State<AppState>,
    OperatorAuth { operator_id }: OperatorAuth,
    Json(req): Json<InvoiceApplyRequest>,
) -> Result<Json<InvoiceView>, ApiError> {
    let invoice_type = req
        .invoice_type
        .parse()
        .map_err(|_| ApiError::invalid_request(format!("invalid invoice_type: '{}'", req.invoice_type)))?;

    let invoice = mrgun_backoffice::invoice::apply_invoice(
        &state.store,
        operator_id,
        invoice_type,
        req.amount,
        Some(req.buyer_tax_info),
    )
    .await
    .map_err(error_map::backoffice_error)?;

    Ok(Json(invoice_view(invoice)))
}

pub async fn approve_invoice(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(invoice_id): Path<String>,
    Json(req): Json<InvoiceIssueRequest>,
) -> Result<Json<InvoiceView>, ApiError> {
    require(&admin, Capability::ReviewInvoice)?;
    let invoice_id: InvoiceId = parse_id(&invoice_id, InvoiceId::parse)?;

    let invoice = mrgun_backoffice::invoice::approve_invoice(&state.store, invoice_id, req.invoice_number)
        .await
        .map_err(error_map::backoffice_error)?;

    Ok(Json(invoice_view(invoice)))
}

pub async fn reject_invoice(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(invoice_id): Path<String>,
) -> Result<Json<InvoiceView>, ApiError> {
    require(&admin, Capability::ReviewInvoice)?;
    let invoice_id: InvoiceId = parse_id(&invoice_id, InvoiceId::parse)?;

    let invoice = mrgun_backoffice::invoice::reject_invoice(&state.store, invoice_id)
        .await
        .map_err(error_map::backoffice_error)?;

    Ok(Json(invoice_view(invoice)))
}

pub async fn issue_invoice(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(invoice_id): Path<String>,
    Json(req): Json<InvoiceIssueRequest>,
) -> Result<Json<InvoiceView>, ApiError> {
    require(&admin, Capability::ReviewInvoice)?;
    let invoice_id: InvoiceId = parse_id(&invoice_id, InvoiceId::parse)?;

    let invoice = mrgun_backoffice::invoice::issue_invoice(&state.store, invoice_id, req.invoice_url)
        .await
        .map_err(error_map::backoffice_error)?;

    Ok(Json(invoice_view(invoice)))
}

fn invoice_view(invoice: mrgun_store::models::InvoiceRow) -> InvoiceView {
    InvoiceView {
        invoice_id: invoice.id().to_string(),
        operator_id: invoice.operator_id.to_string(),
        invoice_type: invoice.invoice_type.to_string(),
        amount: invoice.amount(),
        status: invoice.status.to_string(),
        invoice_number: invoice.invoice_number,
        invoice_url: invoice.invoice_url,
    }
}

// --- application requests --- //

pub async fn apply_application_request(
    State(state): State<AppState>,
    OperatorAuth { operator_id }: OperatorAuth,
    Json(req): Json<ApplicationRequestApplyRequest>,
) -> Result<Json<ApplicationRequestView>, ApiError> {
    let application_id: ApplicationId = parse_id(&req.application_id, ApplicationId::parse)?;

    let request = mrgun_backoffice::application_request::apply_request(
        &state.store,
        operator_id,
        application_id,
        req.reason,
    )
    .await
    .map_err(error_map::backoffice_error)?;

    Ok(Json(application_request_view(request)))
}

pub async fn approve_application_request(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(request_id): Path<String>,
    Json(req): Json<ApplicationRequestReviewRequest>,
) -> Result<Json<ApplicationRequestView>, ApiError> {
    require(&admin, Capability::ReviewApplicationRequest)?;
    let request_id: ApplicationRequestId = parse_id(&request_id, ApplicationRequestId::parse)?;

    let request = mrgun_backoffice::application_request::approve_request(
        &state.store,
        request_id,
        admin.admin_id.as_uuid(),
        req.admin_note,
    )
    .await
    .map_err(error_map::backoffice_error)?;

    Ok(Json(application_request_view(request)))
}

pub async fn reject_application_request(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(request_id): Path<String>,
    Json(req): Json<ApplicationRequestReviewRequest>,
) -> Result<Json<ApplicationRequestView>, ApiError> {
    require(&admin, Capability::ReviewApplicationRequest)?;
    let request_id: ApplicationRequestId = parse_id(&request_id, ApplicationRequestId::parse)?;

    let request = mrgun_backoffice::application_request::reject_request(
        &state.store,
        request_id,
        admin.admin_id.as_uuid(),
        req.admin_note,
    )
    .await
    .map_err(error_map::backoffice_error)?;

    Ok(Json(application_request_view(request)))
}

fn application_request_view(
    request: mrgun_store::models::ApplicationRequestRow,
) -> ApplicationRequestView {
    ApplicationRequestView {
        request_id: request.id().to_string(),
        operator_id: request.operator_id.to_string(),
        application_id: request.application_id.to_string(),
        status: request.status.to_string(),
    }
}

// --- balance adjustment --- //

pub async fn adjust_balance(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(operator_id): Path<String>,
    Json(req): Json<BalanceAdjustmentRequest>,
) -> Result<Json<BalanceAdjustmentResponse>, ApiError> {
    require(&admin, Capability::AdjustBalance)?;
    let operator_id: OperatorId = parse_id(&operator_id, OperatorId::parse)?;

    let direction = match req.direction {
        mrgun_api::dto::AdjustmentDirection::Add => Direction::Add,
        mrgun_api::dto::AdjustmentDirection::Subtract => Direction::Subtract,
    };

    let result = mrgun_backoffice::adjustment::adjust_balance(
        &state.store,
        operator_id,
        direction,
        req.amount,
        req.reason,
    )
    .await
    .map_err(error_map::backoffice_error)?;

    Ok(Json(BalanceAdjustmentResponse {
        balance_after: result.balance_after,
        transaction_id: result.transaction_id.to_string(),
    }))
}

// --- operator lock/unlock --- //

pub async fn lock_operator(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(operator_id): Path<String>,
) -> Result<Json<mrgun_api::dto::SuccessResponse>, ApiError> {
    require(&admin, Capability::LockOperatorAccount)?;
    let operator_id: OperatorId = parse_id(&operator_id, OperatorId::parse)?;

    state
        .store
        .with_tx::<_, mrgun_store::StoreError, _>(move |tx| {
            Box::pin(async move {
                mrgun_store::operator::set_locked(tx, operator_id, true, Some("locked by admin".into())).await
            })
        })
        .await
        .map_err(|_| ApiError::internal())?;

    Ok(Json(mrgun_api::dto::SuccessResponse { success: true }))
}

pub async fn unlock_operator(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(operator_id): Path<String>,
) -> Result<Json<mrgun_api::dto::SuccessResponse>, ApiError> {
    require(&admin, Capability::LockOperatorAccount)?;
    let operator_id: OperatorId = parse_id(&operator_id, OperatorId::parse)?;

    state
        .store
        .with_tx::<_, mrgun_store::StoreError, _>(move |tx| {
            Box::pin(async move { mrgun_store::operator::set_locked(tx, operator_id, false, None).await })
        })
        .await
        .map_err(|_| ApiError::internal())?;

    Ok(Json(mrgun_api::dto::SuccessResponse { success: true }))
}

// --- recharge webhook --- //

/// No operator/admin session is involved: the payment provider calls this
/// directly. Authenticity is the provider's shared-secret scheme, which
/// `mrgun-server` enforces as a separate header-check middleware layered
/// only onto this route rather than as a [`FromRequestParts`] extractor,
/// since the secret is not one of the three bearer token kinds.
pub async fn recharge_webhook(
    State(state): State<AppState>,
    Json(req): Json<RechargeCallbackRequest>,
) -> Result<Json<RechargeCallbackResponse>, ApiError> {
    let order_id: RechargeOrderId = parse_id(&req.order_id, RechargeOrderId::parse)?;

    if !req.success {
        return Ok(Json(RechargeCallbackResponse { acknowledged: true }));
    }

    mrgun_backoffice::recharge::complete_recharge_order(&state.store, order_id, chrono::Utc::now())
        .await
        .map_err(error_map::backoffice_error)?;

    Ok(Json(RechargeCallbackResponse { acknowledged: true }))
}

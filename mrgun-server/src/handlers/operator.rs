//! Operator self-service endpoints (§6): balance, transaction history, and
//! filing a refund request against one's own account.

use axum::extract::{Query, State};
use mrgun_api::{
    dto::{BalanceResponse, PageQuery, Paginated, RefundApplyRequest, RefundView, TransactionView},
    extract::Json,
    ApiError,
};
use mrgun_common::Money;

use crate::{auth_extract::OperatorAuth, state::AppState};

#[tracing::instrument(skip_all)]
pub async fn balance(
    State(state): State<AppState>,
    OperatorAuth { operator_id }: OperatorAuth,
) -> Result<Json<BalanceResponse>, ApiError> {
    let mut tx = state.store.pool().begin().await.map_err(|_| ApiError::internal())?;
    let operator = mrgun_store::operator::find_by_id(&mut tx, operator_id)
        .await
        .map_err(|_| ApiError::internal())?;
    let _ = tx.rollback().await;

    Ok(Json(BalanceResponse {
        balance: operator.balance(),
        total_recharged: Money::new(operator.total_recharged),
        total_consumed: Money::new(operator.total_consumed),
    }))
}

#[tracing::instrument(skip_all)]
pub async fn transactions(
    State(state): State<AppState>,
    OperatorAuth { operator_id }: OperatorAuth,
    Query(page): Query<PageQuery>,
) -> Result<Json<Paginated<TransactionView>>, ApiError> {
    let page_num = page.page.max(1);
    let page_size = page.page_size.clamp(1, 100);

    let (rows, total) = mrgun_store::transaction::list_for_operator(
        state.store.pool(),
        operator_id,
        i64::from(page_num),
        i64::from(page_size),
    )
    .await
    .map_err(|_| ApiError::internal())?;

    let items = rows
        .into_iter()
        .map(|row| TransactionView {
            transaction_id: row.id().to_string(),
            transaction_type: row.transaction_type.to_string(),
            amount: Money::new(row.amount),
            balance_before: Money::new(row.balance_before),
            balance_after: Money::new(row.balance_after),
            description: row.description,
            related_id: row.related_id.map(|id| id.to_string()),
            created_at: mrgun_common::Timestamp::from_datetime(row.created_at),
        })
        .collect();

    Ok(Json(Paginated {
        items,
        page: page_num,
        page_size,
        total: total.max(0) as u64,
    }))
}

/// `amount: None` asks to refund the operator's full current balance -- the
/// only sensible default for a self-service "close out and refund me"
/// request, since the operator has no way to know their own balance to the
/// cent without a separate round trip.
#[tracing::instrument(skip_all)]
pub async fn apply_refund(
    State(state): State<AppState>,
    OperatorAuth { operator_id }: OperatorAuth,
    Json(req): Json<RefundApplyRequest>,
) -> Result<Json<RefundView>, ApiError> {
    let amount = match req.amount {
        Some(amount) => amount,
        None => {
            let mut tx = state.store.pool().begin().await.map_err(|_| ApiError::internal())?;
            let operator = mrgun_store::operator::find_by_id(&mut tx, operator_id)
                .await
                .map_err(|_| ApiError::internal())?;
            let _ = tx.rollback().await;
            operator.balance()
        }
    };

    let refund = mrgun_backoffice::refund::apply_refund(&state.store, operator_id, amount, req.reason)
        .await
        .map_err(crate::error_map::backoffice_error)?;

    Ok(Json(RefundView {
        refund_id: refund.id().to_string(),
        operator_id: refund.operator_id.to_string(),
        requested_amount: refund.requested_amount(),
        reason: refund.reason,
        status: refund.status.to_string(),
        reviewer_id: refund.reviewer_id.map(|id| id.to_string()),
        admin_note: refund.admin_note,
    }))
}

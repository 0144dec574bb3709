//! Refund lifecycle (§3, §4.5): apply -> approve/reject -> settle. Approval
//! decreases the operator's balance -- the corrected sign convention from
//! Design Notes §9 (money physically leaves the platform back to the
//! customer).

use mrgun_common::{
    ids::{OperatorId, RefundId, TransactionId},
    Money,
};
use mrgun_store::{
    backoffice,
    models::{RefundRow, RefundStatus, TransactionType},
    operator,
    transaction::NewTransaction,
    LedgerStore,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::BackofficeError;

pub async fn apply_refund(
    store: &LedgerStore,
    operator_id: OperatorId,
    amount: Money,
    reason: String,
) -> Result<RefundRow, BackofficeError> {
    let refund_id = RefundId::generate();
    store
        .with_tx(move |tx| {
            Box::pin(async move {
                backoffice::insert_refund(tx, refund_id, operator_id, amount, &reason)
                    .await
                    .map_err(BackofficeError::from)
            })
        })
        .await
}

pub async fn approve_refund(
    store: &LedgerStore,
    refund_id: RefundId,
    reviewer_id: Uuid,
    admin_note: Option<String>,
) -> Result<RefundRow, BackofficeError> {
    store
        .with_tx(move |tx| {
            Box::pin(async move {
                let refund = backoffice::lock_refund_for_update(tx, refund_id).await?;
                if refund.status != RefundStatus::Pending {
                    return Err(BackofficeError::InvalidState);
                }

                let operator_id = OperatorId::new(refund.operator_id);
                let operator = operator::lock_operator_for_update(tx, operator_id).await?;
                let balance_before = operator.balance();
                let requested_amount = refund.requested_amount();

                if balance_before < requested_amount {
                    return Err(BackofficeError::InsufficientBalance);
                }

                let balance_after = balance_before - requested_amount;

                operator::apply_balance_delta(
                    tx,
                    operator_id,
                    -requested_amount.as_decimal(),
                    Decimal::ZERO,
                    Decimal::ZERO,
                    requested_amount.as_decimal(),
                )
                .await?;

                mrgun_store::transaction::insert_transaction(
                    tx,
                    NewTransaction {
                        transaction_id: TransactionId::generate(),
                        operator_id,
                        transaction_type: TransactionType::Refund,
                        amount: -requested_amount,
                        balance_before,
                        balance_after,
                        description: format!("refund {refund_id} approved"),
                        related_id: Some(refund_id.as_uuid()),
                    },
                )
                .await?;

                backoffice::transition_refund(
                    tx,
                    refund_id,
                    RefundStatus::Approved,
                    Some(reviewer_id),
                    admin_note,
                )
                .await
                .map_err(BackofficeError::from)
            })
        })
        .await
}

/// approved -> completed, once the payout has actually been sent to the
/// operator (§3 "apply -> approve/reject -> settle"), mirroring
/// `invoice::issue_invoice`'s approved -> issued step.
pub async fn settle_refund(
    store: &LedgerStore,
    refund_id: RefundId,
) -> Result<RefundRow, BackofficeError> {
    store
        .with_tx(move |tx| {
            Box::pin(async move {
                let refund = backoffice::lock_refund_for_update(tx, refund_id).await?;
                if refund.status != RefundStatus::Approved {
                    return Err(BackofficeError::InvalidState);
                }
                backoffice::transition_refund(
                    tx,
                    refund_id,
                    RefundStatus::Completed,
                    refund.reviewer_id,
                    refund.admin_note,
                )
                .await
                .map_err(BackofficeError::from)
            })
        })
        .await
}

pub async fn reject_refund(
    store: &LedgerStore,
    refund_id: RefundId,
    reviewer_id: Uuid,
    reject_reason: String,
) -> Result<RefundRow, BackofficeError> {
    store
        .with_tx(move |tx| {
            Box::pin(async move {
                let refund = backoffice::lock_refund_for_update(tx, refund_id).await?;
                if refund.status != RefundStatus::Pending {
                    return Err(BackofficeError::InvalidState);
                }
                backoffice::transition_refund(
                    tx,
                    refund_id,
                    RefundStatus::Rejected,
                    Some(reviewer_id),
                    Some(reject_reason),
                )
                .await
                .map_err(BackofficeError::from)
            })
        })
        .await
}

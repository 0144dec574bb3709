//! Recharge-order webhook completion (§4.5): the payment gateway is opaque
//! to the core and only tells us an order id succeeded. Completion is
//! idempotent -- a repeated callback on an already-paid order is
//! acknowledged without moving the balance again.

use chrono::{DateTime, Utc};
use mrgun_common::ids::{OperatorId, RechargeOrderId, TransactionId};
use mrgun_store::{
    backoffice,
    models::{RechargeOrderRow, RechargeOrderStatus, TransactionType},
    operator,
    transaction::NewTransaction,
    LedgerStore,
};
use rust_decimal::Decimal;

use crate::error::BackofficeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Balance was credited and a recharge `Transaction` was recorded.
    Credited,
    /// Order had already moved past `pending`; callback acknowledged, no
    /// balance movement.
    AlreadySettled,
    /// Order's `expires_at` had passed before the callback arrived.
    Expired,
}

pub struct CompletionResult {
    pub order: RechargeOrderRow,
    pub outcome: CompletionOutcome,
}

/// Completes a recharge order on a successful gateway callback. `now` is
/// the server wall-clock at callback receipt, used against the order's
/// `expires_at`.
pub async fn complete_recharge_order(
    store: &LedgerStore,
    order_id: RechargeOrderId,
    now: DateTime<Utc>,
) -> Result<CompletionResult, BackofficeError> {
    store
        .with_tx(move |tx| {
            Box::pin(async move {
                let order = backoffice::lock_recharge_order_for_update(tx, order_id).await?;

                if order.status != RechargeOrderStatus::Pending {
                    return Ok(CompletionResult {
                        outcome: CompletionOutcome::AlreadySettled,
                        order,
                    });
                }

                if order.expires_at < now {
                    return Ok(CompletionResult {
                        outcome: CompletionOutcome::Expired,
                        order,
                    });
                }

                let operator_id = OperatorId::new(order.operator_id);
                let operator = operator::lock_operator_for_update(tx, operator_id).await?;
                let balance_before = operator.balance();
                let amount = order.amount();
                let balance_after = balance_before + amount;

                operator::apply_balance_delta(
                    tx,
                    operator_id,
                    amount.as_decimal(),
                    amount.as_decimal(),
                    Decimal::ZERO,
                    Decimal::ZERO,
                )
                .await?;

                mrgun_store::transaction::insert_transaction(
                    tx,
                    NewTransaction {
                        transaction_id: TransactionId::generate(),
                        operator_id,
                        transaction_type: TransactionType::Recharge,
                        amount,
                        balance_before,
                        balance_after,
                        description: format!("recharge order {order_id} settled"),
                        related_id: Some(order_id.as_uuid()),
                    },
                )
                .await?;

                let order = backoffice::mark_recharge_order_paid(tx, order_id).await?;

                Ok(CompletionResult {
                    outcome: CompletionOutcome::Credited,
                    order,
                })
            })
        })
        .await
}

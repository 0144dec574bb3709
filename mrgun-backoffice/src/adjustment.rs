//! Admin balance adjustment (§4.5): locks the operator row, applies a
//! signed delta, and records a matching adjustment Transaction. A subtract
//! that would drive the balance below zero is rejected before any write.

use mrgun_common::{
    ids::{OperatorId, TransactionId},
    Money,
};
use mrgun_store::{
    models::TransactionType, operator, transaction::NewTransaction, LedgerStore,
};
use rust_decimal::Decimal;

use crate::error::BackofficeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Add,
    Subtract,
}

pub struct AdjustmentResult {
    pub balance_after: Money,
    pub transaction_id: uuid::Uuid,
}

pub async fn adjust_balance(
    store: &LedgerStore,
    operator_id: OperatorId,
    direction: Direction,
    amount: Money,
    reason: String,
) -> Result<AdjustmentResult, BackofficeError> {
    store
        .with_tx(move |tx| {
            Box::pin(async move {
                let operator = operator::lock_operator_for_update(tx, operator_id).await?;
                let balance_before = operator.balance();

                let signed_amount = match direction {
                    Direction::Add => amount,
                    Direction::Subtract => -amount,
                };

                if direction == Direction::Subtract && balance_before < amount {
                    return Err(BackofficeError::InsufficientBalance);
                }

                let balance_after = balance_before + signed_amount;

                let updated = operator::apply_balance_delta(
                    tx,
                    operator_id,
                    signed_amount.as_decimal(),
                    Decimal::ZERO,
                    Decimal::ZERO,
                    Decimal::ZERO,
                )
                .await?;
                debug_assert_eq!(updated.balance(), balance_after);

                let transaction_id = TransactionId::generate();
                let description = match direction {
                    Direction::Add => format!("admin adjustment +{amount}: {reason}"),
                    Direction::Subtract => format!("admin adjustment -{amount}: {reason}"),
                };

                mrgun_store::transaction::insert_transaction(
                    tx,
                    NewTransaction {
                        transaction_id,
                        operator_id,
                        transaction_type: TransactionType::Adjustment,
                        amount: signed_amount,
                        balance_before,
                        balance_after,
                        description,
                        related_id: None,
                    },
                )
                .await?;

                Ok(AdjustmentResult {
                    balance_after,
                    transaction_id: transaction_id.as_uuid(),
                })
            })
        })
        .await
}

//! Transaction ledger entries (§3): append-only, never updated after insert.

use mrgun_common::{
    ids::{OperatorId, TransactionId},
    Money,
};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{error::StoreError, models::TransactionRow};

pub use crate::models::TransactionType;

pub struct NewTransaction {
    pub transaction_id: TransactionId,
    pub operator_id: OperatorId,
    pub transaction_type: TransactionType,
    pub amount: Money,
    pub balance_before: Money,
    pub balance_after: Money,
    pub description: String,
    pub related_id: Option<Uuid>,
}

pub async fn insert_transaction(
    tx: &mut Transaction<'_, Postgres>,
    txn: NewTransaction,
) -> Result<TransactionRow, StoreError> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        INSERT INTO transactions
            (transaction_id, operator_id, transaction_type, amount, balance_before,
             balance_after, description, related_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
        RETURNING transaction_id, operator_id, transaction_type, amount, balance_before,
                  balance_after, description, related_id, created_at
        "#,
    )
    .bind(txn.transaction_id.as_uuid())
    .bind(txn.operator_id.as_uuid())
    .bind(txn.transaction_type)
    .bind(txn.amount.as_decimal())
    .bind(txn.balance_before.as_decimal())
    .bind(txn.balance_after.as_decimal())
    .bind(&txn.description)
    .bind(txn.related_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(StoreError::from)
}

pub async fn find_by_related_id(
    tx: &mut Transaction<'_, Postgres>,
    related_id: Uuid,
) -> Result<Option<TransactionRow>, StoreError> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        SELECT transaction_id, operator_id, transaction_type, amount, balance_before,
               balance_after, description, related_id, created_at
        FROM transactions
        WHERE related_id = $1
        "#,
    )
    .bind(related_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(StoreError::from)
}

/// Page of an operator's history (`GET /operators/me/transactions?page=`).
pub async fn list_for_operator(
    pool: &sqlx::PgPool,
    operator_id: OperatorId,
    page: i64,
    page_size: i64,
) -> Result<(Vec<TransactionRow>, i64), StoreError> {
    let offset = (page.max(1) - 1) * page_size;
    let rows = sqlx::query_as::<_, TransactionRow>(
        r#"
        SELECT transaction_id, operator_id, transaction_type, amount, balance_before,
               balance_after, description, related_id, created_at
        FROM transactions
        WHERE operator_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(operator_id.as_uuid())
    .bind(page_size)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE operator_id = $1")
        .bind(operator_id.as_uuid())
        .fetch_one(pool)
        .await?;

    Ok((rows, total))
}

/// Balance consistency check used by the §8 property tests: recomputes the
/// sum of every transaction amount for an operator directly from the ledger.
pub async fn sum_amounts_for_operator(
    pool: &sqlx::PgPool,
    operator_id: OperatorId,
) -> Result<rust_decimal::Decimal, StoreError> {
    let sum: Option<rust_decimal::Decimal> =
        sqlx::query_scalar("SELECT SUM(amount) FROM transactions WHERE operator_id = $1")
            .bind(operator_id.as_uuid())
            .fetch_one(pool)
            .await?;
    Ok(sum.unwrap_or(rust_decimal::Decimal::ZERO))
}

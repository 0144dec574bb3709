//! Operator repository: lookups and the single row-locking primitive every
//! balance-moving path (C4, C5) is built on.

use mrgun_common::ids::OperatorId;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use crate::{error::StoreError, models::OperatorRow};

/// Row-level exclusive lock (§4.1 `LockOperatorForUpdate`). Every concurrent
/// authorise/back-office call against the same operator serialises on this
/// `SELECT ... FOR UPDATE`.
pub async fn lock_operator_for_update(
    tx: &mut Transaction<'_, Postgres>,
    operator_id: OperatorId,
) -> Result<OperatorRow, StoreError> {
    sqlx::query_as::<_, OperatorRow>(
        r#"
        SELECT operator_id, username, password_hash, display_name, contact_email,
               contact_phone, balance, total_recharged, total_consumed, total_refunded,
               customer_tier, is_active, is_locked, lock_reason, locked_at
        FROM operators
        WHERE operator_id = $1
        FOR UPDATE
        "#,
    )
    .bind(operator_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(StoreError::OperatorNotFound)
}

pub async fn find_by_id(
    tx: &mut Transaction<'_, Postgres>,
    operator_id: OperatorId,
) -> Result<OperatorRow, StoreError> {
    sqlx::query_as::<_, OperatorRow>(
        r#"
        SELECT operator_id, username, password_hash, display_name, contact_email,
               contact_phone, balance, total_recharged, total_consumed, total_refunded,
               customer_tier, is_active, is_locked, lock_reason, locked_at
        FROM operators
        WHERE operator_id = $1
        "#,
    )
    .bind(operator_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(StoreError::OperatorNotFound)
}

pub async fn find_by_username(
    pool: &sqlx::PgPool,
    username: &str,
) -> Result<Option<OperatorRow>, StoreError> {
    sqlx::query_as::<_, OperatorRow>(
        r#"
        SELECT operator_id, username, password_hash, display_name, contact_email,
               contact_phone, balance, total_recharged, total_consumed, total_refunded,
               customer_tier, is_active, is_locked, lock_reason, locked_at
        FROM operators
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(StoreError::from)
}

/// Applies a signed balance delta (positive = increase) and returns the new
/// balance. Callers are expected to have already locked the row in this same
/// transaction and to have checked non-negativity themselves where required
/// (adjustments/debits enforce it; recharges and this function do not need
/// to, since they only ever increase balance).
pub async fn apply_balance_delta(
    tx: &mut Transaction<'_, Postgres>,
    operator_id: OperatorId,
    delta: Decimal,
    total_recharged_delta: Decimal,
    total_consumed_delta: Decimal,
    total_refunded_delta: Decimal,
) -> Result<OperatorRow, StoreError> {
    sqlx::query_as::<_, OperatorRow>(
        r#"
        UPDATE operators
        SET balance = balance + $2,
            total_recharged = total_recharged + $3,
            total_consumed = total_consumed + $4,
            total_refunded = total_refunded + $5
        WHERE operator_id = $1
        RETURNING operator_id, username, password_hash, display_name, contact_email,
                  contact_phone, balance, total_recharged, total_consumed, total_refunded,
                  customer_tier, is_active, is_locked, lock_reason, locked_at
        "#,
    )
    .bind(operator_id.as_uuid())
    .bind(delta)
    .bind(total_recharged_delta)
    .bind(total_consumed_delta)
    .bind(total_refunded_delta)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(StoreError::OperatorNotFound)
}

pub async fn set_locked(
    tx: &mut Transaction<'_, Postgres>,
    operator_id: OperatorId,
    locked: bool,
    reason: Option<String>,
) -> Result<OperatorRow, StoreError> {
    sqlx::query_as::<_, OperatorRow>(
        r#"
        UPDATE operators
        SET is_locked = $2,
            lock_reason = $3,
            locked_at = CASE WHEN $2 THEN NOW() ELSE NULL END
        WHERE operator_id = $1
        RETURNING operator_id, username, password_hash, display_name, contact_email,
                  contact_phone, balance, total_recharged, total_consumed, total_refunded,
                  customer_tier, is_active, is_locked, lock_reason, locked_at
        "#,
    )
    .bind(operator_id.as_uuid())
    .bind(locked)
    .bind(reason)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(StoreError::OperatorNotFound)
}

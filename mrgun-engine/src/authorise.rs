//! Billing Engine (C4): pre-authorise, authorise, and session upload.
//!
//! The authorise algorithm's retry loop is grounded on the
//! `TransactionStateMachine`/`execute_transaction` shape in the ledger
//! settlement reference (each attempt gets its own `sqlx::Transaction`,
//! since Postgres aborts the whole transaction on a constraint violation --
//! there is no way to retry an insert inside an already-poisoned one).

use chrono::Utc;
use mrgun_common::{
    config::MAX_TX_RETRIES,
    ids::{OperatorId, SiteId, TransactionId, UsageRecordId},
    time::IDEMPOTENCY_WINDOW_SECS,
    Money,
};
use mrgun_store::{
    models::TransactionType,
    operator,
    transaction::NewTransaction,
    usage::{self, NewUsageRecord},
    LedgerStore, StoreError,
};
use tracing::warn;

use crate::{error::EngineError, rules};

#[derive(Debug, Clone)]
pub struct PreAuthoriseResult {
    pub can_authorize: bool,
    pub app_name: String,
    pub unit_price: Money,
    pub total_cost: Money,
    pub current_balance: Money,
}

/// Runs C3 only, never writes (§4.4 "Pre-authorise").
pub async fn pre_authorise(
    store: &LedgerStore,
    operator_id: OperatorId,
    app_code: &str,
    site_id: SiteId,
    player_count: i32,
) -> Result<PreAuthoriseResult, EngineError> {
    let mut tx = store.pool().begin().await.map_err(StoreError::from)?;
    let now = Utc::now();
    let (_, resolved) =
        rules::check_for_operator(&mut tx, operator_id, app_code, site_id, player_count, now).await?;
    let _ = tx.rollback().await;

    Ok(PreAuthoriseResult {
        can_authorize: true,
        app_name: resolved.app_name,
        unit_price: resolved.unit_price,
        total_cost: resolved.total_cost,
        current_balance: resolved.current_balance,
    })
}

/// Runs rules 1-4 for the "launch application" action (§4.2) and returns the
/// resolved `application_id` on success. Read-only; the transaction is
/// always rolled back.
pub async fn check_launch_eligibility(
    store: &LedgerStore,
    operator_id: OperatorId,
    app_code: &str,
    site_id: SiteId,
) -> Result<mrgun_common::ids::ApplicationId, EngineError> {
    let mut tx = store.pool().begin().await.map_err(StoreError::from)?;
    let now = Utc::now();
    let application_id =
        rules::check_launch_eligibility(&mut tx, operator_id, app_code, site_id, now).await?;
    let _ = tx.rollback().await;
    Ok(application_id)
}

#[derive(Debug, Clone)]
pub struct AuthoriseResult {
    pub session_id: String,
    pub app_name: String,
    pub player_count: i32,
    pub unit_price: Money,
    pub total_cost: Money,
    pub balance_after: Money,
    pub authorized_at: chrono::DateTime<Utc>,
    /// `true` when this result came from the idempotency window rather than
    /// a fresh debit (§4.4 step 5) -- callers still answer HTTP 200 either
    /// way, this is only useful for logging/tests.
    pub replayed: bool,
}

/// Runs the full authorise algorithm (§4.4 steps 1-10), retrying up to
/// [`MAX_TX_RETRIES`] times on a retryable database failure or a
/// `session_id` collision.
pub async fn authorise(
    store: &LedgerStore,
    operator_id: OperatorId,
    app_code: &str,
    site_id: SiteId,
    player_count: i32,
) -> Result<AuthoriseResult, EngineError> {
    let mut last_err: Option<EngineError> = None;

    for attempt in 0..MAX_TX_RETRIES {
        match try_authorise_once(store, operator_id, app_code, site_id, player_count).await {
            Ok(result) => return Ok(result),
            Err(EngineError::Retryable(msg)) => {
                warn!(attempt, %msg, "retrying authorise after a transient failure");
                last_err = Some(EngineError::Retryable(msg));
            }
            Err(err) => return Err(err),
        }
    }

    Err(EngineError::Internal(format!(
        "authorise exhausted its retry budget: {}",
        last_err.map(|e| e.to_string()).unwrap_or_default()
    )))
}

async fn try_authorise_once(
    store: &LedgerStore,
    operator_id: OperatorId,
    app_code: &str,
    site_id: SiteId,
    player_count: i32,
) -> Result<AuthoriseResult, EngineError> {
    let app_code = app_code.to_string();

    store
        .with_tx(move |tx| {
            Box::pin(async move {
                let now = Utc::now();

                let (_operator, resolved) =
                    rules::check_for_operator(tx, operator_id, &app_code, site_id, player_count, now)
                        .await?;

                // Step 5: idempotency window.
                if let Some(existing) = usage::find_usage_by_business_key(
                    tx,
                    operator_id,
                    resolved.application_id,
                    site_id,
                    player_count,
                    now,
                    IDEMPOTENCY_WINDOW_SECS,
                )
                .await?
                {
                    let balance_after = operator::find_by_id(tx, operator_id).await?.balance();
                    let unit_price = existing.unit_price();
                    let total_cost = existing.total_cost();
                    return Ok(AuthoriseResult {
                        session_id: existing.session_id,
                        app_name: resolved.app_name,
                        player_count: existing.player_count,
                        unit_price,
                        total_cost,
                        balance_after,
                        authorized_at: existing.authorized_at,
                        replayed: true,
                    });
                }

                // Steps 6-9: generate session id, debit, insert records.
                let session_id = crate::session_id::generate(operator_id, now.timestamp_millis());
                let balance_before = resolved.current_balance;
                let balance_after = balance_before - resolved.total_cost;

                operator::apply_balance_delta(
                    tx,
                    operator_id,
                    -resolved.total_cost.as_decimal(),
                    rust_decimal::Decimal::ZERO,
                    resolved.total_cost.as_decimal(),
                    rust_decimal::Decimal::ZERO,
                )
                .await?;

                let usage_record_id = UsageRecordId::generate();
                let (usage_row, _txn_row) = usage::insert_usage_and_transaction(
                    tx,
                    NewUsageRecord {
                        usage_record_id,
                        session_id: session_id.clone(),
                        operator_id,
                        application_id: resolved.application_id,
                        site_id,
                        player_count,
                        unit_price: resolved.unit_price,
                        total_cost: resolved.total_cost,
                        authorized_at: now,
                    },
                    NewTransaction {
                        transaction_id: TransactionId::generate(),
                        operator_id,
                        transaction_type: TransactionType::Consumption,
                        amount: -resolved.total_cost,
                        balance_before,
                        balance_after,
                        description: format!("game session {session_id}"),
                        related_id: Some(usage_record_id.as_uuid()),
                    },
                )
                .await?;

                let unit_price = usage_row.unit_price();
                let total_cost = usage_row.total_cost();
                Ok(AuthoriseResult {
                    session_id: usage_row.session_id,
                    app_name: resolved.app_name,
                    player_count: usage_row.player_count,
                    unit_price,
                    total_cost,
                    balance_after,
                    authorized_at: usage_row.authorized_at,
                    replayed: false,
                })
            })
        })
        .await
}

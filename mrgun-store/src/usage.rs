//! UsageRecord persistence: the idempotency-window lookup, the atomic
//! insert-with-transaction used by authorise, and the overwrite-semantics
//! session upload (§4.1, §4.4).

use chrono::{DateTime, Utc};
use mrgun_common::{
    ids::{ApplicationId, OperatorId, SiteId, UsageRecordId},
    Money,
};
use serde_json::Value;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{GameSessionRow, HeadsetGameRecordRow, TransactionRow, UsageRecordRow},
    transaction::NewTransaction,
};

pub struct NewUsageRecord {
    pub usage_record_id: UsageRecordId,
    pub session_id: String,
    pub operator_id: OperatorId,
    pub application_id: ApplicationId,
    pub site_id: SiteId,
    pub player_count: i32,
    pub unit_price: Money,
    pub total_cost: Money,
    pub authorized_at: DateTime<Utc>,
}

/// §4.1 `FindUsageByBusinessKey`: the business key is
/// `(operator_id, application_id, site_id, player_count)`; a match must have
/// `authorized_at` within the 30 s window ending at `now` (§5's "measured
/// from `authorized_at`... to the current server wall-clock").
pub async fn find_usage_by_business_key(
    tx: &mut Transaction<'_, Postgres>,
    operator_id: OperatorId,
    application_id: ApplicationId,
    site_id: SiteId,
    player_count: i32,
    now: DateTime<Utc>,
    window_secs: i64,
) -> Result<Option<UsageRecordRow>, StoreError> {
    sqlx::query_as::<_, UsageRecordRow>(
        r#"
        SELECT usage_record_id, session_id, operator_id, application_id, site_id,
               player_count, unit_price, total_cost, authorized_at
        FROM usage_records
        WHERE operator_id = $1 AND application_id = $2 AND site_id = $3 AND player_count = $4
          AND authorized_at <= $5
          AND authorized_at >= $5 - make_interval(secs => $6::double precision)
        ORDER BY authorized_at DESC
        LIMIT 1
        "#,
    )
    .bind(operator_id.as_uuid())
    .bind(application_id.as_uuid())
    .bind(site_id.as_uuid())
    .bind(player_count)
    .bind(now)
    .bind(window_secs as f64)
    .fetch_optional(&mut **tx)
    .await
    .map_err(StoreError::from)
}

/// §4.1 `InsertUsageAndTransaction`. Fails with [`StoreError::SessionConflict`]
/// on a `session_id` unique-constraint violation so C4 can retry generation.
pub async fn insert_usage_and_transaction(
    tx: &mut Transaction<'_, Postgres>,
    usage: NewUsageRecord,
    txn: NewTransaction,
) -> Result<(UsageRecordRow, TransactionRow), StoreError> {
    let usage_row = sqlx::query_as::<_, UsageRecordRow>(
        r#"
        INSERT INTO usage_records
            (usage_record_id, session_id, operator_id, application_id, site_id,
             player_count, unit_price, total_cost, authorized_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING usage_record_id, session_id, operator_id, application_id, site_id,
                  player_count, unit_price, total_cost, authorized_at
        "#,
    )
    .bind(usage.usage_record_id.as_uuid())
    .bind(&usage.session_id)
    .bind(usage.operator_id.as_uuid())
    .bind(usage.application_id.as_uuid())
    .bind(usage.site_id.as_uuid())
    .bind(usage.player_count)
    .bind(usage.unit_price.as_decimal())
    .bind(usage.total_cost.as_decimal())
    .bind(usage.authorized_at)
    .fetch_one(&mut **tx)
    .await
    .map_err(session_conflict_or)?;

    let txn_row = crate::transaction::insert_transaction(tx, txn).await?;

    Ok((usage_row, txn_row))
}

fn session_conflict_or(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::SessionConflict;
        }
    }
    StoreError::from(err)
}

pub async fn find_usage_by_session_id(
    tx: &mut Transaction<'_, Postgres>,
    session_id: &str,
) -> Result<Option<UsageRecordRow>, StoreError> {
    sqlx::query_as::<_, UsageRecordRow>(
        r#"
        SELECT usage_record_id, session_id, operator_id, application_id, site_id,
               player_count, unit_price, total_cost, authorized_at
        FROM usage_records
        WHERE session_id = $1
        "#,
    )
    .bind(session_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(StoreError::from)
}

pub struct NewHeadsetGameRecord {
    pub device_id: String,
    pub device_name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub process_info: Option<Value>,
}

/// §4.1 `UpsertGameSession`: delete the prior GameSession + HeadsetGameRecord
/// set, then insert the new one, all inside the caller's transaction --
/// whole-payload replace, never a merge (§4.4 session-upload algorithm).
pub async fn upsert_game_session(
    tx: &mut Transaction<'_, Postgres>,
    usage_record_id: Uuid,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    process_info: Option<Value>,
    headsets: Vec<NewHeadsetGameRecord>,
) -> Result<(GameSessionRow, Vec<HeadsetGameRecordRow>), StoreError> {
    sqlx::query("DELETE FROM headset_game_records WHERE usage_record_id = $1")
        .bind(usage_record_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM game_sessions WHERE usage_record_id = $1")
        .bind(usage_record_id)
        .execute(&mut **tx)
        .await?;

    let session = sqlx::query_as::<_, GameSessionRow>(
        r#"
        INSERT INTO game_sessions (usage_record_id, start_time, end_time, process_info)
        VALUES ($1, $2, $3, $4)
        RETURNING usage_record_id, start_time, end_time, process_info
        "#,
    )
    .bind(usage_record_id)
    .bind(start_time)
    .bind(end_time)
    .bind(process_info)
    .fetch_one(&mut **tx)
    .await?;

    let mut inserted = Vec::with_capacity(headsets.len());
    for h in headsets {
        let row = sqlx::query_as::<_, HeadsetGameRecordRow>(
            r#"
            INSERT INTO headset_game_records
                (usage_record_id, device_id, device_name, start_time, end_time, process_info)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING usage_record_id, device_id, device_name, start_time, end_time, process_info
            "#,
        )
        .bind(usage_record_id)
        .bind(&h.device_id)
        .bind(&h.device_name)
        .bind(h.start_time)
        .bind(h.end_time)
        .bind(&h.process_info)
        .fetch_one(&mut **tx)
        .await?;
        inserted.push(row);
    }

    Ok((session, inserted))
}

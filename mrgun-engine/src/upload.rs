//! Session upload (§4.4 "Session upload algorithm"): attaches post-game
//! telemetry to an existing UsageRecord using overwrite semantics.

use chrono::{DateTime, Utc};
use mrgun_common::ids::OperatorId;
use mrgun_store::{
    models::{GameSessionRow, HeadsetGameRecordRow},
    usage::{self, NewHeadsetGameRecord},
    LedgerStore,
};
use serde_json::Value;

use crate::error::EngineError;

pub struct HeadsetDeviceUpload {
    pub device_id: String,
    pub device_name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub process_info: Option<Value>,
}

pub struct UploadResult {
    pub game_session: GameSessionRow,
    pub headsets: Vec<HeadsetGameRecordRow>,
}

pub async fn upload_session(
    store: &LedgerStore,
    operator_id: OperatorId,
    session_id: &str,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    process_info: Option<Value>,
    headsets: Vec<HeadsetDeviceUpload>,
) -> Result<UploadResult, EngineError> {
    let session_id = session_id.to_string();

    store
        .with_tx(move |tx| {
            Box::pin(async move {
                let usage_row = usage::find_usage_by_session_id(tx, &session_id)
                    .await?
                    .ok_or(EngineError::SessionNotFound)?;

                if usage_row.operator_id() != operator_id {
                    return Err(EngineError::SessionAccessDenied);
                }

                let new_records = headsets
                    .into_iter()
                    .map(|h| NewHeadsetGameRecord {
                        device_id: h.device_id,
                        device_name: h.device_name,
                        start_time: h.start_time,
                        end_time: h.end_time,
                        process_info: h.process_info,
                    })
                    .collect();

                let (game_session, headsets) = usage::upsert_game_session(
                    tx,
                    usage_row.usage_record_id,
                    start_time,
                    end_time,
                    process_info,
                    new_records,
                )
                .await?;

                Ok(UploadResult { game_session, headsets })
            })
        })
        .await
}

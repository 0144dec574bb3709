//! ApplicationRequest lifecycle (§3, §4.5): apply -> approve (creates/updates
//! the ApplicationAuthorisation grant) or reject (terminal, with
//! `admin_note`).

use mrgun_common::ids::{ApplicationId, ApplicationRequestId, OperatorId};
use mrgun_store::{
    application,
    backoffice,
    models::{ApplicationRequestRow, ApplicationRequestStatus},
    LedgerStore,
};
use uuid::Uuid;

use crate::error::BackofficeError;

pub async fn apply_request(
    store: &LedgerStore,
    operator_id: OperatorId,
    application_id: ApplicationId,
    reason: String,
) -> Result<ApplicationRequestRow, BackofficeError> {
    let request_id = ApplicationRequestId::generate();
    store
        .with_tx(move |tx| {
            Box::pin(async move {
                backoffice::insert_application_request(
                    tx,
                    request_id,
                    operator_id,
                    application_id.as_uuid(),
                    &reason,
                )
                .await
                .map_err(BackofficeError::from)
            })
        })
        .await
}

pub async fn approve_request(
    store: &LedgerStore,
    request_id: ApplicationRequestId,
    reviewer_id: Uuid,
    admin_note: Option<String>,
) -> Result<ApplicationRequestRow, BackofficeError> {
    store
        .with_tx(move |tx| {
            Box::pin(async move {
                let request = backoffice::lock_application_request_for_update(tx, request_id).await?;
                if request.status != ApplicationRequestStatus::Pending {
                    return Err(BackofficeError::InvalidState);
                }

                let operator_id = OperatorId::new(request.operator_id);
                let application_id = ApplicationId::new(request.application_id);
                application::upsert_authorisation(tx, operator_id, application_id).await?;

                backoffice::transition_application_request(
                    tx,
                    request_id,
                    ApplicationRequestStatus::Approved,
                    reviewer_id,
                    admin_note,
                )
                .await
                .map_err(BackofficeError::from)
            })
        })
        .await
}

pub async fn reject_request(
    store: &LedgerStore,
    request_id: ApplicationRequestId,
    reviewer_id: Uuid,
    admin_note: Option<String>,
) -> Result<ApplicationRequestRow, BackofficeError> {
    store
        .with_tx(move |tx| {
            Box::pin(async move {
                let request = backoffice::lock_application_request_for_update(tx, request_id).await?;
                if request.status != ApplicationRequestStatus::Pending {
                    return Err(BackofficeError::InvalidState);
                }
                backoffice::transition_application_request(
                    tx,
                    request_id,
                    ApplicationRequestStatus::Rejected,
                    reviewer_id,
                    admin_note,
                )
                .await
                .map_err(BackofficeError::from)
            })
        })
        .await
}

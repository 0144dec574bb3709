//! Invoice lifecycle (§3, §4.5): apply -> approve/reject -> issue. No
//! balance movement at any stage.

use mrgun_common::{ids::OperatorId, Money};
use mrgun_store::{
    backoffice,
    models::{InvoiceRow, InvoiceStatus, InvoiceType},
    LedgerStore,
};
use crate::error::BackofficeError;

pub async fn apply_invoice(
    store: &LedgerStore,
    operator_id: OperatorId,
    invoice_type: InvoiceType,
    amount: Money,
    buyer_tax_info: Option<String>,
) -> Result<InvoiceRow, BackofficeError> {
    let invoice_id = mrgun_common::ids::InvoiceId::generate();
    store
        .with_tx(move |tx| {
            Box::pin(async move {
                backoffice::insert_invoice(tx, invoice_id, operator_id, invoice_type, amount, buyer_tax_info)
                    .await
                    .map_err(BackofficeError::from)
            })
        })
        .await
}

pub async fn approve_invoice(
    store: &LedgerStore,
    invoice_id: mrgun_common::ids::InvoiceId,
    invoice_number: String,
) -> Result<InvoiceRow, BackofficeError> {
    store
        .with_tx(move |tx| {
            Box::pin(async move {
                let invoice = backoffice::lock_invoice_for_update(tx, invoice_id).await?;
                if invoice.status != InvoiceStatus::Pending {
                    return Err(BackofficeError::InvalidState);
                }
                backoffice::transition_invoice(
                    tx,
                    invoice_id,
                    InvoiceStatus::Approved,
                    Some(invoice_number),
                    None,
                )
                .await
                .map_err(BackofficeError::from)
            })
        })
        .await
}

pub async fn reject_invoice(
    store: &LedgerStore,
    invoice_id: mrgun_common::ids::InvoiceId,
) -> Result<InvoiceRow, BackofficeError> {
    store
        .with_tx(move |tx| {
            Box::pin(async move {
                let invoice = backoffice::lock_invoice_for_update(tx, invoice_id).await?;
                if invoice.status != InvoiceStatus::Pending {
                    return Err(BackofficeError::InvalidState);
                }
                backoffice::transition_invoice(tx, invoice_id, InvoiceStatus::Rejected, None, None)
                    .await
                    .map_err(BackofficeError::from)
            })
        })
        .await
}

/// approved -> issued, once a PDF URL exists (§4.5 "issued later... when a
/// PDF is attached").
pub async fn issue_invoice(
    store: &LedgerStore,
    invoice_id: mrgun_common::ids::InvoiceId,
    invoice_url: String,
) -> Result<InvoiceRow, BackofficeError> {
    store
        .with_tx(move |tx| {
            Box::pin(async move {
                let invoice = backoffice::lock_invoice_for_update(tx, invoice_id).await?;
                if invoice.status != InvoiceStatus::Approved {
                    return Err(BackofficeError::InvalidState);
                }
                backoffice::transition_invoice(
                    tx,
                    invoice_id,
                    InvoiceStatus::Issued,
                    None,
                    Some(invoice_url),
                )
                .await
                .map_err(BackofficeError::from)
            })
        })
        .await
}

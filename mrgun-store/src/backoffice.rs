//! Persistence for the C5 state machines: refunds, invoices, application
//! requests, and recharge orders. Transition legality itself lives in
//! `mrgun-backoffice`; this module only does the row reads/writes.

use mrgun_common::{
    ids::{ApplicationRequestId, InvoiceId, OperatorId, RechargeOrderId, RefundId},
    Money,
};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{
        ApplicationRequestRow, ApplicationRequestStatus, InvoiceRow, InvoiceStatus, InvoiceType,
        RechargeOrderRow, RechargeOrderStatus, RefundRow, RefundStatus,
    },
};

// --- Refund --- //

pub async fn insert_refund(
    tx: &mut Transaction<'_, Postgres>,
    refund_id: RefundId,
    operator_id: OperatorId,
    requested_amount: Money,
    reason: &str,
) -> Result<RefundRow, StoreError> {
    sqlx::query_as::<_, RefundRow>(
        r#"
        INSERT INTO refunds (refund_id, operator_id, requested_amount, reason, status)
        VALUES ($1, $2, $3, $4, 'pending')
        RETURNING refund_id, operator_id, requested_amount, reason, status, reviewer_id, admin_note
        "#,
    )
    .bind(refund_id.as_uuid())
    .bind(operator_id.as_uuid())
    .bind(requested_amount.as_decimal())
    .bind(reason)
    .fetch_one(&mut **tx)
    .await
    .map_err(StoreError::from)
}

pub async fn lock_refund_for_update(
    tx: &mut Transaction<'_, Postgres>,
    refund_id: RefundId,
) -> Result<RefundRow, StoreError> {
    sqlx::query_as::<_, RefundRow>(
        r#"
        SELECT refund_id, operator_id, requested_amount, reason, status, reviewer_id, admin_note
        FROM refunds WHERE refund_id = $1 FOR UPDATE
        "#,
    )
    .bind(refund_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(StoreError::RefundNotFound)
}

pub async fn transition_refund(
    tx: &mut Transaction<'_, Postgres>,
    refund_id: RefundId,
    status: RefundStatus,
    reviewer_id: Option<Uuid>,
    admin_note: Option<String>,
) -> Result<RefundRow, StoreError> {
    sqlx::query_as::<_, RefundRow>(
        r#"
        UPDATE refunds
        SET status = $2, reviewer_id = $3, admin_note = $4
        WHERE refund_id = $1
        RETURNING refund_id, operator_id, requested_amount, reason, status, reviewer_id, admin_note
        "#,
    )
    .bind(refund_id.as_uuid())
    .bind(status)
    .bind(reviewer_id)
    .bind(admin_note)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(StoreError::RefundNotFound)
}

// --- Invoice --- //

pub async fn insert_invoice(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: InvoiceId,
    operator_id: OperatorId,
    invoice_type: InvoiceType,
    amount: Money,
    buyer_tax_info: Option<String>,
) -> Result<InvoiceRow, StoreError> {
    sqlx::query_as::<_, InvoiceRow>(
        r#"
        INSERT INTO invoices (invoice_id, operator_id, invoice_type, amount, buyer_tax_info, status)
        VALUES ($1, $2, $3, $4, $5, 'pending')
        RETURNING invoice_id, operator_id, invoice_type, amount, buyer_tax_info, status,
                  invoice_number, invoice_url
        "#,
    )
    .bind(invoice_id.as_uuid())
    .bind(operator_id.as_uuid())
    .bind(invoice_type)
    .bind(amount.as_decimal())
    .bind(buyer_tax_info)
    .fetch_one(&mut **tx)
    .await
    .map_err(StoreError::from)
}

pub async fn lock_invoice_for_update(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: InvoiceId,
) -> Result<InvoiceRow, StoreError> {
    sqlx::query_as::<_, InvoiceRow>(
        r#"
        SELECT invoice_id, operator_id, invoice_type, amount, buyer_tax_info, status,
               invoice_number, invoice_url
        FROM invoices WHERE invoice_id = $1 FOR UPDATE
        "#,
    )
    .bind(invoice_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(StoreError::InvoiceNotFound)
}

pub async fn transition_invoice(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: InvoiceId,
    status: InvoiceStatus,
    invoice_number: Option<String>,
    invoice_url: Option<String>,
) -> Result<InvoiceRow, StoreError> {
    sqlx::query_as::<_, InvoiceRow>(
        r#"
        UPDATE invoices
        SET status = $2,
            invoice_number = COALESCE($3, invoice_number),
            invoice_url = COALESCE($4, invoice_url)
        WHERE invoice_id = $1
        RETURNING invoice_id, operator_id, invoice_type, amount, buyer_tax_info, status,
                  invoice_number, invoice_url
        "#,
    )
    .bind(invoice_id.as_uuid())
    .bind(status)
    .bind(invoice_number)
    .bind(invoice_url)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(StoreError::InvoiceNotFound)
}

// --- ApplicationRequest --- //

pub async fn insert_application_request(
    tx: &mut Transaction<'_, Postgres>,
    request_id: ApplicationRequestId,
    operator_id: OperatorId,
    application_id: Uuid,
    reason: &str,
) -> Result<ApplicationRequestRow, StoreError> {
    sqlx::query_as::<_, ApplicationRequestRow>(
        r#"
        INSERT INTO application_requests (request_id, operator_id, application_id, reason, status)
        VALUES ($1, $2, $3, $4, 'pending')
        RETURNING request_id, operator_id, application_id, reason, status, reviewer_id,
                  reviewed_at, admin_note
        "#,
    )
    .bind(request_id.as_uuid())
    .bind(operator_id.as_uuid())
    .bind(application_id)
    .bind(reason)
    .fetch_one(&mut **tx)
    .await
    .map_err(StoreError::from)
}

pub async fn lock_application_request_for_update(
    tx: &mut Transaction<'_, Postgres>,
    request_id: ApplicationRequestId,
) -> Result<ApplicationRequestRow, StoreError> {
    sqlx::query_as::<_, ApplicationRequestRow>(
        r#"
        SELECT request_id, operator_id, application_id, reason, status, reviewer_id,
               reviewed_at, admin_note
        FROM application_requests WHERE request_id = $1 FOR UPDATE
        "#,
    )
    .bind(request_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(StoreError::ApplicationRequestNotFound)
}

pub async fn transition_application_request(
    tx: &mut Transaction<'_, Postgres>,
    request_id: ApplicationRequestId,
    status: ApplicationRequestStatus,
    reviewer_id: Uuid,
    admin_note: Option<String>,
) -> Result<ApplicationRequestRow, StoreError> {
    sqlx::query_as::<_, ApplicationRequestRow>(
        r#"
        UPDATE application_requests
        SET status = $2, reviewer_id = $3, reviewed_at = NOW(), admin_note = $4
        WHERE request_id = $1
        RETURNING request_id, operator_id, application_id, reason, status, reviewer_id,
                  reviewed_at, admin_note
        "#,
    )
    .bind(request_id.as_uuid())
    .bind(status)
    .bind(reviewer_id)
    .bind(admin_note)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(StoreError::ApplicationRequestNotFound)
}

// --- RechargeOrder --- //

pub async fn lock_recharge_order_for_update(
    tx: &mut Transaction<'_, Postgres>,
    order_id: RechargeOrderId,
) -> Result<RechargeOrderRow, StoreError> {
    sqlx::query_as::<_, RechargeOrderRow>(
        r#"
        SELECT order_id, operator_id, amount, payment_method, status, expires_at
        FROM recharge_orders WHERE order_id = $1 FOR UPDATE
        "#,
    )
    .bind(order_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(StoreError::RechargeOrderNotFound)
}

pub async fn mark_recharge_order_paid(
    tx: &mut Transaction<'_, Postgres>,
    order_id: RechargeOrderId,
) -> Result<RechargeOrderRow, StoreError> {
    sqlx::query_as::<_, RechargeOrderRow>(
        r#"
        UPDATE recharge_orders SET status = 'paid'
        WHERE order_id = $1
        RETURNING order_id, operator_id, amount, payment_method, status, expires_at
        "#,
    )
    .bind(order_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(StoreError::RechargeOrderNotFound)
}

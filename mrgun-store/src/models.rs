//! Row types for every entity in §3. Each maps 1:1 onto a table and derives
//! `sqlx::FromRow`; no `query!`/`query_as!` macros are used anywhere in this
//! crate, since that would require a live `DATABASE_URL` to even build.

use std::fmt;

use chrono::{DateTime, Utc};
use mrgun_common::{
    ids::{
        AdminId, ApplicationId, ApplicationRequestId, InvoiceId, OperatorId, RechargeOrderId,
        RefundId, SiteId, TransactionId, UsageRecordId,
    },
    role::AdminRole,
    Money,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Renders a `#[serde(rename_all = "snake_case")]` enum's wire string by
/// round-tripping it through `serde_json`, so the view DTOs' `status`/`type`
/// strings never drift from what the JSON API already serialises.
fn snake_case_str<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => unreachable!("status/type enums always serialise to a JSON string"),
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct OperatorRow {
    pub operator_id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub balance: rust_decimal::Decimal,
    pub total_recharged: rust_decimal::Decimal,
    pub total_consumed: rust_decimal::Decimal,
    pub total_refunded: rust_decimal::Decimal,
    pub customer_tier: String,
    pub is_active: bool,
    pub is_locked: bool,
    pub lock_reason: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,
}

impl OperatorRow {
    pub fn id(&self) -> OperatorId {
        OperatorId::new(self.operator_id)
    }

    pub fn balance(&self) -> Money {
        Money::new(self.balance)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AdminRow {
    pub admin_id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: String,
    pub is_active: bool,
}

impl AdminRow {
    pub fn id(&self) -> AdminId {
        AdminId::new(self.admin_id)
    }

    /// `role` is stored as its `snake_case` serde name; a row written by this
    /// same service always round-trips, so a parse failure here means the
    /// database itself is corrupt.
    pub fn role(&self) -> AdminRole {
        serde_json::from_value(serde_json::Value::String(self.role.clone()))
            .expect("admin role column holds an unrecognised value")
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub application_id: Uuid,
    pub app_code: String,
    pub app_name: String,
    pub unit_price: rust_decimal::Decimal,
    pub min_players: i32,
    pub max_players: i32,
    pub is_active: bool,
}

impl ApplicationRow {
    pub fn id(&self) -> ApplicationId {
        ApplicationId::new(self.application_id)
    }

    pub fn unit_price(&self) -> Money {
        Money::new(self.unit_price)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SiteRow {
    pub site_id: Uuid,
    pub operator_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SiteRow {
    pub fn id(&self) -> SiteId {
        SiteId::new(self.site_id)
    }

    pub fn operator_id(&self) -> OperatorId {
        OperatorId::new(self.operator_id)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationAuthorisationRow {
    pub operator_id: Uuid,
    pub application_id: Uuid,
    pub granted_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApplicationRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&snake_case_str(self))
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRequestRow {
    pub request_id: Uuid,
    pub operator_id: Uuid,
    pub application_id: Uuid,
    pub reason: String,
    pub status: ApplicationRequestStatus,
    pub reviewer_id: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_note: Option<String>,
}

impl ApplicationRequestRow {
    pub fn id(&self) -> ApplicationRequestId {
        ApplicationRequestId::new(self.request_id)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UsageRecordRow {
    pub usage_record_id: Uuid,
    pub session_id: String,
    pub operator_id: Uuid,
    pub application_id: Uuid,
    pub site_id: Uuid,
    pub player_count: i32,
    pub unit_price: rust_decimal::Decimal,
    pub total_cost: rust_decimal::Decimal,
    pub authorized_at: DateTime<Utc>,
}

impl UsageRecordRow {
    pub fn id(&self) -> UsageRecordId {
        UsageRecordId::new(self.usage_record_id)
    }

    pub fn operator_id(&self) -> OperatorId {
        OperatorId::new(self.operator_id)
    }

    pub fn total_cost(&self) -> Money {
        Money::new(self.total_cost)
    }

    pub fn unit_price(&self) -> Money {
        Money::new(self.unit_price)
    }
}

/// Embedded post-game telemetry (§3, §4.4's overwrite-semantics upload).
#[derive(Debug, Clone, FromRow)]
pub struct GameSessionRow {
    pub usage_record_id: Uuid,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub process_info: Option<serde_json::Value>,
}

#[derive(Debug, Clone, FromRow)]
pub struct HeadsetGameRecordRow {
    pub usage_record_id: Uuid,
    pub device_id: String,
    pub device_name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub process_info: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Recharge,
    Consumption,
    Refund,
    Adjustment,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&snake_case_str(self))
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TransactionRow {
    pub transaction_id: Uuid,
    pub operator_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: rust_decimal::Decimal,
    pub balance_before: rust_decimal::Decimal,
    pub balance_after: rust_decimal::Decimal,
    pub description: String,
    pub related_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRow {
    pub fn id(&self) -> TransactionId {
        TransactionId::new(self.transaction_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RechargeOrderStatus {
    Pending,
    Paid,
    Cancelled,
    Expired,
}

#[derive(Debug, Clone, FromRow)]
pub struct RechargeOrderRow {
    pub order_id: Uuid,
    pub operator_id: Uuid,
    pub amount: rust_decimal::Decimal,
    pub payment_method: String,
    pub status: RechargeOrderStatus,
    pub expires_at: DateTime<Utc>,
}

impl RechargeOrderRow {
    pub fn id(&self) -> RechargeOrderId {
        RechargeOrderId::new(self.order_id)
    }

    pub fn amount(&self) -> Money {
        Money::new(self.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&snake_case_str(self))
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RefundRow {
    pub refund_id: Uuid,
    pub operator_id: Uuid,
    pub requested_amount: rust_decimal::Decimal,
    pub reason: String,
    pub status: RefundStatus,
    pub reviewer_id: Option<Uuid>,
    pub admin_note: Option<String>,
}

impl RefundRow {
    pub fn id(&self) -> RefundId {
        RefundId::new(self.refund_id)
    }

    pub fn requested_amount(&self) -> Money {
        Money::new(self.requested_amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    Regular,
    Vat,
}

impl fmt::Display for InvoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&snake_case_str(self))
    }
}

impl std::str::FromStr for InvoiceType {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Approved,
    Rejected,
    Issued,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&snake_case_str(self))
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRow {
    pub invoice_id: Uuid,
    pub operator_id: Uuid,
    pub invoice_type: InvoiceType,
    pub amount: rust_decimal::Decimal,
    pub buyer_tax_info: Option<String>,
    pub status: InvoiceStatus,
    pub invoice_number: Option<String>,
    pub invoice_url: Option<String>,
}

impl InvoiceRow {
    pub fn id(&self) -> InvoiceId {
        InvoiceId::new(self.invoice_id)
    }

    pub fn amount(&self) -> Money {
        Money::new(self.amount)
    }
}

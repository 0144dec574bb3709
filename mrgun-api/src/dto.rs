//! Wire request/response DTOs for the endpoints in §6. All money fields are
//! [`Money`] (fixed 2-d.p. decimal strings); all timestamps are [`Timestamp`]
//! (ISO-8601 UTC, millisecond precision).

use mrgun_common::{money::Money, role::AdminRole, time::Timestamp};
use serde::{Deserialize, Serialize};

// --- auth --- //

#[derive(Debug, Deserialize)]
pub struct OperatorLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct OperatorSummary {
    pub operator_id: String,
    pub username: String,
    pub display_name: String,
    pub balance: Money,
}

#[derive(Debug, Serialize)]
pub struct OperatorLoginResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub operator: OperatorSummary,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminSummary {
    pub id: String,
    pub role: AdminRole,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub user: AdminSummary,
}

/// The operator UI's "launch application" action; mints a headset token
/// bound to the (operator, application, site) tuple (§4.2).
#[derive(Debug, Deserialize)]
pub struct LaunchHeadsetRequest {
    pub app_code: String,
    pub site_id: String,
}

#[derive(Debug, Serialize)]
pub struct LaunchHeadsetResponse {
    pub headset_token: String,
    pub expires_in: u64,
}

// --- game auth (C3 / C4) --- //

#[derive(Debug, Deserialize)]
pub struct GameAuthRequest {
    pub app_code: String,
    pub site_id: String,
    pub player_count: u32,
    #[serde(default)]
    pub headset_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PreAuthorizeResponse {
    pub can_authorize: bool,
    pub app_name: String,
    pub unit_price: Money,
    pub total_cost: Money,
    pub current_balance: Money,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub session_id: String,
    pub app_name: String,
    pub player_count: u32,
    pub unit_price: Money,
    pub total_cost: Money,
    pub balance_after: Money,
    pub authorized_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct HeadsetDeviceUpload {
    pub device_id: String,
    pub device_name: String,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    #[serde(default)]
    pub process_info: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct SessionUploadRequest {
    pub session_id: String,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    #[serde(default)]
    pub process_info: Option<serde_json::Value>,
    #[serde(default)]
    pub headset_devices: Vec<HeadsetDeviceUpload>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// --- operator self-service --- //

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: Money,
    pub total_recharged: Money,
    pub total_consumed: Money,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct TransactionView {
    pub transaction_id: String,
    pub transaction_type: String,
    pub amount: Money,
    pub balance_before: Money,
    pub balance_after: Money,
    pub description: String,
    pub related_id: Option<String>,
    pub created_at: Timestamp,
}

// --- refunds --- //

#[derive(Debug, Deserialize)]
pub struct RefundApplyRequest {
    pub amount: Option<Money>,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RefundReviewRequest {
    pub admin_note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefundRejectRequest {
    pub reject_reason: String,
}

#[derive(Debug, Serialize)]
pub struct RefundView {
    pub refund_id: String,
    pub operator_id: String,
    pub requested_amount: Money,
    pub reason: String,
    pub status: String,
    pub reviewer_id: Option<String>,
    pub admin_note: Option<String>,
}

// --- invoices --- //

#[derive(Debug, Deserialize)]
pub struct InvoiceApplyRequest {
    pub invoice_type: String,
    pub amount: Money,
    pub buyer_tax_info: String,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceIssueRequest {
    pub invoice_number: String,
    pub invoice_url: String,
}

#[derive(Debug, Serialize)]
pub struct InvoiceView {
    pub invoice_id: String,
    pub operator_id: String,
    pub invoice_type: String,
    pub amount: Money,
    pub status: String,
    pub invoice_number: Option<String>,
    pub invoice_url: Option<String>,
}

// --- application requests --- //

#[derive(Debug, Deserialize)]
pub struct ApplicationRequestApplyRequest {
    pub application_id: String,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationRequestReviewRequest {
    pub admin_note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationRequestView {
    pub request_id: String,
    pub operator_id: String,
    pub application_id: String,
    pub status: String,
}

// --- admin balance adjustment --- //

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentDirection {
    Add,
    Subtract,
}

#[derive(Debug, Deserialize)]
pub struct BalanceAdjustmentRequest {
    #[serde(rename = "type")]
    pub direction: AdjustmentDirection,
    pub amount: Money,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceAdjustmentResponse {
    pub balance_after: Money,
    pub transaction_id: String,
}

// --- recharge webhook --- //

#[derive(Debug, Deserialize)]
pub struct RechargeCallbackRequest {
    pub order_id: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct RechargeCallbackResponse {
    pub acknowledged: bool,
}

// --- health --- //

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

//! Closed failure taxonomy for C5 (§7): every state-machine transition from
//! a terminal state fails with `InvalidState`; everything else maps onto a
//! 404 "not found" or `Internal`.

use mrgun_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum BackofficeError {
    #[error("operator not found")]
    OperatorNotFound,
    #[error("refund not found")]
    RefundNotFound,
    #[error("invoice not found")]
    InvoiceNotFound,
    #[error("application request not found")]
    ApplicationRequestNotFound,
    #[error("recharge order not found")]
    RechargeOrderNotFound,
    #[error("state transition is illegal from the current state")]
    InvalidState,
    #[error("subtracting this amount would drive the balance below zero")]
    InsufficientBalance,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for BackofficeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OperatorNotFound => BackofficeError::OperatorNotFound,
            StoreError::RefundNotFound => BackofficeError::RefundNotFound,
            StoreError::InvoiceNotFound => BackofficeError::InvoiceNotFound,
            StoreError::ApplicationRequestNotFound => BackofficeError::ApplicationRequestNotFound,
            StoreError::RechargeOrderNotFound => BackofficeError::RechargeOrderNotFound,
            other => BackofficeError::Internal(other.to_string()),
        }
    }
}

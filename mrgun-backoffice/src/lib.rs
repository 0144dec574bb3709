//! Back-office state machines (C5): balance adjustments, refunds, invoices,
//! application requests, and recharge-order settlement.

pub mod adjustment;
pub mod application_request;
pub mod error;
pub mod invoice;
pub mod recharge;
pub mod refund;

pub use error::BackofficeError;

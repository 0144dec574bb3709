//! Authorisation Engine (C3) and Billing Engine (C4): the pure rule
//! pipeline and the atomic debit/idempotency/retry algorithm built on top
//! of `mrgun-store`.

pub mod authorise;
pub mod error;
pub mod rules;
pub mod session_id;
pub mod upload;

pub use authorise::{
    authorise, check_launch_eligibility, pre_authorise, AuthoriseResult, PreAuthoriseResult,
};
pub use error::EngineError;
pub use upload::{upload_session, HeadsetDeviceUpload, UploadResult};

//! Ledger Store (C1): the authoritative persistence layer. Every
//! data-mutating function here takes an open `sqlx::Transaction` as its
//! first parameter (§9 "WithTx(fn)") -- this crate never decides when to
//! commit or roll back.

pub mod admin;
pub mod application;
pub mod backoffice;
pub mod error;
pub mod models;
pub mod operator;
pub mod store;
pub mod transaction;
pub mod usage;

pub use error::StoreError;
pub use store::LedgerStore;

//! Shared value types for the MR-Gunking operations & billing core.

pub mod config;
pub mod ids;
pub mod money;
pub mod role;
pub mod time;

pub use config::Config;
pub use money::Money;
pub use time::Timestamp;

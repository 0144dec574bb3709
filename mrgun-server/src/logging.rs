//! Global `tracing` logger setup, grounded on the workspace's `logger` crate:
//! compact stdout formatter, `RUST_LOG`-driven per-target filtering,
//! defaulting to `INFO` when unset or unparsable.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{filter::Targets, layer::SubscriberExt, util::SubscriberInitExt, Layer};

pub fn init() {
    let targets = std::env::var("RUST_LOG")
        .ok()
        .and_then(|rust_log| Targets::from_str(&rust_log).ok())
        .unwrap_or_else(|| Targets::new().with_default(Level::INFO));

    let stdout_log = tracing_subscriber::fmt::layer()
        .compact()
        .with_level(true)
        .with_target(true)
        .with_filter(targets);

    tracing_subscriber::registry()
        .with(stdout_log)
        .try_init()
        .expect("logger already initialized");
}

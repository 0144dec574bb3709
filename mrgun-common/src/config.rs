//! Immutable runtime configuration, injected once at the composition root
//! (§9 "Global mutable state -> plain immutable configuration struct").

use std::time::Duration;

/// Token lifetimes per kind (§4.2).
pub const OPERATOR_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);
pub const ADMIN_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);
pub const HEADSET_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Minimum HMAC signing secret length, in bytes (§4.2).
pub const MIN_HMAC_SECRET_BYTES: usize = 32;

/// Retry budget for deadlock / serialisation-failure / session-id collision
/// (§4.4, §7).
pub const MAX_TX_RETRIES: u32 = 3;

/// Default per-request deadline (§5).
pub const REQUEST_DEADLINE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: std::net::SocketAddr,
    pub database_url: String,
    /// HMAC-SHA256 signing secret for bearer tokens. Must be at least
    /// [`MIN_HMAC_SECRET_BYTES`] bytes.
    pub token_signing_secret: Vec<u8>,
    pub max_db_connections: u32,
    /// Shared secret the recharge payment provider sends back on its
    /// callback (§4.5). Not a bearer token, so it is not part of the §4.2
    /// token scheme at all -- just a header the webhook route checks.
    pub recharge_webhook_secret: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("token signing secret must be at least {MIN_HMAC_SECRET_BYTES} bytes, got {0}")]
    SecretTooShort(usize),
}

impl Config {
    pub fn new(
        bind_addr: std::net::SocketAddr,
        database_url: String,
        token_signing_secret: Vec<u8>,
        max_db_connections: u32,
        recharge_webhook_secret: String,
    ) -> Result<Self, ConfigError> {
        if token_signing_secret.len() < MIN_HMAC_SECRET_BYTES {
            return Err(ConfigError::SecretTooShort(token_signing_secret.len()));
        }
        Ok(Self {
            bind_addr,
            database_url,
            token_signing_secret,
            max_db_connections,
            recharge_webhook_secret,
        })
    }
}

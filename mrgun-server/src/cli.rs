//! Command-line args, with environment-variable fallback for anything not
//! passed on the command line.
//!
//! Grounded on `sdk-sidecar::cli::SidecarArgs`: optional `argh` fields filled
//! in from env vars afterwards. That crate's fallback goes through a shared
//! `common::or_env::OrEnvExt` trait this workspace doesn't carry, so the
//! fallback here is a small local helper instead.

use std::{net::SocketAddr, str::FromStr};

use anyhow::{anyhow, Context};

/// The MR-Gunking operations & billing core server.
#[derive(argh::FromArgs)]
pub struct ServerArgs {
    /// the <ip-address:port> to listen on.
    ///
    /// Default: `127.0.0.1:8080`.
    /// Env: `BIND_ADDR`.
    #[argh(option)]
    pub bind_addr: Option<SocketAddr>,

    /// the Postgres connection string.
    ///
    /// Required.
    /// Env: `DATABASE_URL`.
    #[argh(option)]
    pub database_url: Option<String>,

    /// the HMAC-SHA256 bearer token signing secret, at least 32 bytes.
    ///
    /// Required.
    /// Env: `TOKEN_SIGNING_SECRET`.
    #[argh(option)]
    pub token_signing_secret: Option<String>,

    /// maximum Postgres connection pool size.
    ///
    /// Default: `10`.
    /// Env: `MAX_DB_CONNECTIONS`.
    #[argh(option)]
    pub max_db_connections: Option<u32>,

    /// the shared secret the recharge payment provider's callback must
    /// present.
    ///
    /// Required.
    /// Env: `RECHARGE_WEBHOOK_SECRET`.
    #[argh(option)]
    pub recharge_webhook_secret: Option<String>,
}

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 10;

impl ServerArgs {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut args: Self = argh::from_env();

        args.bind_addr.or_env_mut("BIND_ADDR")?;
        args.database_url.or_env_mut("DATABASE_URL")?;
        args.token_signing_secret.or_env_mut("TOKEN_SIGNING_SECRET")?;
        args.max_db_connections.or_env_mut("MAX_DB_CONNECTIONS")?;
        args.recharge_webhook_secret.or_env_mut("RECHARGE_WEBHOOK_SECRET")?;

        Ok(args)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        match &self.bind_addr {
            Some(addr) => Ok(*addr),
            None => DEFAULT_BIND_ADDR.parse().context("bad default bind addr"),
        }
    }

    pub fn database_url(&self) -> anyhow::Result<String> {
        self.database_url
            .clone()
            .ok_or_else(|| anyhow!("--database-url / DATABASE_URL is required"))
    }

    pub fn token_signing_secret(&self) -> anyhow::Result<Vec<u8>> {
        let raw = self
            .token_signing_secret
            .clone()
            .ok_or_else(|| anyhow!("--token-signing-secret / TOKEN_SIGNING_SECRET is required"))?;
        Ok(raw.into_bytes())
    }

    pub fn max_db_connections(&self) -> u32 {
        self.max_db_connections.unwrap_or(DEFAULT_MAX_DB_CONNECTIONS)
    }

    pub fn recharge_webhook_secret(&self) -> anyhow::Result<String> {
        self.recharge_webhook_secret
            .clone()
            .ok_or_else(|| anyhow!("--recharge-webhook-secret / RECHARGE_WEBHOOK_SECRET is required"))
    }
}

/// Fills `self` from an environment variable when `self` is `None` and the
/// var is set and non-empty.
trait OrEnvMut {
    fn or_env_mut(&mut self, key: &str) -> anyhow::Result<()>;
}

impl<T: FromStr> OrEnvMut for Option<T>
where
    T::Err: std::fmt::Display,
{
    fn or_env_mut(&mut self, key: &str) -> anyhow::Result<()> {
        if self.is_some() {
            return Ok(());
        }
        match std::env::var(key) {
            Ok(raw) if !raw.is_empty() => {
                let parsed = raw
                    .parse::<T>()
                    .map_err(|e| anyhow!("env var {key} did not parse: {e}"))?;
                *self = Some(parsed);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

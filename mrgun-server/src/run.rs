//! Composition root: builds the Postgres pool, the shared `AppState`, and
//! runs the HTTP server until a shutdown signal arrives.
//!
//! Grounded on `sdk_sidecar::run::Sidecar::{init, run}`'s split between
//! "assemble everything" and "drive it to completion", adapted from the
//! sidecar's task-set/ctrlc-handler shape to this service's single axum
//! server.

use std::sync::Arc;

use mrgun_api::server::{self, LayerConfig, Shutdown};
use mrgun_auth::TokenService;
use mrgun_common::Config;
use mrgun_store::LedgerStore;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::{cli::ServerArgs, routes, state::AppState};

pub async fn run(args: ServerArgs) -> anyhow::Result<()> {
    let config = Config::new(
        args.bind_addr()?,
        args.database_url()?,
        args.token_signing_secret()?,
        args.max_db_connections(),
        args.recharge_webhook_secret()?,
    )?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .connect(&config.database_url)
        .await?;

    let store = LedgerStore::new(pool);
    let tokens = TokenService::new(&config.token_signing_secret);
    let state = AppState {
        store,
        tokens,
        config: Arc::new(config),
    };

    let bind_addr = state.config.bind_addr;
    let router = routes::router(state);

    let shutdown = Shutdown::new();
    let ctrlc_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("ctrl-c received, shutting down");
        ctrlc_shutdown.send();
    });

    server::serve(bind_addr, router, LayerConfig::default(), shutdown).await
}

//! API server plumbing: the tower middleware stack (body limits, load
//! shedding, concurrency limit, request timeout) and graceful shutdown.
//!
//! Grounded on `lexe-api::server::{build_server_fut, LayerConfig}`. TLS
//! termination and edge rate limiting are external collaborators (§1), so
//! this server only ever binds plain HTTP.

use std::{future::Future, net::SocketAddr, time::Duration};

use anyhow::Context;
use axum::{error_handling::HandleErrorLayer, Router};
use tower::{
    buffer::BufferLayer, limit::ConcurrencyLimitLayer, load_shed::LoadShedLayer,
    timeout::TimeoutLayer, ServiceBuilder,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{ApiError, ApiErrorKind};

/// Mirrors `lexe_api::server::LayerConfig`'s defaults, adjusted for this
/// service's per-request deadline (§5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerConfig {
    pub body_limit: Option<usize>,
    pub load_shed: bool,
    pub buffer_size: Option<usize>,
    pub concurrency: Option<usize>,
    pub handling_timeout: Option<Duration>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            body_limit: Some(16 * 1024),
            load_shed: true,
            buffer_size: Some(4096),
            concurrency: Some(4096),
            handling_timeout: Some(mrgun_common::config::REQUEST_DEADLINE),
        }
    }
}

/// A one-shot shutdown signal. Cloning gives another sender handle; every
/// subscriber observes the signal exactly once via [`Shutdown::recv`].
#[derive(Clone)]
pub struct Shutdown {
    tx: tokio::sync::watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = tokio::sync::watch::channel(false);
        Self { tx }
    }

    pub fn send(&self) {
        let _ = self.tx.send(true);
    }

    pub async fn recv(&self) {
        let mut rx = self.tx.subscribe();
        if *rx.borrow() {
            return;
        }
        let _ = rx.changed().await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// The grace period during which new connections are refused and the server
/// waits for in-flight requests to finish before a hard shutdown.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(3);

/// Builds the layered router and serves it on `bind_addr` until `shutdown`
/// fires. Returns once the server has finished (gracefully or by timeout).
pub async fn serve(
    bind_addr: SocketAddr,
    router: Router,
    layer_config: LayerConfig,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    let middleware = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|_: tower::BoxError| async {
            ApiError::new(ApiErrorKind::Internal, "service is at capacity; retry later")
        }))
        .option_layer(layer_config.load_shed.then(LoadShedLayer::new))
        .option_layer(layer_config.buffer_size.map(BufferLayer::new))
        .option_layer(layer_config.concurrency.map(ConcurrencyLimitLayer::new))
        .layer(HandleErrorLayer::new(|_: tower::BoxError| async {
            ApiError::new(ApiErrorKind::Internal, "server timed out handling request")
        }))
        .option_layer(layer_config.handling_timeout.map(TimeoutLayer::new));

    let router = router
        .layer(axum::extract::DefaultBodyLimit::max(
            layer_config.body_limit.unwrap_or(usize::MAX),
        ))
        .layer(middleware)
        .layer(TraceLayer::new_for_http())
        .fallback(default_fallback);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .context("failed to bind listener")?;
    info!(%bind_addr, "listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal(shutdown: Shutdown) {
    shutdown.recv().await;
    info!("graceful shutdown initiated");
    tokio::time::sleep(SHUTDOWN_GRACE_PERIOD).await;
    warn!("shutdown grace period elapsed");
}

async fn default_fallback(method: axum::http::Method, uri: axum::http::Uri) -> ApiError {
    ApiError::new(ApiErrorKind::InvalidRequest, format!("no route for {method} {uri}"))
}

/// Blocking helper used by tests that want the shutdown future as a plain
/// `Future` without constructing a whole server.
pub fn wait_for(shutdown: Shutdown) -> impl Future<Output = ()> {
    async move { shutdown.recv().await }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_fires_exactly_once_per_subscriber() {
        let shutdown = Shutdown::new();
        let waiter = shutdown.clone();
        let handle = tokio::spawn(async move { waiter.recv().await });
        shutdown.send();
        handle.await.expect("recv should complete after send");
    }

    #[tokio::test]
    async fn late_subscriber_sees_already_sent_signal() {
        let shutdown = Shutdown::new();
        shutdown.send();
        tokio::time::timeout(Duration::from_millis(50), shutdown.recv())
            .await
            .expect("late subscriber should see the signal immediately");
    }
}

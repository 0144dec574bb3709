//! Shared application state injected into every handler via
//! `axum::extract::State`.

use axum::extract::FromRef;
use mrgun_auth::TokenService;
use mrgun_common::Config;
use mrgun_store::LedgerStore;

#[derive(Clone)]
pub struct AppState {
    pub store: LedgerStore,
    pub tokens: TokenService,
    pub config: std::sync::Arc<Config>,
}

impl FromRef<AppState> for LedgerStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

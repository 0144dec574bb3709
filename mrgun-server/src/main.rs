mod auth_extract;
mod cli;
mod error_map;
mod handlers;
mod logging;
mod routes;
mod run;
mod state;
mod webhook_auth;

use cli::ServerArgs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    logging::init();

    let args = ServerArgs::from_env()?;
    run::run(args).await
}

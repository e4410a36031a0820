mod api;
mod app_config;
mod cli;
mod router;
mod state;

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use cli::{Cli, Command};
use state::AppState;

async fn serve(config: &slotkeeper_core::Config, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router::build_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    slotkeeper_core::config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = app_config::load_config(cli.profile.as_deref());
    config.log_summary();

    let rotation = app_config::build_rotation(&config)?;

    match cli.command() {
        Command::Serve => serve(&config, Arc::new(AppState::new(rotation))).await?,
        Command::Shift => {
            let report = rotation.update_slots(rotation.now()).await;
            api::log_cycle(&report);
        }
        Command::Lock => {
            let outcome = rotation.lock_check(rotation.now()).await;
            api::log_lock(&outcome);
        }
    }

    Ok(())
}

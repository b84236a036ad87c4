//! Quillpress Server — application entry point.

use std::net::SocketAddr;

use quillpress_db::DbManager;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod handlers;
mod ip;
mod middleware;
mod routes;
mod state;
mod tasks;

use config::ServerConfig;
use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                "quillpress=info"
                    .parse()
                    .expect("static directive is valid"),
            ),
        )
        .json()
        .init();

    if let Err(error) = run().await {
        tracing::error!(%error, "server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let db = DbManager::connect(&config.db).await?;
    quillpress_db::run_migrations(db.client()).await?;

    let state = AppState::new(db.client().clone(), &config)?;
    let app = routes::router(state);

    tracing::info!(bind = %config.bind, "Quillpress server listening");
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

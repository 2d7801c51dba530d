//! Agencia API server.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agencia_api::{AppState, create_router};
use agencia_core::airline::AirlineDirectory;
use agencia_db::connect_with;
use agencia_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agencia=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let jwt_service = JwtService::new(&config.jwt.to_jwt_config());

    let airlines = match config.airlines.path.as_deref() {
        Some(path) => AirlineDirectory::load(path)
            .with_context(|| format!("failed to load airline directory from {path}"))?,
        None => AirlineDirectory::default(),
    };
    info!(compagnies = airlines.len(), "Airline directory loaded");

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        airlines: Arc::new(airlines),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

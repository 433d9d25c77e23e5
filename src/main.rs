// Food Snap: upload a photo of a dish, get food predictions and recipes back.
//
// The page is rendered server-side from an explicit UI state; predictions come
// from an external `POST /predict` service configured with PREDICT_URL.

mod client;
mod config;
mod controller;
mod error;
mod models;
mod preview;
mod render;
mod web;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::PredictClient;
use crate::config::Config;
use crate::web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "food_snap=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let client = PredictClient::new(config.predict_url.clone());
    let app = web::router(AppState::new(client.clone()), config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!("🚀 Server running on http://{}", config.bind_addr);
    info!("🍽️ Forwarding predictions to {}", client.endpoint());

    axum::serve(listener, app).await?;
    Ok(())
}

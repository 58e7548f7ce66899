use std::sync::Arc;

use santa_backend::ai::{AiClient, OfflineAi, OpenAiClient};
use santa_backend::config::Config;
use santa_backend::{app, telemetry, AppState};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env();
    telemetry::init_tracing();
    tracing::debug!(?config, "configuration loaded");

    let ai: Arc<dyn AiClient> = match config.openai.clone() {
        Some(openai) => {
            tracing::info!(model = %openai.model, "using OpenAI for words, ideas and images");
            Arc::new(OpenAiClient::new(openai))
        }
        None => {
            tracing::info!("OPENAI_API_KEY not set, running with the offline word bank");
            Arc::new(OfflineAi)
        }
    };

    let state = match &config.persist_path {
        Some(path) => AppState::with_persistence(path.clone(), ai).await,
        None => AppState::new(ai),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app(state)).await
}

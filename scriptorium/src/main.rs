use std::sync::Arc;

use scriptorium::api;
use scriptorium::app_state::AppState;
use scriptorium::config::Config;
use scriptorium::gateway::{GeminiGateway, HttpGenerateClient, SharedGateway};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

/// Walk the current directory and its ancestors looking for a `.env` file,
/// so running from a subdirectory still picks up the repo-root one.
fn load_env_file() {
    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!(error = %e, "Could not determine current directory for .env lookup");
            return;
        }
    };

    let mut current = cwd.clone();
    loop {
        let candidate = current.join(".env");
        if candidate.exists() {
            match dotenvy::from_path(&candidate) {
                Ok(_) => {
                    tracing::info!(path = %candidate.display(), "Loaded environment from .env");
                }
                Err(e) => {
                    tracing::warn!(
                        path = %candidate.display(),
                        error = %e,
                        "Failed to load .env file"
                    );
                }
            }
            return;
        }

        if !current.pop() {
            break;
        }
    }

    tracing::info!(
        cwd = %cwd.display(),
        "No .env file found; using process environment only"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    load_env_file();

    let config = Config::from_env()?;
    if config.api_key.is_none() {
        tracing::warn!(
            "GEMINI_API_KEY is not set; AI features will return degraded responses"
        );
    }

    let client = HttpGenerateClient::new(
        reqwest::Client::new(),
        config.model.clone(),
        config.api_key.clone(),
    );
    let gateway: SharedGateway = Arc::new(GeminiGateway::new(Arc::new(client)));

    let app_state = AppState::new(config.clone(), gateway);
    // Spawn the editor eagerly so the draft is restored before the first
    // request.
    let _ = app_state
        .ensure_editor()
        .await
        .map_err(|e| anyhow::anyhow!("failed to start editor actor: {e}"))?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router()
        .layer(cors)
        .with_state(api::ApiState { app_state });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, model = %config.model, "Scriptorium listening");
    axum::serve(listener, app).await?;
    Ok(())
}

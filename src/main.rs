use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptparty::{api, config::ServerConfig, prompts::FilePromptSource, state::AppState};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptparty=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting promptparty...");

    let config = ServerConfig::from_env();

    let prompts = match FilePromptSource::load(&config.prompts_file).await {
        Ok(prompts) => prompts,
        Err(e) => {
            tracing::error!(
                "Cannot load prompts from {}: {}",
                config.prompts_file.display(),
                e
            );
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Loaded {} prompts from {}",
        prompts.prompt_count().await,
        config.prompts_file.display()
    );

    let state = Arc::new(AppState::in_memory(Arc::new(prompts), config.rules));

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", config.bind_addr);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

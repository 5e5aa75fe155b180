//! Shelf-Eye API Server
//!
//! Usage:
//!   cargo run --bin shelf_eye
//!
//! Environment:
//!   GEMINI_API_KEY           - Model API key (required)
//!   GEMINI_MODEL             - Model name (default: gemini-2.5-flash)
//!   GEMINI_TIMEOUT_SECS      - Client-side timeout for model calls (default: none)
//!   SHELF_EYE_REFERENCE_DIR  - Reference image/layout directory (default: backend_reference)
//!   SHELF_EYE_PROMPT_DIR     - Optional prompt template overrides
//!   SHELF_EYE_MAX_UPLOAD_MB  - Upload limit (default: 20)
//!   SHELF_EYE_HOST           - Server host (default: 0.0.0.0)
//!   PORT / SHELF_EYE_PORT    - Server port (default: 8080)
//!   RUST_LOG                 - Log level (default: info)

use shelf_eye::api::{create_router, AppState};
use shelf_eye::{AppConfig, FileReferenceStore, GeminiClient, PromptTemplates, StandardPrices};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    let addr = config.bind_addr()?;

    let model = Arc::new(GeminiClient::new(config.gemini.clone())?);
    let store = Arc::new(FileReferenceStore::new(&config.reference_dir));
    let prompts = PromptTemplates::load(config.prompt_dir())?;
    let standard_prices = StandardPrices::load_or_default(&config.standard_prices_path());

    info!("📂 Reference directory: {}", store.base_dir().display());
    if !store.image_path().exists() {
        warn!("⚠️ No reference image yet; audits run standalone until one is uploaded");
    }

    let state = Arc::new(
        AppState::new(model, store, prompts, standard_prices)
            .with_max_upload_bytes(config.max_upload_bytes()),
    );
    let app = create_router(state);

    info!("🚀 Shelf-Eye Agent starting on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /                        - Audit web UI");
    info!("  POST /audit                   - Audit a shelf photo");
    info!("  POST /admin/upload-reference  - Replace the reference shelf");
    info!("  GET  /standards               - Standard prices");
    info!("  GET  /health                  - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("👋 Shelf-Eye Agent shutdown complete");
    Ok(())
}

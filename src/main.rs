use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use docchat::config::AppConfig;
use docchat::llm::GeminiClient;
use docchat::routes::configure_routes;
use docchat::service::ChatService;
use docchat::state::AppState;
use docchat::store::{ChatStore, InMemoryChatStore};
use docchat::uploads::UploadDir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("docchat=info,warp=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    if !config.has_api_key() {
        warn!("GEMINI_API_KEY is not set, chat requests will fail");
    }

    let uploads = UploadDir::new(&config.downloads_dir);
    uploads.ensure().await?;

    let provider = GeminiClient::new(config.gemini_api_key.clone(), config.model())?
        .with_base_url(config.gemini_base_url.clone());

    let store: Arc<dyn ChatStore> = Arc::new(InMemoryChatStore::new());
    let chat = ChatService::new(store.clone(), Arc::new(provider), uploads.clone())
        .with_generation_config(config.generation.clone());
    let state = AppState::new(store, chat, uploads, config.max_upload_bytes);

    info!(
        addr = %config.bind_addr,
        model = %config.gemini_model,
        downloads = %config.downloads_dir.display(),
        "starting server"
    );
    warp::serve(configure_routes(state))
        .run(config.bind_addr)
        .await;

    Ok(())
}

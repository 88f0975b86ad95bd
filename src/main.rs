use chrono::Local;
use mood_ledger::{api::HttpWellnessApi, router, AppState, Config, FileStore};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let store = FileStore::load(&config.data_path).await;
    info!("ledger data at {}", store.path().display());

    let api = HttpWellnessApi::new(
        config.api_url.clone(),
        config.api_token.clone(),
        config.api_timeout,
    );
    info!(
        "wellness api at {} (timeout {:?})",
        config.api_url, config.api_timeout
    );

    let state = AppState::new(store, Arc::new(api), Local::now().date_naive());
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wristtrack::api;
use wristtrack::config::Config;
use wristtrack::storage;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wristtrack=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    let store = storage::open(&config).await?;

    info!("Initializing database...");
    store.init().await?;
    info!("Database initialized successfully");

    if let Some(ref event_id) = config.dashboard.default_event_id {
        info!("Default event: {}", event_id);
    }

    let api_router = api::create_api_router(
        store,
        config.dashboard.clone(),
        config.frontend.clone(),
    );

    // Log frontend configuration
    if let Some(ref static_dir) = config.frontend.static_dir {
        info!("🎨 Serving frontend from directory: {}", static_dir);
    } else {
        info!("🎨 No frontend directory configured, serving the JSON API only");
    }

    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("🚀 Dashboard server listening on http://{}", api_addr);
    info!("   - API endpoints available at http://{}/api/...", api_addr);

    axum::serve(api_listener, api_router).await?;

    Ok(())
}

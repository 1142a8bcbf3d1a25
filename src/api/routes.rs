use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{DashboardConfig, FrontendConfig};
use crate::storage::EventStore;

use super::handlers::{get_event, health_check, list_events, AppState};
use super::static_files::static_service;
use super::stats::{
    get_dashboard, get_map, get_summary, get_top_identities, get_wristbands, get_zone_stats,
};

pub fn create_api_router(
    store: Arc<dyn EventStore>,
    dashboard: DashboardConfig,
    frontend: FrontendConfig,
) -> Router {
    let state = Arc::new(AppState { store, dashboard });

    let api_routes = Router::new()
        .route("/events", get(list_events))
        .route("/events/{event_id}/{operation}", get(get_event))
        .route("/stats/zones", get(get_zone_stats))
        .route("/stats/identities", get(get_top_identities))
        .route("/stats/wristbands", get(get_wristbands))
        .route("/stats/summary", get(get_summary))
        .route("/map", get(get_map))
        .route("/dashboard", get(get_dashboard))
        .with_state(state);

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes);

    let router = match frontend.static_dir {
        Some(dir) => router.fallback_service(static_service(&dir)),
        None => router,
    };

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

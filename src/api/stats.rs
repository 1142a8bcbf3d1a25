//! Statistics API handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::handlers::{load_records, ApiError, AppState, EventQueryParams};
use crate::dashboard::{map_view_for, zone_stats_for, DashboardSnapshot};
use crate::stats::{
    compute_identity_frequency, summarize, summarize_wristbands, EventSummary, IdentityFrequency,
    MapView, WristbandSummary, ZoneVisitStat,
};

const DEFAULT_TOP_IDENTITIES: usize = 10;

#[derive(Debug, Serialize)]
pub struct ZoneStatsResponse {
    /// Wristband the stats are scoped to; `None` for overall stats
    pub entity: Option<String>,
    pub zones: Vec<ZoneVisitStat>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct IdentitiesResponse {
    pub identities: Vec<IdentityFrequency>,
    /// Number of distinct wristbands before `limit` was applied
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct WristbandsResponse {
    pub wristbands: Vec<WristbandSummary>,
    pub total: usize,
}

/// Per-zone visits and dwell time, for one wristband or overall
pub async fn get_zone_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventQueryParams>,
) -> Result<Json<ZoneStatsResponse>, ApiError> {
    let (_, records) = load_records(&state, &params).await?;
    let entity = params.entity();

    let zones = zone_stats_for(&records, entity);
    let total = zones.len();
    Ok(Json(ZoneStatsResponse {
        entity: entity.map(str::to_string),
        zones,
        total,
    }))
}

/// Most frequent wristbands
pub async fn get_top_identities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventQueryParams>,
) -> Result<Json<IdentitiesResponse>, ApiError> {
    let (_, records) = load_records(&state, &params).await?;

    let mut identities = compute_identity_frequency(&records);
    let total = identities.len();
    identities.truncate(params.limit.unwrap_or(DEFAULT_TOP_IDENTITIES));

    Ok(Json(IdentitiesResponse { identities, total }))
}

/// Per-wristband summaries
pub async fn get_wristbands(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventQueryParams>,
) -> Result<Json<WristbandsResponse>, ApiError> {
    let (_, records) = load_records(&state, &params).await?;

    let wristbands = summarize_wristbands(&records);
    let total = wristbands.len();
    Ok(Json(WristbandsResponse { wristbands, total }))
}

/// Headline totals
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventQueryParams>,
) -> Result<Json<EventSummary>, ApiError> {
    let (_, records) = load_records(&state, &params).await?;
    Ok(Json(summarize(&records)))
}

/// Positions with per-wristband colors and sequence numbers
pub async fn get_map(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventQueryParams>,
) -> Result<Json<MapView>, ApiError> {
    let (_, records) = load_records(&state, &params).await?;
    Ok(Json(map_view_for(&records, params.entity(), &state.dashboard)))
}

/// Everything the dashboard shows, computed from one fetch
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventQueryParams>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let (query, records) = load_records(&state, &params).await?;
    Ok(Json(DashboardSnapshot::build(
        Some(query),
        &records,
        params.entity(),
        &state.dashboard,
    )))
}

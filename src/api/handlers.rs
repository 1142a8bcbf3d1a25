use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::models::{EventQuery, EventRecord, EventRow, RecordFilter};
use crate::storage::EventStore;

pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub dashboard: DashboardConfig,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Query parameters shared by every listing and stats endpoint
#[derive(Debug, Default, Deserialize)]
pub struct EventQueryParams {
    /// Store query: event id (partition key)
    pub event_id: Option<String>,
    /// Store query: operation (sort key)
    pub operation: Option<String>,
    /// Substring filter on the composite wristband id
    pub bw_id: Option<String>,
    /// Selected wristband (entity id)
    pub entity: Option<String>,
    pub limit: Option<usize>,
}

impl EventQueryParams {
    pub fn query(&self, dashboard: &DashboardConfig) -> EventQuery {
        EventQuery::from_criteria(
            self.event_id.as_deref(),
            self.operation.as_deref(),
            dashboard.default_event_id.as_deref(),
        )
    }

    pub fn filter(&self) -> RecordFilter {
        RecordFilter {
            bw_id: self.bw_id.clone(),
            ..Default::default()
        }
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

/// Run the store query the parameters select and apply the record filter
pub(crate) async fn load_records(
    state: &AppState,
    params: &EventQueryParams,
) -> Result<(EventQuery, Vec<EventRecord>), ApiError> {
    let query = params.query(&state.dashboard);

    match state.store.fetch(&query).await {
        Ok(records) => {
            let records = params.filter().apply(&records);
            tracing::debug!("{:?} matched {} records", query, records.len());
            Ok((query, records))
        }
        Err(e) => {
            tracing::error!("Failed to load events for {:?}: {}", query, e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load events: {}", e),
            ))
        }
    }
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub query: EventQuery,
    pub records: Vec<EventRow>,
    pub total: usize,
}

/// List event records for the table view
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventQueryParams>,
) -> Result<Json<EventsResponse>, ApiError> {
    let (query, records) = load_records(&state, &params).await?;

    let mut rows: Vec<EventRow> = records.into_iter().map(EventRow::from).collect();
    let total = rows.len();
    if let Some(limit) = params.limit {
        rows.truncate(limit);
    }

    Ok(Json(EventsResponse {
        query,
        records: rows,
        total,
    }))
}

/// Get a single event record by its full key
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path((event_id, operation)): Path<(String, String)>,
) -> Result<Json<EventRow>, ApiError> {
    match state.store.get(&event_id, &operation).await {
        Ok(Some(record)) => Ok(Json(EventRow::from(record))),
        Ok(None) => Err(api_error(StatusCode::NOT_FOUND, "Event not found")),
        Err(e) => {
            tracing::error!("Failed to get event {}/{}: {}", event_id, operation, e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to get event: {}", e),
            ))
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}

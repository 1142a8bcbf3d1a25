//! Dashboard views over a fetched record set
//!
//! [`DashboardSnapshot`] is everything the dashboard renders for one record
//! set and wristband selection. [`Dashboard`] is the session that owns the
//! current record set: it refetches on query changes, recomputes the
//! snapshot on every filter or selection change, and keeps the previous
//! snapshot when a fetch fails.

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::DashboardConfig;
use crate::models::{EventQuery, EventRecord, EventRow, RecordFilter};
use crate::stats::{
    build_map_view, compute_entity_zone_stats, compute_identity_frequency,
    compute_overall_zone_stats, summarize, summarize_wristbands, EventSummary, IdentityFrequency,
    LatLon, MapView, WristbandSummary, ZoneVisitStat,
};
use crate::storage::EventStore;

/// Zone stats for the selected wristband, or across all of them.
pub fn zone_stats_for(records: &[EventRecord], entity: Option<&str>) -> Vec<ZoneVisitStat> {
    match entity {
        Some(entity) => compute_entity_zone_stats(records, entity),
        None => compute_overall_zone_stats(records),
    }
}

/// Map view for the selected wristband, or for all of them.
pub fn map_view_for(
    records: &[EventRecord],
    entity: Option<&str>,
    config: &DashboardConfig,
) -> MapView {
    let center = LatLon {
        lat: config.map_center_lat,
        lon: config.map_center_lon,
    };
    match entity {
        Some(entity) => {
            let selected: Vec<EventRecord> = records
                .iter()
                .filter(|r| r.entity_id() == Some(entity))
                .cloned()
                .collect();
            build_map_view(&selected, center, config.map_zoom)
        }
        None => build_map_view(records, center, config.map_zoom),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub query: Option<EventQuery>,
    pub selected_entity: Option<String>,
    pub summary: EventSummary,
    pub records: Vec<EventRow>,
    pub zone_stats: Vec<ZoneVisitStat>,
    pub top_identities: Vec<IdentityFrequency>,
    pub wristbands: Vec<WristbandSummary>,
    pub map: MapView,
}

impl DashboardSnapshot {
    pub fn build(
        query: Option<EventQuery>,
        records: &[EventRecord],
        selected_entity: Option<&str>,
        config: &DashboardConfig,
    ) -> Self {
        Self {
            query,
            selected_entity: selected_entity.map(str::to_string),
            summary: summarize(records),
            records: records.iter().cloned().map(EventRow::from).collect(),
            zone_stats: zone_stats_for(records, selected_entity),
            top_identities: compute_identity_frequency(records),
            wristbands: summarize_wristbands(records),
            map: map_view_for(records, selected_entity, config),
        }
    }
}

pub struct Dashboard {
    store: Arc<dyn EventStore>,
    config: DashboardConfig,
    query: Option<EventQuery>,
    records: Vec<EventRecord>,
    filter: RecordFilter,
    selected_entity: Option<String>,
    snapshot: DashboardSnapshot,
}

impl Dashboard {
    pub fn new(store: Arc<dyn EventStore>, config: DashboardConfig) -> Self {
        let snapshot = DashboardSnapshot::build(None, &[], None, &config);
        Self {
            store,
            config,
            query: None,
            records: Vec::new(),
            filter: RecordFilter::default(),
            selected_entity: None,
            snapshot,
        }
    }

    /// Fetch a new record set. On failure the current records and snapshot
    /// are left untouched and the error is returned.
    pub async fn load(&mut self, query: EventQuery) -> anyhow::Result<usize> {
        let records = match self.store.fetch(&query).await {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to load events for {:?}: {}", query, e);
                return Err(e);
            }
        };

        info!("Loaded {} events for {:?}", records.len(), query);
        let count = records.len();
        self.records = records;
        self.query = Some(query);
        self.rebuild();
        Ok(count)
    }

    pub fn set_filter(&mut self, filter: RecordFilter) {
        self.filter = filter;
        self.rebuild();
    }

    pub fn select_entity(&mut self, entity: Option<String>) {
        self.selected_entity = entity;
        self.rebuild();
    }

    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.snapshot
    }

    fn rebuild(&mut self) {
        let visible = self.filter.apply(&self.records);
        self.snapshot = DashboardSnapshot::build(
            self.query.clone(),
            &visible,
            self.selected_entity.as_deref(),
            &self.config,
        );
    }
}

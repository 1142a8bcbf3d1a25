//! Map projection: numbered, color-coded positions per wristband

use serde::Serialize;

use super::zones::group_by_entity;
use crate::models::EventRecord;

/// Marker colors, assigned to wristbands in id order and reused cyclically.
pub const PALETTE: [&str; 10] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4", "#f032e6", "#bfef45",
    "#9a6324", "#800000",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub entity_id: String,
    pub bw_id: String,
    pub position: LatLon,
    pub zone: Option<String>,
    pub timestamp: i64,
    /// 1-based position in the wristband's chronological journey
    pub sequence: usize,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapTrack {
    pub entity_id: String,
    pub color: &'static str,
    pub points: Vec<LatLon>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: LatLon,
    pub zoom: u8,
    pub markers: Vec<MapMarker>,
    pub tracks: Vec<MapTrack>,
}

/// Lay out every positioned record on the map.
///
/// Only records with coordinates and a timestamp are plotted. The view is
/// centered on the plotted positions, or on `default_center` when there are
/// none.
pub fn build_map_view(records: &[EventRecord], default_center: LatLon, zoom: u8) -> MapView {
    let mut markers = Vec::new();
    let mut tracks = Vec::new();

    for (index, (entity, journey)) in group_by_entity(records).into_iter().enumerate() {
        let color = PALETTE[index % PALETTE.len()];

        let mut positioned: Vec<(&EventRecord, i64, LatLon)> = journey
            .into_iter()
            .filter_map(|record| {
                let (lat, lon) = record.position()?;
                Some((record, record.timestamp()?, LatLon { lat, lon }))
            })
            .collect();
        if positioned.is_empty() {
            continue;
        }
        positioned.sort_by_key(|&(_, ts, _)| ts);

        let mut points = Vec::with_capacity(positioned.len());
        for (i, (record, timestamp, position)) in positioned.into_iter().enumerate() {
            points.push(position);
            markers.push(MapMarker {
                entity_id: entity.to_string(),
                bw_id: record.bw_id().unwrap_or(entity).to_string(),
                position,
                zone: record.zone().map(str::to_string),
                timestamp,
                sequence: i + 1,
                color,
            });
        }

        tracks.push(MapTrack {
            entity_id: entity.to_string(),
            color,
            points,
        });
    }

    let center = centroid(markers.iter().map(|m| m.position)).unwrap_or(default_center);

    MapView {
        center,
        zoom,
        markers,
        tracks,
    }
}

fn centroid(points: impl Iterator<Item = LatLon>) -> Option<LatLon> {
    let (n, lat, lon) = points.fold((0usize, 0.0, 0.0), |(n, lat, lon), p| {
        (n + 1, lat + p.lat, lon + p.lon)
    });
    (n > 0).then(|| LatLon {
        lat: lat / n as f64,
        lon: lon / n as f64,
    })
}

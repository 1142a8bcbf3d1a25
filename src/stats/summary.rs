//! Headline totals and per-wristband summaries

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::EventRecord;

/// Totals shown above the events table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub total_records: usize,
    pub unique_wristbands: usize,
    pub unique_zones: usize,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    pub span_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WristbandSummary {
    pub id: String,
    pub record_count: u64,
    pub first_seen: Option<i64>,
    pub last_seen: Option<i64>,
    /// Zone of the chronologically latest record carrying a zone
    pub last_zone: Option<String>,
    pub zones_visited: Vec<String>,
}

pub fn summarize(records: &[EventRecord]) -> EventSummary {
    let wristbands: BTreeSet<&str> = records.iter().filter_map(EventRecord::entity_id).collect();
    let zones: BTreeSet<&str> = records.iter().filter_map(EventRecord::zone).collect();

    let first_timestamp = records.iter().filter_map(EventRecord::timestamp).min();
    let last_timestamp = records.iter().filter_map(EventRecord::timestamp).max();
    let span_ms = match (first_timestamp, last_timestamp) {
        (Some(first), Some(last)) => last.saturating_sub(first),
        _ => 0,
    };

    EventSummary {
        total_records: records.len(),
        unique_wristbands: wristbands.len(),
        unique_zones: zones.len(),
        first_timestamp,
        last_timestamp,
        span_ms,
    }
}

/// One summary per wristband, ordered by wristband id.
pub fn summarize_wristbands(records: &[EventRecord]) -> Vec<WristbandSummary> {
    #[derive(Default)]
    struct Acc<'a> {
        count: u64,
        first: Option<i64>,
        last: Option<i64>,
        last_zone: Option<(i64, &'a str)>,
        zones: BTreeSet<&'a str>,
    }

    let mut by_entity: BTreeMap<&str, Acc> = BTreeMap::new();
    for record in records {
        let Some(entity) = record.entity_id() else {
            continue;
        };
        let acc = by_entity.entry(entity).or_default();
        acc.count += 1;

        if let Some(zone) = record.zone() {
            acc.zones.insert(zone);
        }

        if let Some(ts) = record.timestamp() {
            acc.first = Some(acc.first.map_or(ts, |f| f.min(ts)));
            acc.last = Some(acc.last.map_or(ts, |l| l.max(ts)));

            if let Some(zone) = record.zone() {
                // Later duplicates win ties, matching a stable chronological walk
                if acc.last_zone.map_or(true, |(seen, _)| ts >= seen) {
                    acc.last_zone = Some((ts, zone));
                }
            }
        }
    }

    by_entity
        .into_iter()
        .map(|(id, acc)| WristbandSummary {
            id: id.to_string(),
            record_count: acc.count,
            first_seen: acc.first,
            last_seen: acc.last,
            last_zone: acc.last_zone.map(|(_, zone)| zone.to_string()),
            zones_visited: acc.zones.into_iter().map(str::to_string).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventData;

    fn ev(bw_id: Option<&str>, zone: Option<&str>, ts: Option<i64>) -> EventRecord {
        EventRecord {
            data: Some(EventData {
                bw_id: bw_id.map(str::to_string),
                current_zone: zone.map(str::to_string),
                timestamp: ts,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_totals() {
        let records = vec![
            ev(Some("BW1#a"), Some("Z1"), Some(1_000)),
            ev(Some("BW2#a"), Some("Z2"), Some(4_000)),
            ev(Some("BW1#b"), Some("Z1"), Some(2_500)),
            ev(None, None, None),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.unique_wristbands, 2);
        assert_eq!(summary.unique_zones, 2);
        assert_eq!(summary.first_timestamp, Some(1_000));
        assert_eq!(summary.last_timestamp, Some(4_000));
        assert_eq!(summary.span_ms, 3_000);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(summarize(&[]), EventSummary::default());
        assert!(summarize_wristbands(&[]).is_empty());
    }

    #[test]
    fn test_span_saturates_on_extreme_timestamps() {
        let records = vec![
            ev(Some("BW1"), Some("Z1"), Some(i64::MIN)),
            ev(Some("BW1"), Some("Z2"), Some(i64::MAX)),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.span_ms, i64::MAX);
        assert_eq!(summary.first_timestamp, Some(i64::MIN));
    }

    #[test]
    fn test_wristband_summaries() {
        let records = vec![
            ev(Some("BW2"), Some("EXIT"), Some(9)),
            ev(Some("BW1"), Some("BAR"), Some(30)),
            ev(Some("BW1"), Some("ENTRANCE"), Some(10)),
            ev(Some("BW1"), None, Some(40)),
            ev(Some("BW1"), Some("STAGE"), None),
        ];
        let summaries = summarize_wristbands(&records);
        assert_eq!(summaries.len(), 2);

        let bw1 = &summaries[0];
        assert_eq!(bw1.id, "BW1");
        assert_eq!(bw1.record_count, 4);
        assert_eq!(bw1.first_seen, Some(10));
        assert_eq!(bw1.last_seen, Some(40));
        assert_eq!(bw1.last_zone.as_deref(), Some("BAR"));
        assert_eq!(bw1.zones_visited, vec!["BAR", "ENTRANCE", "STAGE"]);

        assert_eq!(summaries[1].id, "BW2");
        assert_eq!(summaries[1].last_zone.as_deref(), Some("EXIT"));
    }
}

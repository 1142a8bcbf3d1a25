//! Zone dwell-time and visit-count aggregation
//!
//! Each wristband's records are ordered by timestamp and walked as a
//! journey. A zone is credited with a visit for every record seen in it,
//! and with dwell time whenever the journey moves on to a different zone:
//! the gap between the last record in the old zone and the first record in
//! the new one. The zone a journey ends in accrues no dwell, since nothing
//! closes its interval.
//!
//! Overall statistics never walk two wristbands as one journey: records are
//! grouped by wristband, each group is folded on its own, and only the
//! resulting tallies are merged.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::EventRecord;

/// Derived per-zone statistics, for one wristband or for all of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneVisitStat {
    pub zone_name: String,
    pub visit_count: u64,
    pub total_dwell_ms: i64,
    pub average_dwell_ms: f64,
}

/// Raw per-zone counters before averaging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneTally {
    pub visits: u64,
    pub dwell_ms: i64,
}

pub type ZoneTallies = BTreeMap<String, ZoneTally>;

/// Accumulator for walking a single wristband's journey.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneWalk {
    last: Option<(String, i64)>,
    tallies: ZoneTallies,
}

impl ZoneWalk {
    /// Advance the walk by one observation.
    pub fn step(mut self, zone: &str, timestamp: i64) -> Self {
        if let Some((last_zone, last_ts)) = &self.last {
            if last_zone != zone {
                let tally = self.tallies.entry(last_zone.clone()).or_default();
                tally.dwell_ms = tally.dwell_ms.saturating_add(timestamp.saturating_sub(*last_ts));
            }
        }

        self.tallies.entry(zone.to_string()).or_default().visits += 1;
        self.last = Some((zone.to_string(), timestamp));
        self
    }

    pub fn into_tallies(self) -> ZoneTallies {
        self.tallies
    }
}

/// Records grouped by wristband identity, in original relative order.
///
/// Records without a derivable identity are left out.
pub fn group_by_entity<'a, I>(records: I) -> BTreeMap<&'a str, Vec<&'a EventRecord>>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut groups: BTreeMap<&str, Vec<&EventRecord>> = BTreeMap::new();
    for record in records {
        if let Some(entity) = record.entity_id() {
            groups.entry(entity).or_default().push(record);
        }
    }
    groups
}

/// Walk one journey in timestamp order and tally its zones.
///
/// Records lacking a zone or a timestamp are skipped. Ties keep their
/// original relative order.
pub fn fold_zone_transitions<'a, I>(journey: I) -> ZoneTallies
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut steps: Vec<(&str, i64)> = journey
        .into_iter()
        .filter_map(|record| Some((record.zone()?, record.timestamp()?)))
        .collect();
    steps.sort_by_key(|&(_, ts)| ts);

    steps
        .into_iter()
        .fold(ZoneWalk::default(), |walk, (zone, ts)| walk.step(zone, ts))
        .into_tallies()
}

/// Sum tallies zone by zone and finish them into stats, sorted by zone name.
pub fn merge_zone_stats<I>(tallies: I) -> Vec<ZoneVisitStat>
where
    I: IntoIterator<Item = ZoneTallies>,
{
    let mut merged = ZoneTallies::new();
    for journey in tallies {
        for (zone, tally) in journey {
            let entry = merged.entry(zone).or_default();
            entry.visits = entry.visits.saturating_add(tally.visits);
            entry.dwell_ms = entry.dwell_ms.saturating_add(tally.dwell_ms);
        }
    }

    merged
        .into_iter()
        .map(|(zone_name, tally)| ZoneVisitStat {
            zone_name,
            visit_count: tally.visits,
            total_dwell_ms: tally.dwell_ms,
            average_dwell_ms: if tally.visits > 0 {
                tally.dwell_ms as f64 / tally.visits as f64
            } else {
                0.0
            },
        })
        .collect()
}

/// Zone statistics for a single wristband.
pub fn compute_entity_zone_stats(records: &[EventRecord], entity_id: &str) -> Vec<ZoneVisitStat> {
    let journey = records
        .iter()
        .filter(|record| record.entity_id() == Some(entity_id));
    merge_zone_stats(std::iter::once(fold_zone_transitions(journey)))
}

/// Zone statistics across every wristband, each journey walked independently.
pub fn compute_overall_zone_stats(records: &[EventRecord]) -> Vec<ZoneVisitStat> {
    merge_zone_stats(
        group_by_entity(records)
            .into_values()
            .map(fold_zone_transitions),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventData;

    fn ev(bw_id: &str, zone: &str, ts: i64) -> EventRecord {
        EventRecord {
            event_id: Some("EVENT_050".to_string()),
            operation: None,
            data: Some(EventData {
                bw_id: Some(bw_id.to_string()),
                current_zone: Some(zone.to_string()),
                timestamp: Some(ts),
                ..Default::default()
            }),
        }
    }

    fn stat<'a>(stats: &'a [ZoneVisitStat], zone: &str) -> &'a ZoneVisitStat {
        stats
            .iter()
            .find(|s| s.zone_name == zone)
            .unwrap_or_else(|| panic!("zone {zone} missing"))
    }

    #[test]
    fn test_two_zone_transition() {
        let records = vec![ev("BW1#a", "Z1", 1000), ev("BW1#b", "Z2", 1500)];
        let stats = compute_entity_zone_stats(&records, "BW1");

        assert_eq!(stats.len(), 2);
        let z1 = stat(&stats, "Z1");
        assert_eq!(z1.visit_count, 1);
        assert_eq!(z1.total_dwell_ms, 500);
        assert_eq!(z1.average_dwell_ms, 500.0);

        let z2 = stat(&stats, "Z2");
        assert_eq!(z2.visit_count, 1);
        assert_eq!(z2.total_dwell_ms, 0);
        assert_eq!(z2.average_dwell_ms, 0.0);
    }

    #[test]
    fn test_single_zone_has_no_dwell() {
        let records = vec![
            ev("BW1", "LOBBY", 10),
            ev("BW1", "LOBBY", 20),
            ev("BW1", "LOBBY", 30),
        ];
        let stats = compute_entity_zone_stats(&records, "BW1");
        assert_eq!(
            stats,
            vec![ZoneVisitStat {
                zone_name: "LOBBY".to_string(),
                visit_count: 3,
                total_dwell_ms: 0,
                average_dwell_ms: 0.0,
            }]
        );
    }

    #[test]
    fn test_dwell_measured_from_last_record_in_zone() {
        // Z1 at 0 and 100, Z2 at 400: the gap is measured from 100.
        let records = vec![ev("BW1", "Z1", 0), ev("BW1", "Z1", 100), ev("BW1", "Z2", 400)];
        let stats = compute_entity_zone_stats(&records, "BW1");
        let z1 = stat(&stats, "Z1");
        assert_eq!(z1.visit_count, 2);
        assert_eq!(z1.total_dwell_ms, 300);
        assert_eq!(z1.average_dwell_ms, 150.0);
    }

    #[test]
    fn test_unordered_input_is_sorted() {
        let records = vec![
            ev("BW1", "Z2", 1500),
            ev("BW1", "Z1", 1000),
            ev("BW1", "Z1", 2000),
        ];
        let stats = compute_entity_zone_stats(&records, "BW1");
        assert_eq!(stat(&stats, "Z1").total_dwell_ms, 500);
        assert_eq!(stat(&stats, "Z2").total_dwell_ms, 500);
        assert_eq!(stat(&stats, "Z1").visit_count, 2);
    }

    #[test]
    fn test_other_entities_are_ignored() {
        let records = vec![
            ev("BW1", "Z1", 0),
            ev("BW2", "Z3", 50),
            ev("BW1", "Z2", 100),
        ];
        let stats = compute_entity_zone_stats(&records, "BW1");
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.zone_name != "Z3"));
        assert_eq!(stat(&stats, "Z1").total_dwell_ms, 100);
    }

    #[test]
    fn test_incomplete_records_are_skipped() {
        let mut no_zone = ev("BW1", "Z9", 50);
        no_zone.data.as_mut().unwrap().current_zone = None;
        let mut no_ts = ev("BW1", "Z9", 0);
        no_ts.data.as_mut().unwrap().timestamp = None;
        let no_data = EventRecord::default();

        let records = vec![ev("BW1", "Z1", 0), no_zone, no_ts, no_data, ev("BW1", "Z2", 100)];
        let stats = compute_entity_zone_stats(&records, "BW1");

        assert_eq!(stats.len(), 2);
        assert_eq!(stat(&stats, "Z1").total_dwell_ms, 100);
        assert_eq!(compute_overall_zone_stats(&records), stats);
    }

    #[test]
    fn test_empty_input() {
        assert!(compute_entity_zone_stats(&[], "BW1").is_empty());
        assert!(compute_overall_zone_stats(&[]).is_empty());
        assert!(compute_entity_zone_stats(&[ev("BW2", "Z1", 0)], "BW1").is_empty());
    }

    #[test]
    fn test_overall_keeps_journeys_apart() {
        // Interleaved in time: walking them as one stream would bounce
        // between zones on every record.
        let records = vec![
            ev("BW1", "Z1", 0),
            ev("BW2", "Z2", 10),
            ev("BW1", "Z1", 20),
            ev("BW2", "Z2", 30),
            ev("BW1", "Z2", 100),
            ev("BW2", "Z1", 130),
        ];
        let stats = compute_overall_zone_stats(&records);

        let z1 = stat(&stats, "Z1");
        assert_eq!(z1.visit_count, 3);
        assert_eq!(z1.total_dwell_ms, 80);

        let z2 = stat(&stats, "Z2");
        assert_eq!(z2.visit_count, 3);
        assert_eq!(z2.total_dwell_ms, 100);
        assert!((z2.average_dwell_ms - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_walk_step_is_a_pure_reduction() {
        let walk = ZoneWalk::default().step("A", 0).step("A", 5).step("B", 9);
        let tallies = walk.clone().into_tallies();
        assert_eq!(tallies["A"], ZoneTally { visits: 2, dwell_ms: 4 });
        assert_eq!(tallies["B"], ZoneTally { visits: 1, dwell_ms: 0 });

        let longer = walk.step("A", 19).into_tallies();
        assert_eq!(longer["B"].dwell_ms, 10);
        assert_eq!(longer["A"].visits, 3);
    }

    #[test]
    fn test_extreme_timestamps_saturate() {
        let records = vec![ev("BW1", "Z1", i64::MIN), ev("BW1", "Z2", i64::MAX)];
        let stats = compute_entity_zone_stats(&records, "BW1");
        assert_eq!(stat(&stats, "Z1").total_dwell_ms, i64::MAX);
        assert_eq!(stat(&stats, "Z2").total_dwell_ms, 0);

        // Two saturated journeys merged stay pinned at the maximum
        let records = vec![
            ev("BW1", "Z1", i64::MIN),
            ev("BW1", "Z2", i64::MAX),
            ev("BW2", "Z1", 0),
            ev("BW2", "Z2", i64::MAX),
        ];
        let overall = compute_overall_zone_stats(&records);
        let z1 = stat(&overall, "Z1");
        assert_eq!(z1.visit_count, 2);
        assert_eq!(z1.total_dwell_ms, i64::MAX);
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        // Z2 and the second Z1 share a timestamp; input order decides the walk
        let records = vec![ev("BW1", "Z1", 0), ev("BW1", "Z2", 100), ev("BW1", "Z1", 100)];
        let stats = compute_entity_zone_stats(&records, "BW1");
        assert_eq!(stat(&stats, "Z1").visit_count, 2);
        assert_eq!(stat(&stats, "Z1").total_dwell_ms, 100);
        assert_eq!(stat(&stats, "Z2").total_dwell_ms, 0);

        // Reversed: Z1@0, Z1@100, Z2@100
        let reversed: Vec<EventRecord> = records.into_iter().rev().collect();
        let stats = compute_entity_zone_stats(&reversed, "BW1");
        assert_eq!(stat(&stats, "Z1").visit_count, 2);
        assert_eq!(stat(&stats, "Z1").total_dwell_ms, 0);
        assert_eq!(stat(&stats, "Z2").visit_count, 1);
        assert_eq!(stat(&stats, "Z2").total_dwell_ms, 0);
        assert_eq!(compute_overall_zone_stats(&reversed), stats);
    }

    #[test]
    fn test_group_by_entity_preserves_order() {
        let records = vec![
            ev("BW2#1", "Z1", 5),
            ev("BW1#1", "Z1", 1),
            ev("BW2#2", "Z2", 3),
            EventRecord::default(),
        ];
        let groups = group_by_entity(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["BW2"][0].timestamp(), Some(5));
        assert_eq!(groups["BW2"][1].timestamp(), Some(3));
        assert_eq!(groups["BW1"].len(), 1);
    }

    #[test]
    fn test_same_input_same_output() {
        let records = vec![ev("BW1", "Z1", 0), ev("BW2", "Z2", 1), ev("BW1", "Z2", 5)];
        let snapshot = records.clone();
        assert_eq!(compute_overall_zone_stats(&records), compute_overall_zone_stats(&records));
        assert_eq!(records, snapshot);
    }
}

//! Property tests for the zone and frequency aggregations

use proptest::prelude::*;
use wristtrack::models::{EventData, EventRecord};
use wristtrack::stats::{
    compute_entity_zone_stats, compute_identity_frequency, compute_overall_zone_stats,
    merge_zone_stats, ZoneVisitStat,
};

const ENTITIES: [&str; 3] = ["BW1", "BW2", "BW3"];
const ZONES: [&str; 4] = ["ENTRANCE", "BAR", "STAGE", "EXIT"];

fn ev(entity: usize, suffix: usize, zone: usize, ts: i64) -> EventRecord {
    EventRecord {
        event_id: Some("EVENT_050".to_string()),
        operation: Some(format!("op-{suffix}")),
        data: Some(EventData {
            bw_id: Some(format!("{}#{}", ENTITIES[entity], suffix)),
            current_zone: Some(ZONES[zone].to_string()),
            timestamp: Some(ts),
            ..Default::default()
        }),
    }
}

/// Records with distinct timestamps, so that ordering is fully determined
fn records_strategy() -> impl Strategy<Value = Vec<EventRecord>> {
    prop::collection::vec((0..ENTITIES.len(), 0..ZONES.len(), 0i64..1_000), 0..40).prop_map(
        |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (entity, zone, jitter))| ev(entity, i, zone, jitter * 100 + i as i64))
                .collect()
        },
    )
}

fn shuffled() -> impl Strategy<Value = (Vec<EventRecord>, Vec<EventRecord>)> {
    records_strategy().prop_flat_map(|records| {
        let original = records.clone();
        Just(records)
            .prop_shuffle()
            .prop_map(move |permuted| (original.clone(), permuted))
    })
}

/// Sum per-entity stats zone by zone
fn merged_per_entity(records: &[EventRecord]) -> Vec<ZoneVisitStat> {
    let mut by_zone = std::collections::BTreeMap::<String, (u64, i64)>::new();
    for entity in ENTITIES {
        for stat in compute_entity_zone_stats(records, entity) {
            let entry = by_zone.entry(stat.zone_name).or_default();
            entry.0 += stat.visit_count;
            entry.1 += stat.total_dwell_ms;
        }
    }
    by_zone
        .into_iter()
        .map(|(zone_name, (visits, dwell))| ZoneVisitStat {
            zone_name,
            visit_count: visits,
            total_dwell_ms: dwell,
            average_dwell_ms: if visits > 0 {
                dwell as f64 / visits as f64
            } else {
                0.0
            },
        })
        .collect()
}

proptest! {
    #[test]
    fn entity_stats_ignore_input_order((original, permuted) in shuffled()) {
        for entity in ENTITIES {
            prop_assert_eq!(
                compute_entity_zone_stats(&original, entity),
                compute_entity_zone_stats(&permuted, entity)
            );
        }
        prop_assert_eq!(
            compute_overall_zone_stats(&original),
            compute_overall_zone_stats(&permuted)
        );
    }

    #[test]
    fn overall_is_merge_of_entities(records in records_strategy()) {
        prop_assert_eq!(compute_overall_zone_stats(&records), merged_per_entity(&records));
    }

    #[test]
    fn visit_counts_match_records(records in records_strategy()) {
        let stats = compute_overall_zone_stats(&records);
        let visits: u64 = stats.iter().map(|s| s.visit_count).sum();
        prop_assert_eq!(visits as usize, records.len());

        for stat in &stats {
            let in_zone = records
                .iter()
                .filter(|r| r.zone() == Some(stat.zone_name.as_str()))
                .count();
            prop_assert_eq!(stat.visit_count as usize, in_zone);
            prop_assert!(stat.total_dwell_ms >= 0);
        }
    }

    #[test]
    fn single_zone_journeys_have_no_dwell(
        timestamps in prop::collection::vec(0i64..1_000_000, 1..20),
        zone in 0..ZONES.len(),
    ) {
        let records: Vec<EventRecord> = timestamps
            .iter()
            .enumerate()
            .map(|(i, &ts)| ev(0, i, zone, ts))
            .collect();
        let stats = compute_entity_zone_stats(&records, "BW1");
        prop_assert_eq!(stats.len(), 1);
        prop_assert_eq!(stats[0].visit_count as usize, records.len());
        prop_assert_eq!(stats[0].total_dwell_ms, 0);
    }

    #[test]
    fn frequency_counts_and_shares_add_up(records in records_strategy()) {
        let freq = compute_identity_frequency(&records);
        let count: u64 = freq.iter().map(|f| f.count).sum();
        prop_assert_eq!(count as usize, records.len());

        if records.is_empty() {
            prop_assert!(freq.is_empty());
        } else {
            let share: f64 = freq.iter().map(|f| f.percentage).sum();
            prop_assert!((share - 100.0).abs() < 1e-9);
        }
        prop_assert!(freq.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn aggregations_do_not_mutate_input(records in records_strategy()) {
        let before = records.clone();
        let first = (compute_overall_zone_stats(&records), compute_identity_frequency(&records));
        let second = (compute_overall_zone_stats(&records), compute_identity_frequency(&records));
        prop_assert_eq!(first, second);
        prop_assert_eq!(records, before);
    }
}

#[test]
fn zone_less_records_count_only_toward_frequency() {
    let mut records = vec![ev(0, 0, 0, 10), ev(0, 1, 1, 20)];
    let mut no_zone = ev(1, 2, 0, 30);
    no_zone.data.as_mut().unwrap().current_zone = None;
    let mut no_time = ev(1, 3, 0, 0);
    no_time.data.as_mut().unwrap().timestamp = None;
    records.push(no_zone);
    records.push(no_time);

    let freq = compute_identity_frequency(&records);
    assert_eq!(freq.iter().map(|f| f.count).sum::<u64>(), 4);
    assert_eq!(freq[0].count, 2);

    assert!(compute_entity_zone_stats(&records, "BW2").is_empty());
    let overall = compute_overall_zone_stats(&records);
    assert_eq!(overall.iter().map(|s| s.visit_count).sum::<u64>(), 2);
}

#[test]
fn merging_nothing_is_empty() {
    assert!(merge_zone_stats(Vec::new()).is_empty());
}

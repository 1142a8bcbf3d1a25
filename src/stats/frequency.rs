//! Wristband frequency ("top identities")

use serde::Serialize;
use std::collections::HashMap;

use crate::models::EventRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityFrequency {
    pub id: String,
    pub count: u64,
    pub percentage: f64,
}

/// Count records per wristband identity, most frequent first.
///
/// Ties keep first-encountered order. Percentages are relative to the
/// records that carry an identity, so they sum to 100 for non-empty input.
pub fn compute_identity_frequency(records: &[EventRecord]) -> Vec<IdentityFrequency> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, u64)> = Vec::new();

    for entity in records.iter().filter_map(EventRecord::entity_id) {
        match index.get(entity) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(entity, counts.len());
                counts.push((entity, 1));
            }
        }
    }

    let total: u64 = counts.iter().map(|(_, count)| count).sum();

    // Stable sort keeps first-encountered order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .map(|(id, count)| IdentityFrequency {
            id: id.to_string(),
            count,
            percentage: if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

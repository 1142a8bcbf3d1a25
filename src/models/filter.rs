use serde::{Deserialize, Serialize};

use super::EventRecord;

/// Which store lookup a request resolves to.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EventQuery {
    All,
    ByEventId(String),
    ByOperation(String),
    ByEventIdAndOperation { event_id: String, operation: String },
}

impl EventQuery {
    /// Pick the narrowest query the given criteria allow.
    ///
    /// Blank criteria count as absent. With neither criterion, the
    /// `fallback_event_id` (if any) is used, otherwise everything is listed.
    pub fn from_criteria(
        event_id: Option<&str>,
        operation: Option<&str>,
        fallback_event_id: Option<&str>,
    ) -> Self {
        let event_id = non_blank(event_id);
        let operation = non_blank(operation);

        match (event_id, operation) {
            (Some(event_id), Some(operation)) => EventQuery::ByEventIdAndOperation {
                event_id: event_id.to_string(),
                operation: operation.to_string(),
            },
            (Some(event_id), None) => EventQuery::ByEventId(event_id.to_string()),
            (None, Some(operation)) => EventQuery::ByOperation(operation.to_string()),
            (None, None) => match non_blank(fallback_event_id) {
                Some(event_id) => EventQuery::ByEventId(event_id.to_string()),
                None => EventQuery::All,
            },
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Client-side narrowing of an already fetched record set.
///
/// Each criterion is a case-insensitive substring match on the raw field;
/// an empty criterion matches everything, a non-empty one never matches a
/// record missing that field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub bw_id: Option<String>,
}

impl RecordFilter {
    pub fn by_bw_id(needle: impl Into<String>) -> Self {
        Self {
            bw_id: Some(needle.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        [&self.event_id, &self.operation, &self.bw_id]
            .iter()
            .all(|c| non_blank(c.as_deref()).is_none())
    }

    pub fn matches(&self, record: &EventRecord) -> bool {
        field_matches(self.event_id.as_deref(), record.event_id.as_deref())
            && field_matches(self.operation.as_deref(), record.operation.as_deref())
            && field_matches(self.bw_id.as_deref(), record.bw_id())
    }

    pub fn apply(&self, records: &[EventRecord]) -> Vec<EventRecord> {
        if self.is_empty() {
            return records.to_vec();
        }
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}

fn field_matches(needle: Option<&str>, value: Option<&str>) -> bool {
    match non_blank(needle) {
        None => true,
        Some(needle) => value
            .map(|v| v.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}

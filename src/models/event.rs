use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// One observation of a tracked wristband, as stored upstream.
///
/// Every field is optional: upstream data quality is not controlled, and
/// consumers skip records lacking whatever they need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Tracking campaign/session (store partition key)
    #[serde(default)]
    pub event_id: Option<String>,

    /// Kind of action the record represents (store sort key)
    #[serde(default)]
    pub operation: Option<String>,

    #[serde(default)]
    pub data: Option<EventData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    /// Composite wristband id, `<entityId>#<suffix...>`
    #[serde(default)]
    pub bw_id: Option<String>,

    #[serde(default)]
    pub current_zone: Option<String>,

    #[serde(default)]
    pub pre_assigned: Option<bool>,

    /// Epoch milliseconds
    #[serde(default)]
    pub timestamp: Option<i64>,

    #[serde(default, rename = "totalBWIdQty")]
    pub total_bw_id_qty: Option<i32>,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub lat: Option<f64>,

    #[serde(default)]
    pub lon: Option<f64>,
}

impl EventRecord {
    pub fn bw_id(&self) -> Option<&str> {
        self.data.as_ref()?.bw_id.as_deref()
    }

    /// Stable wristband identity: the part of `bwId` before the first `#`.
    pub fn entity_id(&self) -> Option<&str> {
        self.bw_id().and_then(entity_id_of)
    }

    pub fn zone(&self) -> Option<&str> {
        self.data.as_ref()?.current_zone.as_deref()
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.data.as_ref()?.timestamp
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        let data = self.data.as_ref()?;
        Some((data.lat?, data.lon?))
    }
}

/// Derive the entity id from a composite `bwId`.
///
/// Returns `None` when the prefix is empty.
pub fn entity_id_of(bw_id: &str) -> Option<&str> {
    let prefix = bw_id.split('#').next().unwrap_or_default();
    if prefix.is_empty() {
        None
    } else {
        Some(prefix)
    }
}

/// Render an epoch-millisecond timestamp for display.
pub fn format_timestamp(timestamp_ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// A record as shown in the events table, with its time pre-rendered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRow {
    #[serde(flatten)]
    pub record: EventRecord,
    pub formatted_time: Option<String>,
}

impl From<EventRecord> for EventRow {
    fn from(record: EventRecord) -> Self {
        let formatted_time = record.timestamp().and_then(format_timestamp);
        Self {
            record,
            formatted_time,
        }
    }
}

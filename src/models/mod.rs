pub mod event;
pub mod filter;

pub use event::{entity_id_of, format_timestamp, EventData, EventRecord, EventRow};
pub use filter::{EventQuery, RecordFilter};

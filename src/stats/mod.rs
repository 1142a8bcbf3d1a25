//! Dashboard statistics
//!
//! Every function here is a pure computation over an in-memory record set.
//! Nothing is cached or updated incrementally: callers recompute from
//! scratch whenever the record set or the selected wristband changes.

pub mod frequency;
pub mod map;
pub mod summary;
pub mod zones;

pub use frequency::{compute_identity_frequency, IdentityFrequency};
pub use map::{build_map_view, LatLon, MapMarker, MapTrack, MapView};
pub use summary::{summarize, summarize_wristbands, EventSummary, WristbandSummary};
pub use zones::{
    compute_entity_zone_stats, compute_overall_zone_stats, fold_zone_transitions,
    group_by_entity, merge_zone_stats, ZoneVisitStat,
};

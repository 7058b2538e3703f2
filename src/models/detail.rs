use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::statistics::EventStatus;

/// Registry row joined with its (possibly absent) statistics row.
/// This is the JSON shape every event-returning endpoint serves:
/// missing statistics coalesce to Stopped / zero duration.
#[derive(Debug, Clone, Serialize)]
pub struct EventWithStats {
    pub event_id: i64,
    pub event_name: String,
    pub event_desc: Option<String>,
    pub create_time: NaiveDateTime,
    pub update_time: NaiveDateTime,
    pub responsible_person: Option<String>,
    pub event_del_status: i64,
    pub event_mark_status: i64,
    pub event_status: EventStatus,
    pub total_duration_seconds: Decimal,
    pub last_start_time: Option<NaiveDateTime>,
    pub last_stop_time: Option<NaiveDateTime>,
}

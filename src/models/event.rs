use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Registry row from `event_info`.
///
/// Flag columns keep the 0/1 wire format the dashboard front end expects:
/// `event_del_status` 1 = active, 0 = soft-deleted;
/// `event_mark_status` 1 = featured on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub event_id: i64,
    pub event_name: String,
    pub event_desc: Option<String>,
    pub responsible_person: Option<String>,
    pub create_time: NaiveDateTime,
    pub update_time: NaiveDateTime,
    pub event_del_status: i64,
    pub event_mark_status: i64,
}

impl Event {
    pub fn is_deleted(&self) -> bool {
        self.event_del_status == 0
    }
}

/// Partial update accepted by `PUT /api/events/{id}`.
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
    pub event_name: Option<String>,
    pub event_desc: Option<String>,
    pub responsible_person: Option<String>,
    pub event_mark_status: Option<i64>,
    pub event_del_status: Option<i64>,
}

impl EventPatch {
    /// True when no recognized field was supplied.
    pub fn is_empty(&self) -> bool {
        self.event_name.is_none()
            && self.event_desc.is_none()
            && self.responsible_person.is_none()
            && self.event_mark_status.is_none()
            && self.event_del_status.is_none()
    }
}

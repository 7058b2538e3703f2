use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Wire format: 1 = running, 0 = stopped. Events without a statistics
/// row report Stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Stopped,
    Running,
}

impl EventStatus {
    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(EventStatus::Stopped),
            1 => Some(EventStatus::Running),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            EventStatus::Stopped => 0,
            EventStatus::Running => 1,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, EventStatus::Running)
    }
}

impl Serialize for EventStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

/// Derived running-duration snapshot for one event (`event_statistics`).
///
/// Invariants:
/// - `total_duration_seconds` is non-negative and never decreases;
/// - `event_status == Running` implies `last_start_time` is the time of
///   the most recent start entry.
///
/// Mutated exclusively by the accrual engine; the API never writes it
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub event_id: i64,
    pub last_start_time: Option<NaiveDateTime>,
    pub last_stop_time: Option<NaiveDateTime>,
    pub total_duration_seconds: Decimal,
    pub event_status: EventStatus,
}

impl Statistics {
    pub fn is_running(&self) -> bool {
        self.event_status.is_running()
    }
}

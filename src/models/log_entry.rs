use serde::{Serialize, Serializer};

/// Start/stop action recorded against an event.
/// Wire format: 1 = start, 0 = stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    Stop,
    Start,
}

impl LogType {
    /// Convert wire integer → enum
    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(LogType::Stop),
            1 => Some(LogType::Start),
            _ => None,
        }
    }

    /// Convert enum → wire integer
    pub fn as_i64(&self) -> i64 {
        match self {
            LogType::Stop => 0,
            LogType::Start => 1,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, LogType::Start)
    }

    /// Past-tense verb used in API confirmation messages.
    pub fn verb(&self) -> &'static str {
        match self {
            LogType::Stop => "stopped",
            LogType::Start => "started",
        }
    }
}

impl Serialize for LogType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

//! Timestamp helpers shared by the db and core layers.
//!
//! All timestamps are stored as TEXT in ISO-8601 with millisecond
//! precision and serialized back to ISO-8601 on the wire.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::errors::{AppError, AppResult};

pub const DB_TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current local time at the resolution stored in the database.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn to_db(ts: &NaiveDateTime) -> String {
    ts.format(DB_TS_FORMAT).to_string()
}

/// Parse a stored timestamp. Accepts the canonical format plus the
/// fraction-less and space-separated variants older rows may carry.
pub fn from_db(raw: &str) -> AppResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DB_TS_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|_| AppError::InvalidTimestamp(raw.to_string()))
}

/// Parse a plain `YYYY-MM-DD` date (search range bounds).
pub fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| AppError::InvalidDate(raw.to_string()))
}

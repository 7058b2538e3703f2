//! Logging orchestration: validates the requested transition, appends the
//! log entry, runs the accrual engine, and persists the new statistics.
//!
//! Callers pass a connection that is inside an open transaction; a failure
//! anywhere in the sequence rolls the whole unit back, so an orphan log
//! entry or stale statistics row is never observable.

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::core::accrual;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::log_entry::LogType;
use crate::models::statistics::Statistics;

/// Result of a recorded start/stop action.
#[derive(Debug)]
pub struct LogOutcome {
    pub log_id: i64,
    pub log_time: NaiveDateTime,
    pub statistics: Statistics,
}

/// Append a start/stop entry for an event and update its statistics.
///
/// Transition policy enforced here (the engine stays permissive):
/// - unknown event → `EventNotFound`
/// - soft-deleted event → `Validation`
/// - start while already running → `Conflict`
/// - stop while stopped is accepted; the engine adds zero duration.
pub fn record_log_action(
    conn: &Connection,
    event_id: i64,
    log_type: LogType,
    log_time: NaiveDateTime,
) -> AppResult<LogOutcome> {
    let event = queries::get_event(conn, event_id)?.ok_or(AppError::EventNotFound)?;
    if event.is_deleted() {
        return Err(AppError::Validation(
            "Cannot log action for a deleted event".to_string(),
        ));
    }

    let current = queries::get_statistics(conn, event_id)?;
    let running = current.as_ref().map(|s| s.is_running()).unwrap_or(false);
    if log_type.is_start() && running {
        return Err(AppError::Conflict("Event is already running".to_string()));
    }

    append_and_accrue(conn, current, event_id, log_type, log_time)
}

/// Force-stop a running event (soft-delete path). Bypasses the deleted
/// check and is a no-op when the event is not running.
pub fn force_stop_if_running(
    conn: &Connection,
    event_id: i64,
    log_time: NaiveDateTime,
) -> AppResult<Option<LogOutcome>> {
    match queries::get_statistics(conn, event_id)? {
        Some(stats) if stats.is_running() => {
            append_and_accrue(conn, Some(stats), event_id, LogType::Stop, log_time).map(Some)
        }
        _ => Ok(None),
    }
}

fn append_and_accrue(
    conn: &Connection,
    current: Option<Statistics>,
    event_id: i64,
    log_type: LogType,
    log_time: NaiveDateTime,
) -> AppResult<LogOutcome> {
    let log_id = queries::insert_log_entry(conn, event_id, log_type, log_time)?;
    let next = accrual::apply(current.as_ref(), event_id, log_type, log_time);
    queries::upsert_statistics(conn, &next)?;

    Ok(LogOutcome {
        log_id,
        log_time,
        statistics: next,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use crate::models::statistics::EventStatus;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        conn
    }

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 12)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn seed_event(conn: &Connection, name: &str) -> i64 {
        queries::insert_event(conn, name, None, None, ts(8, 0, 0)).unwrap()
    }

    fn count_logs(conn: &Connection, event_id: i64) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM event_logs WHERE event_id = ?1",
            [event_id],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn start_stop_persists_statistics() {
        let conn = test_conn();
        let id = seed_event(&conn, "Deploy window");

        record_log_action(&conn, id, LogType::Start, ts(10, 0, 0)).unwrap();
        let outcome = record_log_action(&conn, id, LogType::Stop, ts(10, 0, 30)).unwrap();

        assert_eq!(outcome.statistics.total_duration_seconds, Decimal::new(30, 0));
        assert_eq!(count_logs(&conn, id), 2);

        let stored = queries::get_statistics(&conn, id).unwrap().unwrap();
        assert_eq!(stored, outcome.statistics);
    }

    #[test]
    fn start_while_running_is_a_conflict() {
        let conn = test_conn();
        let id = seed_event(&conn, "Scan");

        record_log_action(&conn, id, LogType::Start, ts(10, 0, 0)).unwrap();
        let err = record_log_action(&conn, id, LogType::Start, ts(10, 1, 0)).unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        // The rejected action must not have appended a log entry.
        assert_eq!(count_logs(&conn, id), 1);
    }

    #[test]
    fn stop_while_stopped_is_idempotent() {
        let conn = test_conn();
        let id = seed_event(&conn, "Scan");

        record_log_action(&conn, id, LogType::Start, ts(10, 0, 0)).unwrap();
        record_log_action(&conn, id, LogType::Stop, ts(10, 0, 30)).unwrap();
        let second = record_log_action(&conn, id, LogType::Stop, ts(10, 1, 0)).unwrap();

        assert_eq!(second.statistics.total_duration_seconds, Decimal::new(30, 0));
        assert_eq!(second.statistics.event_status, EventStatus::Stopped);
    }

    #[test]
    fn unknown_event_is_not_found() {
        let conn = test_conn();
        let err = record_log_action(&conn, 999, LogType::Start, ts(10, 0, 0)).unwrap_err();
        assert!(matches!(err, AppError::EventNotFound));
    }

    #[test]
    fn deleted_event_rejects_log_actions() {
        let conn = test_conn();
        let id = seed_event(&conn, "Old task");
        queries::soft_delete_event(&conn, id, ts(9, 0, 0)).unwrap();

        let err = record_log_action(&conn, id, LogType::Start, ts(10, 0, 0)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn force_stop_appends_exactly_one_entry_when_running() {
        let conn = test_conn();
        let id = seed_event(&conn, "Capture");

        record_log_action(&conn, id, LogType::Start, ts(10, 0, 0)).unwrap();
        let outcome = force_stop_if_running(&conn, id, ts(10, 2, 0)).unwrap();

        assert!(outcome.is_some());
        assert_eq!(count_logs(&conn, id), 2);
        let stats = queries::get_statistics(&conn, id).unwrap().unwrap();
        assert_eq!(stats.event_status, EventStatus::Stopped);
        assert_eq!(stats.total_duration_seconds, Decimal::new(120, 0));
    }

    #[test]
    fn force_stop_is_a_noop_when_stopped_or_unlogged() {
        let conn = test_conn();
        let id = seed_event(&conn, "Idle");

        assert!(force_stop_if_running(&conn, id, ts(10, 0, 0))
            .unwrap()
            .is_none());
        assert_eq!(count_logs(&conn, id), 0);
    }
}

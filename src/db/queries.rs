//! Event registry queries: CRUD on `event_info`, the append-only
//! `event_logs` store, and reads/writes of `event_statistics`.

use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result, Row};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::db::filters::{EventFilter, EventSort, Page};
use crate::errors::{AppError, AppResult};
use crate::models::detail::EventWithStats;
use crate::models::event::{Event, EventPatch};
use crate::models::log_entry::LogType;
use crate::models::statistics::{EventStatus, Statistics};
use crate::utils::time;

/// Joined projection served by every event-returning endpoint. Missing
/// statistics coalesce to Stopped / zero duration.
const EVENT_WITH_STATS: &str = "
    SELECT
        e.event_id, e.event_name, e.event_desc, e.create_time, e.update_time,
        e.responsible_person, e.event_del_status, e.event_mark_status,
        COALESCE(s.event_status, 0) AS event_status,
        COALESCE(s.total_duration_seconds, '0') AS total_duration_seconds,
        s.last_start_time, s.last_stop_time
    FROM event_info e
    LEFT JOIN event_statistics s ON e.event_id = s.event_id";

fn conversion_err(err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

fn get_timestamp(row: &Row, idx: &str) -> Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    time::from_db(&raw).map_err(conversion_err)
}

fn get_opt_timestamp(row: &Row, idx: &str) -> Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|r| time::from_db(&r).map_err(conversion_err))
        .transpose()
}

fn get_duration(row: &Row, idx: &str) -> Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw).map_err(|_| conversion_err(AppError::InvalidDuration(raw)))
}

fn get_status(row: &Row, idx: &str) -> Result<EventStatus> {
    let raw: i64 = row.get(idx)?;
    EventStatus::from_i64(raw).ok_or_else(|| {
        conversion_err(AppError::Other(format!("Invalid event status: {}", raw)))
    })
}

pub fn map_event_row(row: &Row) -> Result<Event> {
    Ok(Event {
        event_id: row.get("event_id")?,
        event_name: row.get("event_name")?,
        event_desc: row.get("event_desc")?,
        responsible_person: row.get("responsible_person")?,
        create_time: get_timestamp(row, "create_time")?,
        update_time: get_timestamp(row, "update_time")?,
        event_del_status: row.get("event_del_status")?,
        event_mark_status: row.get("event_mark_status")?,
    })
}

pub fn map_joined_row(row: &Row) -> Result<EventWithStats> {
    Ok(EventWithStats {
        event_id: row.get("event_id")?,
        event_name: row.get("event_name")?,
        event_desc: row.get("event_desc")?,
        create_time: get_timestamp(row, "create_time")?,
        update_time: get_timestamp(row, "update_time")?,
        responsible_person: row.get("responsible_person")?,
        event_del_status: row.get("event_del_status")?,
        event_mark_status: row.get("event_mark_status")?,
        event_status: get_status(row, "event_status")?,
        total_duration_seconds: get_duration(row, "total_duration_seconds")?,
        last_start_time: get_opt_timestamp(row, "last_start_time")?,
        last_stop_time: get_opt_timestamp(row, "last_stop_time")?,
    })
}

fn map_statistics_row(row: &Row) -> Result<Statistics> {
    Ok(Statistics {
        event_id: row.get("event_id")?,
        last_start_time: get_opt_timestamp(row, "last_start_time")?,
        last_stop_time: get_opt_timestamp(row, "last_stop_time")?,
        total_duration_seconds: get_duration(row, "total_duration_seconds")?,
        event_status: get_status(row, "event_status")?,
    })
}

/// Insert a new event; empty person is stored as NULL. Returns the id.
pub fn insert_event(
    conn: &Connection,
    name: &str,
    desc: Option<&str>,
    person: Option<&str>,
    now: NaiveDateTime,
) -> AppResult<i64> {
    let person = person.filter(|p| !p.is_empty());
    conn.execute(
        "INSERT INTO event_info (event_name, event_desc, responsible_person, create_time, update_time)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![name, desc, person, time::to_db(&now), time::to_db(&now)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_event(conn: &Connection, event_id: i64) -> AppResult<Option<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, event_name, event_desc, responsible_person,
                create_time, update_time, event_del_status, event_mark_status
         FROM event_info WHERE event_id = ?1",
    )?;
    Ok(stmt.query_row([event_id], map_event_row).optional()?)
}

pub fn get_event_with_stats(conn: &Connection, event_id: i64) -> AppResult<Option<EventWithStats>> {
    let sql = format!("{} WHERE e.event_id = ?1", EVENT_WITH_STATS);
    let mut stmt = conn.prepare(&sql)?;
    Ok(stmt.query_row([event_id], map_joined_row).optional()?)
}

pub fn get_statistics(conn: &Connection, event_id: i64) -> AppResult<Option<Statistics>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, last_start_time, last_stop_time, total_duration_seconds, event_status
         FROM event_statistics WHERE event_id = ?1",
    )?;
    Ok(stmt.query_row([event_id], map_statistics_row).optional()?)
}

/// Append one immutable start/stop entry. Returns the log id.
pub fn insert_log_entry(
    conn: &Connection,
    event_id: i64,
    log_type: LogType,
    log_time: NaiveDateTime,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO event_logs (event_id, log_type, log_time) VALUES (?1, ?2, ?3)",
        params![event_id, log_type.as_i64(), time::to_db(&log_time)],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Persist an accrual engine result. One row per event, lazily created.
pub fn upsert_statistics(conn: &Connection, stats: &Statistics) -> AppResult<()> {
    conn.execute(
        "INSERT INTO event_statistics
             (event_id, last_start_time, last_stop_time, total_duration_seconds, event_status)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(event_id) DO UPDATE SET
             last_start_time = excluded.last_start_time,
             last_stop_time = excluded.last_stop_time,
             total_duration_seconds = excluded.total_duration_seconds,
             event_status = excluded.event_status",
        params![
            stats.event_id,
            stats.last_start_time.as_ref().map(time::to_db),
            stats.last_stop_time.as_ref().map(time::to_db),
            stats.total_duration_seconds.to_string(),
            stats.event_status.as_i64(),
        ],
    )?;
    Ok(())
}

/// Apply a partial update and bump `update_time`. Column names are fixed
/// literals; only values are bound. Returns the matched-row count.
pub fn update_event(
    conn: &Connection,
    event_id: i64,
    patch: &EventPatch,
    now: NaiveDateTime,
) -> AppResult<usize> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(name) = &patch.event_name {
        sets.push("event_name = ?");
        values.push(Value::Text(name.clone()));
    }
    if let Some(desc) = &patch.event_desc {
        sets.push("event_desc = ?");
        values.push(Value::Text(desc.clone()));
    }
    if let Some(person) = &patch.responsible_person {
        sets.push("responsible_person = ?");
        if person.is_empty() {
            values.push(Value::Null);
        } else {
            values.push(Value::Text(person.clone()));
        }
    }
    if let Some(mark) = patch.event_mark_status {
        sets.push("event_mark_status = ?");
        values.push(Value::Integer(mark));
    }
    if let Some(del) = patch.event_del_status {
        sets.push("event_del_status = ?");
        values.push(Value::Integer(del));
    }

    if sets.is_empty() {
        return Ok(0);
    }

    sets.push("update_time = ?");
    values.push(Value::Text(time::to_db(&now)));
    values.push(Value::Integer(event_id));

    let sql = format!(
        "UPDATE event_info SET {} WHERE event_id = ?",
        sets.join(", ")
    );
    Ok(conn.execute(&sql, params_from_iter(values))?)
}

/// Flip `event_del_status` to deleted. Returns the matched-row count.
pub fn soft_delete_event(conn: &Connection, event_id: i64, now: NaiveDateTime) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE event_info SET event_del_status = 0, update_time = ?1 WHERE event_id = ?2",
        params![time::to_db(&now), event_id],
    )?)
}

/// Filtered, sorted, paginated listing plus the unpaginated match count.
pub fn list_events(
    conn: &Connection,
    filter: &EventFilter,
    sort: &EventSort,
    page: &Page,
) -> AppResult<(Vec<EventWithStats>, i64)> {
    let (where_sql, mut values) = filter.where_clause();

    let count_sql = format!(
        "SELECT COUNT(*) FROM event_info e
         LEFT JOIN event_statistics s ON e.event_id = s.event_id
         WHERE {}",
        where_sql
    );
    let total: i64 = conn.query_row(
        &count_sql,
        params_from_iter(values.clone()),
        |row| row.get(0),
    )?;

    let data_sql = format!(
        "{} WHERE {} {} LIMIT ? OFFSET ?",
        EVENT_WITH_STATS,
        where_sql,
        sort.order_clause()
    );
    values.push(Value::Integer(page.limit));
    values.push(Value::Integer(page.offset()));

    let mut stmt = conn.prepare(&data_sql)?;
    let rows = stmt.query_map(params_from_iter(values), map_joined_row)?;

    let mut events = Vec::new();
    for row in rows {
        events.push(row?);
    }
    Ok((events, total))
}

/// Marked, non-deleted events for the dashboard, oldest first.
pub fn dashboard_events(conn: &Connection) -> AppResult<Vec<EventWithStats>> {
    let sql = format!(
        "{} WHERE e.event_mark_status = 1 AND e.event_del_status = 1
         ORDER BY e.create_time ASC, e.event_id ASC",
        EVENT_WITH_STATS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_joined_row)?;

    let mut events = Vec::new();
    for row in rows {
        events.push(row?);
    }
    Ok(events)
}

/// Distinct non-empty responsible persons, sorted ascending.
pub fn distinct_persons(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT responsible_person FROM event_info
         WHERE responsible_person IS NOT NULL AND responsible_person != ''
         ORDER BY responsible_person ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut persons = Vec::new();
    for row in rows {
        persons.push(row?);
    }
    Ok(persons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use chrono::NaiveDate;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        conn
    }

    fn ts(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn insert_and_fetch_round_trip() {
        let conn = test_conn();
        let id = insert_event(&conn, "Port scan", Some("nightly"), Some("ana"), ts(1, 9)).unwrap();

        let event = get_event(&conn, id).unwrap().unwrap();
        assert_eq!(event.event_name, "Port scan");
        assert_eq!(event.event_desc.as_deref(), Some("nightly"));
        assert_eq!(event.responsible_person.as_deref(), Some("ana"));
        assert_eq!(event.event_del_status, 1);
        assert_eq!(event.event_mark_status, 0);
        assert!(!event.is_deleted());

        // No statistics row yet → coalesced defaults.
        let joined = get_event_with_stats(&conn, id).unwrap().unwrap();
        assert!(!joined.event_status.is_running());
        assert_eq!(joined.total_duration_seconds, Decimal::ZERO);
        assert_eq!(joined.last_start_time, None);
    }

    #[test]
    fn empty_person_is_stored_as_null() {
        let conn = test_conn();
        let id = insert_event(&conn, "Orphan", None, Some(""), ts(1, 9)).unwrap();
        let event = get_event(&conn, id).unwrap().unwrap();
        assert_eq!(event.responsible_person, None);
    }

    #[test]
    fn patch_updates_only_supplied_fields() {
        let conn = test_conn();
        let id = insert_event(&conn, "Old name", Some("keep me"), Some("bo"), ts(1, 9)).unwrap();

        let patch = EventPatch {
            event_name: Some("New name".to_string()),
            event_mark_status: Some(1),
            ..Default::default()
        };
        let changed = update_event(&conn, id, &patch, ts(2, 10)).unwrap();
        assert_eq!(changed, 1);

        let event = get_event(&conn, id).unwrap().unwrap();
        assert_eq!(event.event_name, "New name");
        assert_eq!(event.event_desc.as_deref(), Some("keep me"));
        assert_eq!(event.event_mark_status, 1);
        assert_eq!(event.update_time, ts(2, 10));
    }

    #[test]
    fn empty_patch_touches_nothing() {
        let conn = test_conn();
        let id = insert_event(&conn, "Stable", None, None, ts(1, 9)).unwrap();
        let changed = update_event(&conn, id, &EventPatch::default(), ts(2, 10)).unwrap();
        assert_eq!(changed, 0);
        let event = get_event(&conn, id).unwrap().unwrap();
        assert_eq!(event.update_time, ts(1, 9));
    }

    #[test]
    fn statistics_upsert_inserts_then_updates() {
        let conn = test_conn();
        let id = insert_event(&conn, "Upsertable", None, None, ts(1, 9)).unwrap();

        let first = Statistics {
            event_id: id,
            last_start_time: Some(ts(1, 10)),
            last_stop_time: None,
            total_duration_seconds: Decimal::ZERO,
            event_status: EventStatus::Running,
        };
        upsert_statistics(&conn, &first).unwrap();
        assert_eq!(get_statistics(&conn, id).unwrap().unwrap(), first);

        let second = Statistics {
            last_stop_time: Some(ts(1, 11)),
            total_duration_seconds: Decimal::new(3600, 0),
            event_status: EventStatus::Stopped,
            ..first
        };
        upsert_statistics(&conn, &second).unwrap();
        assert_eq!(get_statistics(&conn, id).unwrap().unwrap(), second);

        // Still a single row.
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM event_statistics", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn list_filters_sorts_and_paginates() {
        let conn = test_conn();
        for i in 1..=5u32 {
            insert_event(&conn, &format!("Event {}", i), None, Some("zoe"), ts(i, 9)).unwrap();
        }
        insert_event(&conn, "Unassigned probe", None, None, ts(6, 9)).unwrap();

        // Substring filter.
        let filter = EventFilter {
            name: Some("probe".to_string()),
            ..Default::default()
        };
        let (events, total) =
            list_events(&conn, &filter, &EventSort::default(), &Page::new(1, 10)).unwrap();
        assert_eq!(total, 1);
        assert_eq!(events[0].event_name, "Unassigned probe");

        // Pagination over the person-filtered set, oldest first.
        let filter = EventFilter {
            person: Some("zoe".to_string()),
            ..Default::default()
        };
        let sort = EventSort {
            key: "create_time".to_string(),
            descending: false,
        };
        let (events, total) = list_events(&conn, &filter, &sort, &Page::new(2, 2)).unwrap();
        assert_eq!(total, 5);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_name, "Event 3");
        assert_eq!(events[1].event_name, "Event 4");
    }

    #[test]
    fn soft_deleted_events_are_hidden_unless_requested() {
        let conn = test_conn();
        let id = insert_event(&conn, "Ghost", None, None, ts(1, 9)).unwrap();
        insert_event(&conn, "Alive", None, None, ts(2, 9)).unwrap();
        soft_delete_event(&conn, id, ts(3, 9)).unwrap();

        let (events, total) = list_events(
            &conn,
            &EventFilter::default(),
            &EventSort::default(),
            &Page::new(1, 10),
        )
        .unwrap();
        assert_eq!(total, 1);
        assert_eq!(events[0].event_name, "Alive");

        let filter = EventFilter {
            show_deleted: true,
            ..Default::default()
        };
        let (_, total) =
            list_events(&conn, &filter, &EventSort::default(), &Page::new(1, 10)).unwrap();
        assert_eq!(total, 2);
    }

    #[test]
    fn distinct_persons_skips_null_and_empty() {
        let conn = test_conn();
        insert_event(&conn, "A", None, Some("zoe"), ts(1, 9)).unwrap();
        insert_event(&conn, "B", None, Some("ana"), ts(2, 9)).unwrap();
        insert_event(&conn, "C", None, Some("zoe"), ts(3, 9)).unwrap();
        insert_event(&conn, "D", None, Some(""), ts(4, 9)).unwrap();
        insert_event(&conn, "E", None, None, ts(5, 9)).unwrap();

        assert_eq!(distinct_persons(&conn).unwrap(), vec!["ana", "zoe"]);
    }

    #[test]
    fn dashboard_returns_marked_active_events_oldest_first() {
        let conn = test_conn();
        let a = insert_event(&conn, "Older", None, None, ts(1, 9)).unwrap();
        let b = insert_event(&conn, "Newer", None, None, ts(2, 9)).unwrap();
        insert_event(&conn, "Unmarked", None, None, ts(3, 9)).unwrap();

        let mark = EventPatch {
            event_mark_status: Some(1),
            ..Default::default()
        };
        update_event(&conn, a, &mark, ts(4, 9)).unwrap();
        update_event(&conn, b, &mark, ts(4, 9)).unwrap();

        let events = dashboard_events(&conn).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_name, "Older");
        assert_eq!(events[1].event_name, "Newer");

        // Deleting drops it from the dashboard.
        soft_delete_event(&conn, a, ts(5, 9)).unwrap();
        let events = dashboard_events(&conn).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_name, "Newer");
    }
}

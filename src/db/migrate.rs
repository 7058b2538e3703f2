//! Schema migrations.
//!
//! Each migration probes the live schema (sqlite_master / PRAGMA
//! table_info) before acting and records itself in the internal `log`
//! table, so running them is always safe and idempotent.

use crate::errors::AppResult;
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the internal `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name = ?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut stmt = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(stmt.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Create the event registry, log store and statistics tables.
fn migrate_create_event_schema(conn: &Connection) -> Result<()> {
    let version = "20250412_0001_event_schema";

    if migration_applied(conn, version)? || table_exists(conn, "event_info")? {
        return Ok(());
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS event_info (
            event_id           INTEGER PRIMARY KEY AUTOINCREMENT,
            event_name         TEXT NOT NULL,
            event_desc         TEXT,
            responsible_person TEXT,
            create_time        TEXT NOT NULL,
            update_time        TEXT NOT NULL,
            event_del_status   INTEGER NOT NULL DEFAULT 1,
            event_mark_status  INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS event_logs (
            log_id   INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id INTEGER NOT NULL REFERENCES event_info(event_id),
            log_type INTEGER NOT NULL CHECK(log_type IN (0, 1)),
            log_time TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS event_statistics (
            stat_id                INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id               INTEGER NOT NULL UNIQUE REFERENCES event_info(event_id),
            last_start_time        TEXT,
            last_stop_time         TEXT,
            total_duration_seconds TEXT NOT NULL DEFAULT '0',
            event_status           INTEGER NOT NULL DEFAULT 0 CHECK(event_status IN (0, 1))
        );

        CREATE INDEX IF NOT EXISTS idx_event_info_create_time ON event_info(create_time);
        CREATE INDEX IF NOT EXISTS idx_event_logs_event_time ON event_logs(event_id, log_time);
        "#,
    )?;

    mark_applied(conn, version, "Created event_info, event_logs, event_statistics")?;
    success(format!("Migration applied: {} → event schema created", version));

    Ok(())
}

/// Covering index for the dashboard query (marked, active, by creation).
fn migrate_add_dashboard_index(conn: &Connection) -> Result<()> {
    let version = "20250503_0002_dashboard_index";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_event_info_dashboard
         ON event_info(event_mark_status, event_del_status, create_time);",
    )?;

    mark_applied(conn, version, "Added dashboard covering index")?;
    success(format!("Migration applied: {} → dashboard index", version));

    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked from db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;
    migrate_create_event_schema(conn)?;
    migrate_add_dashboard_index(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        run_pending_migrations(&conn).unwrap();

        assert!(table_exists(&conn, "event_info").unwrap());
        assert!(table_exists(&conn, "event_logs").unwrap());
        assert!(table_exists(&conn, "event_statistics").unwrap());

        // Each migration is recorded once.
        let applied: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(applied, 2);
    }
}

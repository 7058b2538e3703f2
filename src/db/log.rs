//! Internal operations log (`log` table): init, migrations, maintenance.
//! Unrelated to `event_logs`, which stores user start/stop actions.

use rusqlite::{params, Connection};

/// Append a row to the internal log table.
pub fn record(conn: &Connection, operation: &str, target: &str, message: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), ?1, ?2, ?3)",
        params![operation, target, message],
    )?;
    Ok(())
}

//! Inspection and maintenance of the event database file: the
//! `db --info` report plus integrity-check and vacuum helpers.

use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::{Connection, OptionalExtension, Result};
use std::fs;

/// Print database information for `db --info`.
pub fn print_db_info(conn: &Connection, db_path: &str) -> Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) EVENT COUNTS
    //
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM event_info", [], |row| row.get(0))?;
    let active: i64 = conn.query_row(
        "SELECT COUNT(*) FROM event_info WHERE event_del_status = 1",
        [],
        |row| row.get(0),
    )?;
    let running: i64 = conn.query_row(
        "SELECT COUNT(*) FROM event_statistics WHERE event_status = 1",
        [],
        |row| row.get(0),
    )?;
    let log_entries: i64 = conn.query_row("SELECT COUNT(*) FROM event_logs", [], |row| row.get(0))?;

    println!("{}• Events:{} {}{}{} ({} active)", CYAN, RESET, GREEN, total, RESET, active);
    println!("{}• Running now:{} {}{}{}", CYAN, RESET, GREEN, running, RESET);
    println!("{}• Log entries:{} {}{}{}", CYAN, RESET, GREEN, log_entries, RESET);

    //
    // 3) CREATION RANGE
    //
    let first: Option<String> = conn
        .query_row(
            "SELECT create_time FROM event_info ORDER BY create_time ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    let last: Option<String> = conn
        .query_row(
            "SELECT create_time FROM event_info ORDER BY create_time DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let fmt_first = first.unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = last.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Created between:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    println!();
    Ok(())
}

/// PRAGMA integrity_check verdict; "ok" means the file is sound.
pub fn integrity_check(conn: &Connection) -> Result<String> {
    conn.query_row("PRAGMA integrity_check;", [], |row| row.get(0))
}

/// Reclaim file space, e.g. after log-table cleanups.
pub fn vacuum(conn: &Connection) -> Result<()> {
    conn.execute_batch("VACUUM;")
}

use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::db::{log, stats};
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success, warning};

/// Handle the `db` command: schema migrations and file maintenance for
/// the event database. Actions combine freely and run in a fixed order:
/// migrate, info, check, vacuum.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Db {
        migrate,
        check,
        vacuum,
        info: show_info,
    } = cmd
    else {
        return Ok(());
    };

    if !(*migrate || *check || *vacuum || *show_info) {
        warning("Nothing to do: pass --migrate, --check, --vacuum or --info");
        return Ok(());
    }

    let pool = DbPool::new(&cfg.database)?;

    if *migrate {
        info("Applying event schema migrations…");
        run_pending_migrations(&pool.conn)?;
        success("Migration completed.");
    }

    if *show_info {
        stats::print_db_info(&pool.conn, &cfg.database)?;
    }

    if *check {
        info("Checking event database integrity…");
        let verdict = stats::integrity_check(&pool.conn)?;
        if verdict == "ok" {
            success("Integrity check passed.");
        } else {
            error(format!("Integrity check failed: {}", verdict));
        }
    }

    if *vacuum {
        info("Compacting the event database…");
        stats::vacuum(&pool.conn)?;
        // Best-effort audit trail; a missing log table must not fail
        // the vacuum itself.
        if let Err(e) = log::record(&pool.conn, "vacuum", &cfg.database, "Database compacted") {
            warning(format!("Failed to write internal log: {}", e));
        }
        success("Vacuum completed.");
    }

    Ok(())
}

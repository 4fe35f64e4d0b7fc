use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog_soft;
use crate::db::migrate::{applied_versions, run_pending_migrations};
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, info, success};

/// Maintenance actions run in a fixed order over one connection:
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
        info("Nothing to do. Use --migrate, --info, --check or --vacuum.");
        return Ok(());
    }

    let pool = DbPool::new(&cfg.database)?;

    if *migrate {
        let before = applied_versions(&pool.conn)?.len();
        run_pending_migrations(&pool.conn).map_err(|e| AppError::Migration(e.to_string()))?;
        let after = applied_versions(&pool.conn)?.len();

        if after == before {
            info("Schema already up to date.");
        } else {
            success(format!("{} migration(s) applied.", after - before));
            ttlog_soft(
                &pool.conn,
                "db",
                "migrate",
                &format!("{} migration(s) applied", after - before),
            );
        }
    }

    if *show_info {
        stats::print_db_info(&pool, &cfg.database)?;
    }

    if *check {
        let integrity: String = pool
            .conn
            .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;

        if integrity == "ok" {
            success("Integrity check passed.");
        } else {
            error(format!("Integrity check failed: {integrity}"));
        }
    }

    if *vacuum {
        pool.conn.execute_batch("VACUUM;")?;
        success("Vacuum completed.");
        ttlog_soft(&pool.conn, "db", "vacuum", "Database compacted");
    }

    Ok(())
}

use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::export::{ExportLogic, ExportResponse};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::{ensure_writable, notify_export_success};
use crate::ui::messages::{info, reserve_stdout, success, warning};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        request,
        report_type,
        passwords,
        template,
        out,
        role,
        force,
        dry_run,
    } = cmd
    {
        // 1️⃣ request body + flag overrides
        let req = ExportLogic::load_request(request.as_deref())?;
        let req = ExportLogic::apply_overrides(req, *report_type, *passwords, template.as_deref());

        let pool = DbPool::new(&cfg.database)?;

        // 2️⃣ dry run: layout only
        if *dry_run {
            let report = ExportLogic::dry_run(&pool, cfg, &req, role)?;
            info(format!(
                "{}: {} rows in {} groups, {} pages (strategy: {})",
                report.filename, report.rows, report.groups, report.pages, report.strategy
            ));
            if !report.columns.is_empty() {
                info(format!("Columns: {}", report.columns.join(" | ")));
            }
            if report.stale > 0 {
                warning(format!("{} selected key(s) no longer match any row", report.stale));
            }
            return Ok(());
        }

        // 3️⃣ output target
        let target = out
            .clone()
            .unwrap_or_else(|| req.report_type().filename());
        let to_stdout = target == "-";

        let response = if to_stdout {
            reserve_stdout(true);
            ExportLogic::run(&pool, cfg, &req, role, || Ok(io::stdout().lock()))
        } else {
            let path = PathBuf::from(&target);
            ensure_writable(&path, *force)?;
            ExportLogic::run(&pool, cfg, &req, role, || {
                File::create(&path).map(BufWriter::new)
            })
        };

        // 4️⃣ outcome
        match response {
            ExportResponse::Completed(summary) => {
                if to_stdout {
                    success(format!(
                        "{} streamed ({}, {} pages, {} bytes)",
                        summary.filename, summary.content_type, summary.pages, summary.bytes
                    ));
                } else {
                    notify_export_success("PDF", &PathBuf::from(&target));
                    info(format!(
                        "{} rows in {} groups, {} pages",
                        summary.rows, summary.groups, summary.pages
                    ));
                }
            }
            ExportResponse::Rejected(e) => return Err(e),
            ExportResponse::Aborted(e) => {
                warning(format!("Export aborted, output is incomplete: {e}"));
            }
        }
    }
    Ok(())
}

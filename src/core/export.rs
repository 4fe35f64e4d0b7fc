use crate::auth::Capability;
use crate::config::Config;
use crate::db::log::ttlog_soft;
use crate::db::pool::DbPool;
use crate::db::queries::SqliteRowSource;
use crate::errors::{AppError, AppResult};
use crate::export::surface::RecordingSurface;
use crate::export::template::{Element, TemplateStore};
use crate::export::{ExportDispatcher, ExportSummary, FsAssetResolver, PreparedExport};
use crate::models::{ExportRequest, ReportType};
use std::fs;
use std::io::{self, Write};

/// How an export ended, from the caller's point of view.
#[derive(Debug)]
pub enum ExportResponse {
    /// The whole document reached the sink.
    Completed(ExportSummary),
    /// Refused before any byte was written: a structured error for the caller.
    Rejected(AppError),
    /// Failed after streaming began; only logged.
    Aborted(AppError),
}

/// What a dry run would have produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunReport {
    pub filename: String,
    pub strategy: &'static str,
    pub rows: usize,
    pub groups: usize,
    pub pages: usize,
    pub stale: usize,
    pub columns: Vec<String>,
    pub images: Vec<String>,
}

pub struct ExportLogic;

impl ExportLogic {
    /// Read a request body given inline, as `@path`, or not at all (empty
    /// body: export everything with the defaults).
    pub fn load_request(raw: Option<&str>) -> AppResult<ExportRequest> {
        let body = match raw.map(str::trim) {
            None | Some("") => return Ok(ExportRequest::default()),
            Some(r) if r.starts_with('@') => fs::read_to_string(&r[1..])?,
            Some(r) => r.to_string(),
        };
        ExportRequest::from_json(&body)
    }

    /// Command-line flags win over the request body.
    pub fn apply_overrides(
        mut request: ExportRequest,
        report_type: Option<ReportType>,
        passwords: bool,
        template: Option<&str>,
    ) -> ExportRequest {
        if let Some(t) = report_type {
            request.report_type = Some(t);
        }
        if passwords {
            request.include_passwords = true;
        }
        if let Some(id) = template {
            request.template_id = Some(id.to_string());
        }
        request
    }

    fn prepare(
        pool: &DbPool,
        cfg: &Config,
        request: &ExportRequest,
        caller: &dyn Capability,
    ) -> AppResult<PreparedExport> {
        let source = SqliteRowSource::new(&pool.conn);
        let templates = TemplateStore::new(&cfg.templates_dir);
        let assets = FsAssetResolver;

        let dispatcher = ExportDispatcher::new(cfg, &source, &templates, &assets);
        dispatcher.prepare(request, caller)
    }

    /// Log the recoverable problems found while preparing.
    fn log_degradations(pool: &DbPool, prepared: &PreparedExport) {
        let target = prepared.report_type.as_str();

        if prepared.stale > 0 {
            ttlog_soft(
                &pool.conn,
                "export_stale",
                target,
                &format!(
                    "{} selected key(s) no longer match any row",
                    prepared.stale
                ),
            );
        }

        for (asset, reason) in &prepared.branding.degraded {
            ttlog_soft(&pool.conn, "export_asset", asset, reason);
        }
    }

    /// Run the whole pipeline. The sink is opened only once the request has
    /// been accepted, so a rejected export never creates an output file.
    pub fn run<W, F>(
        pool: &DbPool,
        cfg: &Config,
        request: &ExportRequest,
        caller: &dyn Capability,
        open_sink: F,
    ) -> ExportResponse
    where
        W: Write,
        F: FnOnce() -> io::Result<W>,
    {
        let report_type = request.report_type();

        // 1️⃣ everything that can still be refused cleanly
        let prepared = match Self::prepare(pool, cfg, request, caller) {
            Ok(p) => p,
            Err(e) => {
                ttlog_soft(&pool.conn, "export_rejected", report_type.as_str(), &e.to_string());
                return ExportResponse::Rejected(e);
            }
        };

        Self::log_degradations(pool, &prepared);

        let sink = match open_sink() {
            Ok(s) => s,
            Err(e) => return ExportResponse::Rejected(AppError::Io(e)),
        };

        ttlog_soft(
            &pool.conn,
            "export",
            report_type.as_str(),
            &format!(
                "Started ({}): {} rows in {} groups",
                prepared.strategy,
                prepared.row_count(),
                prepared.groups.len()
            ),
        );

        // 2️⃣ streaming: from here on failures are only logged
        match prepared.stream(sink) {
            Ok(summary) => {
                ttlog_soft(
                    &pool.conn,
                    "export",
                    report_type.as_str(),
                    &format!(
                        "Completed: {} rows, {} pages, {} bytes",
                        summary.rows, summary.pages, summary.bytes
                    ),
                );
                ExportResponse::Completed(summary)
            }
            Err(e) => {
                ttlog_soft(&pool.conn, "export_abort", report_type.as_str(), &e.to_string());
                ExportResponse::Aborted(e)
            }
        }
    }

    /// Resolve and lay out the report on a recording surface. Nothing is
    /// written anywhere.
    pub fn dry_run(
        pool: &DbPool,
        cfg: &Config,
        request: &ExportRequest,
        caller: &dyn Capability,
    ) -> AppResult<DryRunReport> {
        let prepared = Self::prepare(pool, cfg, request, caller)?;

        let mut images: Vec<String> = prepared.branding.images.keys().cloned().collect();
        images.sort();

        let mut surface = RecordingSurface::with_images(images.clone());
        let pages = prepared.render_into(&mut surface);

        let renderer = prepared.renderer();
        let columns = prepared
            .template
            .pages
            .iter()
            .flat_map(|p| &p.elements)
            .find_map(|el| match el {
                Element::Table(t) => Some(renderer.table_layout(t)),
                _ => None,
            })
            .map(|layout| layout.labels().into_iter().map(str::to_string).collect())
            .unwrap_or_default();

        Ok(DryRunReport {
            filename: prepared.filename(),
            strategy: prepared.strategy,
            rows: prepared.row_count(),
            groups: prepared.groups.len(),
            pages,
            stale: prepared.stale,
            columns,
            images,
        })
    }
}

//! Server side of an export: capability check, row resolution by intent,
//! grouping, branding, then PDF streaming into any `Write` sink.

use crate::auth::Capability;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::export::assets::{AssetResolver, Branding, load_branding};
use crate::export::grouping::{ReportGroup, group_rows};
use crate::export::pdf::PdfManager;
use crate::export::render::TemplateRenderer;
use crate::export::source::RowSource;
use crate::export::surface::Surface;
use crate::export::template::{Template, TemplateStore};
use crate::models::{ExportIntent, ExportRequest, ReportRow, ReportType, RowKey};
use std::collections::BTreeSet;
use std::io::Write;

pub const CONTENT_TYPE: &str = "application/pdf";

/// Rows resolved for one intent.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRows {
    pub rows: Vec<ReportRow>,
    /// Selected keys that no longer match any row. Dropped silently.
    pub stale: usize,
}

/// Resolve the authoritative row set.
///
/// 1. explicit keys: exact lookup, the filter is ignored
/// 2. select-all-matching: every match minus the deselected keys
/// 3. bare filter: every match
pub fn resolve_rows(source: &dyn RowSource, intent: &ExportIntent) -> AppResult<ResolvedRows> {
    match intent {
        ExportIntent::SelectedKeys(keys) => {
            let rows = source.find_by_keys(keys)?;
            let requested: BTreeSet<&RowKey> = keys.iter().collect();
            let found: BTreeSet<RowKey> = rows
                .iter()
                .flat_map(|r| [r.key(), r.fallback_key()])
                .collect();
            let stale = requested.iter().filter(|k| !found.contains(**k)).count();
            Ok(ResolvedRows { rows, stale })
        }
        ExportIntent::SelectAllMatching { deselected, filter } => {
            let mut rows = source.query(filter, false)?.rows;
            rows.retain(|row| !deselected.contains(&row.key()));
            Ok(ResolvedRows { rows, stale: 0 })
        }
        ExportIntent::Filter(filter) => Ok(ResolvedRows {
            rows: source.query(filter, false)?.rows,
            stale: 0,
        }),
    }
}

/// Everything checked and resolved; nothing written yet.
#[derive(Debug)]
pub struct PreparedExport {
    pub report_type: ReportType,
    pub include_passwords: bool,
    pub strategy: &'static str,
    pub template: Template,
    pub branding: Branding,
    pub groups: Vec<ReportGroup>,
    pub stale: usize,
}

/// Totals reported once the document has been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub filename: String,
    pub content_type: &'static str,
    pub rows: usize,
    pub groups: usize,
    pub pages: usize,
    pub bytes: usize,
}

impl PreparedExport {
    pub fn filename(&self) -> String {
        self.report_type.filename()
    }

    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }

    pub fn renderer(&self) -> TemplateRenderer<'_> {
        TemplateRenderer::new(
            &self.template,
            &self.branding,
            self.report_type,
            self.include_passwords,
        )
    }

    /// Lay the document out on any surface. Returns the page count.
    pub fn render_into<S: Surface + ?Sized>(&self, surface: &mut S) -> usize {
        self.renderer().render(surface, &self.groups)
    }

    /// Render the PDF and write it to `out`. Past this point any failure is
    /// a `StreamWrite`: the receiver may already hold part of the document.
    pub fn stream<W: Write>(&self, mut out: W) -> AppResult<ExportSummary> {
        let mut pdf = PdfManager::new(self.template.meta.page_size);
        let mut names: Vec<&String> = self.branding.images.keys().collect();
        names.sort();
        for name in names {
            if let Some(image) = self.branding.image(name) {
                pdf.register_image(name, image);
            }
        }

        let pages = self.render_into(&mut pdf);
        let bytes = pdf.finish(&self.template.meta.title);

        out.write_all(&bytes).map_err(AppError::StreamWrite)?;
        out.flush().map_err(AppError::StreamWrite)?;

        Ok(ExportSummary {
            filename: self.filename(),
            content_type: CONTENT_TYPE,
            rows: self.row_count(),
            groups: self.groups.len(),
            pages,
            bytes: bytes.len(),
        })
    }
}

/// Runs every step that can still reject the request cleanly.
pub struct ExportDispatcher<'a> {
    config: &'a Config,
    source: &'a dyn RowSource,
    templates: &'a TemplateStore,
    assets: &'a dyn AssetResolver,
}

impl<'a> ExportDispatcher<'a> {
    pub fn new(
        config: &'a Config,
        source: &'a dyn RowSource,
        templates: &'a TemplateStore,
        assets: &'a dyn AssetResolver,
    ) -> Self {
        Self {
            config,
            source,
            templates,
            assets,
        }
    }

    /// Capability, validation and template loading happen before any row is
    /// read, so every error here is still a clean rejection.
    pub fn prepare(&self, request: &ExportRequest, caller: &dyn Capability) -> AppResult<PreparedExport> {
        // 1️⃣ capability
        if !caller.can_export() {
            return Err(AppError::Forbidden(caller.label().to_string()));
        }

        // 2️⃣ request
        request.validate()?;
        let report_type = request.report_type();

        // 3️⃣ template (fatal when missing)
        let template_id = request
            .template_id
            .as_deref()
            .unwrap_or_else(|| self.config.template_for(report_type));
        let template = self.templates.load(template_id)?;

        // 4️⃣ rows
        let intent = request.intent();
        let resolved = resolve_rows(self.source, &intent)?;
        let groups = group_rows(resolved.rows, report_type);

        // 5️⃣ branding (degrades, never fails)
        let branding = load_branding(&self.config.organization, self.assets);

        Ok(PreparedExport {
            report_type,
            include_passwords: request.passwords_enabled(),
            strategy: intent.strategy(),
            template,
            branding,
            groups,
            stale: resolved.stale,
        })
    }
}

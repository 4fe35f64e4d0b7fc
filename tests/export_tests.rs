mod common;
use common::seeded_pool;
use coursereport::auth::Role;
use coursereport::config::Config;
use coursereport::db::queries::SqliteRowSource;
use coursereport::errors::AppError;
use coursereport::export::template::TemplateStore;
use coursereport::export::{ExportDispatcher, FsAssetResolver, RecordingSurface};
use coursereport::models::{ExportRequest, ReportFilter, ReportType};
use std::env;
use std::fs;
use std::io::{self, Write};

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn group_request(id: i64, report_type: ReportType) -> ExportRequest {
    ExportRequest {
        filter: Some(ReportFilter {
            id_group: vec![id],
            ..ReportFilter::default()
        }),
        report_type: Some(report_type),
        ..ExportRequest::default()
    }
}

fn write_png(name: &str) -> String {
    let mut path = env::temp_dir();
    path.push(format!("{name}_coursereport.png"));
    let img = image::RgbaImage::from_raw(2, 2, vec![0, 0, 0, 255, 255, 255, 255, 0, 10, 20, 30, 255, 40, 50, 60, 128])
        .expect("raw pixels");
    img.save(&path).expect("write png");
    path.to_string_lossy().to_string()
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn roles_without_capability_are_rejected_before_any_work() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);
    let templates = TemplateStore::builtin_only();
    let config = Config::default();
    let dispatcher = ExportDispatcher::new(&config, &source, &templates, &FsAssetResolver);

    for role in [Role::Student, Role::Teacher] {
        match dispatcher.prepare(&ExportRequest::default(), &role) {
            Err(AppError::Forbidden(label)) => assert!(!label.is_empty()),
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }
    assert!(dispatcher.prepare(&ExportRequest::default(), &Role::Manager).is_ok());
}

#[test]
fn invalid_requests_and_unknown_templates_are_rejected() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);
    let templates = TemplateStore::builtin_only();
    let config = Config::default();
    let dispatcher = ExportDispatcher::new(&config, &source, &templates, &FsAssetResolver);

    let bad_limit = ExportRequest {
        filter: Some(ReportFilter {
            limit: Some(0),
            ..ReportFilter::default()
        }),
        ..ExportRequest::default()
    };
    assert!(matches!(
        dispatcher.prepare(&bad_limit, &Role::Admin),
        Err(AppError::Validation(_))
    ));

    let unknown = ExportRequest {
        template_id: Some("payroll".into()),
        ..ExportRequest::default()
    };
    assert!(matches!(
        dispatcher.prepare(&unknown, &Role::Admin),
        Err(AppError::TemplateNotFound(_))
    ));

    // configured template missing: same fatal error
    let config = Config {
        certification_template: "gone".into(),
        ..Config::default()
    };
    let dispatcher = ExportDispatcher::new(&config, &source, &templates, &FsAssetResolver);
    assert!(matches!(
        dispatcher.prepare(&group_request(1, ReportType::Certification), &Role::Admin),
        Err(AppError::TemplateNotFound(_))
    ));
}

#[test]
fn prepared_export_streams_a_pdf() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);
    let templates = TemplateStore::builtin_only();
    let config = Config::default();
    let dispatcher = ExportDispatcher::new(&config, &source, &templates, &FsAssetResolver);

    let prepared = dispatcher
        .prepare(&group_request(1, ReportType::Certification), &Role::Admin)
        .unwrap();
    assert_eq!(prepared.strategy, "filter");
    assert_eq!(prepared.filename(), "report-certification.pdf");
    assert_eq!(prepared.content_type(), "application/pdf");
    assert_eq!(prepared.row_count(), 3);

    let mut out = Vec::new();
    let summary = prepared.stream(&mut out).unwrap();

    assert!(out.starts_with(b"%PDF-"));
    assert_eq!(summary.bytes, out.len());
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.groups, 1);
    assert!(summary.pages >= 1);
    assert_eq!(summary.filename, "report-certification.pdf");
}

#[test]
fn passwords_flag_is_ignored_for_certificates() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);
    let templates = TemplateStore::builtin_only();
    let config = Config::default();
    let dispatcher = ExportDispatcher::new(&config, &source, &templates, &FsAssetResolver);

    let mut request = group_request(1, ReportType::Certification);
    request.include_passwords = true;
    let prepared = dispatcher.prepare(&request, &Role::Admin).unwrap();
    assert!(!prepared.include_passwords);

    let mut request = group_request(1, ReportType::Dedication);
    request.include_passwords = true;
    let prepared = dispatcher.prepare(&request, &Role::Admin).unwrap();
    assert!(prepared.include_passwords);

    let mut surface = RecordingSurface::new();
    prepared.render_into(&mut surface);
    assert_eq!(surface.positions_of("pw-1").len(), 1);
}

#[test]
fn stale_selected_keys_are_counted_not_fatal() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);
    let templates = TemplateStore::builtin_only();
    let config = Config::default();
    let dispatcher = ExportDispatcher::new(&config, &source, &templates, &FsAssetResolver);

    let request = ExportRequest::from_json(r#"{"selected_keys": ["1-1", "77-7", "88-8"]}"#).unwrap();
    let prepared = dispatcher.prepare(&request, &Role::Admin).unwrap();
    assert_eq!(prepared.strategy, "selected_keys");
    assert_eq!(prepared.row_count(), 1);
    assert_eq!(prepared.stale, 2);
}

#[test]
fn empty_selection_still_yields_a_document() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);
    let templates = TemplateStore::builtin_only();
    let config = Config::default();
    let dispatcher = ExportDispatcher::new(&config, &source, &templates, &FsAssetResolver);

    let request = ExportRequest::from_json(r#"{"filter": {"search": "nadie"}}"#).unwrap();
    let prepared = dispatcher.prepare(&request, &Role::Admin).unwrap();
    assert!(prepared.groups.is_empty());

    let mut out = Vec::new();
    let summary = prepared.stream(&mut out).unwrap();
    assert_eq!(summary.pages, 1);
    assert!(out.starts_with(b"%PDF-"));
}

#[test]
fn missing_logo_degrades_and_present_logo_is_embedded() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);
    let templates = TemplateStore::builtin_only();

    let mut config = Config::default();
    config.organization.logo_path = Some("/nonexistent/coursereport/logo.png".into());
    let dispatcher = ExportDispatcher::new(&config, &source, &templates, &FsAssetResolver);
    let prepared = dispatcher
        .prepare(&group_request(1, ReportType::Dedication), &Role::Admin)
        .unwrap();
    assert_eq!(prepared.branding.degraded.len(), 1);
    assert_eq!(prepared.branding.degraded[0].0, "logo");

    let mut out = Vec::new();
    prepared.stream(&mut out).unwrap();
    assert!(!contains(&out, b"/Im1"));

    config.organization.logo_path = Some(write_png("logo_embed"));
    let dispatcher = ExportDispatcher::new(&config, &source, &templates, &FsAssetResolver);
    let prepared = dispatcher
        .prepare(&group_request(1, ReportType::Dedication), &Role::Admin)
        .unwrap();
    assert!(prepared.branding.degraded.is_empty());
    assert!(prepared.branding.image("logo").is_some());

    let mut out = Vec::new();
    prepared.stream(&mut out).unwrap();
    assert!(contains(&out, b"/Im1"));
    assert!(contains(&out, b"/SMask"));
    fs::remove_file(config.organization.logo_path.unwrap()).ok();
}

#[test]
fn sink_failures_surface_as_stream_errors() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);
    let templates = TemplateStore::builtin_only();
    let config = Config::default();
    let dispatcher = ExportDispatcher::new(&config, &source, &templates, &FsAssetResolver);

    let prepared = dispatcher
        .prepare(&group_request(1, ReportType::Dedication), &Role::Admin)
        .unwrap();
    match prepared.stream(BrokenPipe) {
        Err(AppError::StreamWrite(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected StreamWrite, got {other:?}"),
    }
}

mod common;
use common::{key, seeded_pool};
use coursereport::db::queries::SqliteRowSource;
use coursereport::errors::AppError;
use coursereport::export::{RowSource, resolve_rows};
use coursereport::models::{ExportIntent, ExportRequest, ReportFilter, ReportType, RowKey};
use coursereport::selection::{SelectionAction, SelectionState, encode_intent};
use std::collections::BTreeSet;

fn filter_group(id: i64) -> ReportFilter {
    ReportFilter {
        id_group: vec![id],
        page: Some(1),
        limit: Some(2),
        ..ReportFilter::default()
    }
}

#[test]
fn encoder_produces_the_three_wire_shapes() {
    let filter = filter_group(1);

    let explicit = SelectionState::default().apply(&SelectionAction::Select {
        key: key("1-1"),
        selected: true,
    });
    assert_eq!(
        encode_intent(&explicit, &filter),
        ExportIntent::SelectedKeys(vec![key("1-1")])
    );

    let all = SelectionState::SelectAllMatching([key("2-1")].into_iter().collect());
    match encode_intent(&all, &filter) {
        ExportIntent::SelectAllMatching { deselected, filter } => {
            assert!(deselected.contains(&key("2-1")));
            // pagination never travels with an intent
            assert_eq!(filter.page, None);
            assert_eq!(filter.limit, None);
            assert_eq!(filter.id_group, vec![1]);
        }
        other => panic!("unexpected intent {other:?}"),
    }

    assert!(matches!(
        encode_intent(&SelectionState::default(), &filter),
        ExportIntent::Filter(_)
    ));
}

#[test]
fn request_json_follows_priority_order() {
    let keys_win = ExportRequest::from_json(
        r#"{"selected_keys": ["1-1"], "select_all_matching": true, "deselected_keys": ["2-1"], "filter": {"id_group": [1]}}"#,
    )
    .unwrap();
    assert_eq!(keys_win.intent().strategy(), "selected_keys");

    let empty_keys = ExportRequest::from_json(
        r#"{"selected_keys": [], "select_all_matching": true, "deselected_keys": ["2-1"]}"#,
    )
    .unwrap();
    assert_eq!(empty_keys.intent().strategy(), "select_all_matching");

    let bare = ExportRequest::from_json(r#"{"filter": {"search": "ana"}}"#).unwrap();
    assert_eq!(bare.intent().strategy(), "filter");

    let nothing = ExportRequest::from_json("{}").unwrap();
    assert_eq!(nothing.intent(), ExportIntent::Filter(ReportFilter::default()));
    assert_eq!(nothing.report_type(), ReportType::Dedication);
}

#[test]
fn ids_accept_numbers_and_numeric_strings() {
    let req = ExportRequest::from_json(
        r#"{"filter": {"id_company": ["1", 2], "id_center": "3,4", "id_course": "7", "id_group": 9}}"#,
    )
    .unwrap();
    let filter = req.filter.unwrap();
    assert_eq!(filter.id_company, vec![1, 2]);
    assert_eq!(filter.id_center, vec![3, 4]);
    assert_eq!(filter.id_course, Some(7));
    assert_eq!(filter.id_group, vec![9]);
}

#[test]
fn malformed_requests_are_rejected() {
    let bad = [
        r#"{"filter": {"id_company": ["abc"]}}"#,
        r#"{"filter": {"id_group": [true]}}"#,
        r#"{"filter": {"start_date": "10/01/2025"}}"#,
        r#"{"filter": {"start_date": "2025-05-01", "end_date": "2025-01-01"}}"#,
        r#"{"filter": {"sort_field": "password"}}"#,
        r#"{"filter": {"sort_order": "sideways"}}"#,
        r#"{"filter": {"limit": 0}}"#,
        r#"{"filter": {"id_center": [-3]}}"#,
        r#"{"report_type": "invoice"}"#,
        r#"{"template_id": "../etc/passwd"}"#,
        r#"not json"#,
    ];
    for body in bad {
        match ExportRequest::from_json(body) {
            Err(AppError::Validation(_)) => {}
            other => panic!("{body} should be rejected, got {other:?}"),
        }
    }
}

#[test]
fn passwords_only_apply_to_dedication() {
    let ded = ExportRequest::from_json(r#"{"include_passwords": true}"#).unwrap();
    assert!(ded.passwords_enabled());

    let cert =
        ExportRequest::from_json(r#"{"include_passwords": true, "report_type": "certification"}"#)
            .unwrap();
    assert!(!cert.passwords_enabled());
}

#[test]
fn encoded_selection_resolves_to_the_rows_the_operator_saw() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);

    // the grid shows group 1 two rows at a time: 3 matches, 2 pages
    let filter = filter_group(1);
    let page1 = source.query(&filter, true).unwrap();
    assert_eq!(page1.total, 3);
    assert_eq!(page1.rows.len(), 2);
    let visible: Vec<RowKey> = page1.rows.iter().map(|r| r.key()).collect();

    // header select-all, then uncheck the first visible row
    let state = SelectionState::default()
        .apply(&SelectionAction::SelectAllVisible {
            selected: true,
            visible_keys: visible.clone(),
            total: page1.total,
            loaded: page1.rows.len() as u64,
        })
        .apply(&SelectionAction::Select {
            key: visible[0].clone(),
            selected: false,
        });
    assert_eq!(state.count(page1.total), 2);

    let request = ExportRequest::from_intent(encode_intent(&state, &filter), ReportType::Dedication, false);
    let json = serde_json::to_string(&request).unwrap();
    let request = ExportRequest::from_json(&json).unwrap();

    let resolved = resolve_rows(&source, &request.intent()).unwrap();
    let got: BTreeSet<RowKey> = resolved.rows.iter().map(|r| r.key()).collect();

    let all: BTreeSet<RowKey> = source
        .query(&filter, false)
        .unwrap()
        .rows
        .iter()
        .map(|r| r.key())
        .collect();
    let expected: BTreeSet<RowKey> = all.into_iter().filter(|k| *k != visible[0]).collect();

    assert_eq!(got, expected);
    assert_eq!(resolved.rows.len() as u64, state.count(page1.total));
}

#[test]
fn explicit_keys_ignore_the_filter_and_drop_stale_keys() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);

    let request = ExportRequest::from_json(
        r#"{"selected_keys": ["4-2", "6-3", "4-2", "99-1"], "filter": {"id_group": [1]}}"#,
    )
    .unwrap();

    let resolved = resolve_rows(&source, &request.intent()).unwrap();
    let keys: Vec<String> = resolved.rows.iter().map(|r| r.key().to_string()).collect();

    assert_eq!(keys, vec!["4-2", "6-3"]);
    assert_eq!(resolved.stale, 1);
}

#[test]
fn fallback_keys_resolve_by_dni_and_moodle_id() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);

    // user 6 has a single enrollment
    let resolved = resolve_rows(
        &source,
        &ExportIntent::SelectedKeys(vec![key("66666666F-506")]),
    )
    .unwrap();
    assert_eq!(resolved.rows.len(), 1);
    assert_eq!(resolved.rows[0].key(), RowKey::from_ids(6, 3));
    assert_eq!(resolved.stale, 0);
}

mod common;
use chrono::NaiveDate;
use common::{key, seed_many, seeded_pool};
use coursereport::db::queries::SqliteRowSource;
use coursereport::export::RowSource;
use coursereport::models::{ReportFilter, ReportRow, SortField, SortOrder};

fn keys(rows: &[ReportRow]) -> Vec<String> {
    rows.iter().map(|r| r.key().to_string()).collect()
}

fn all(source: &SqliteRowSource, filter: ReportFilter) -> Vec<String> {
    keys(&source.query(&filter, false).unwrap().rows)
}

#[test]
fn default_order_is_surname_then_ids() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);

    assert_eq!(
        all(&source, ReportFilter::default()),
        vec!["3-1", "1-1", "1-3", "5-2", "2-1", "4-2", "6-3"]
    );
}

#[test]
fn pagination_windows_rows_but_not_the_total() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);

    let filter = ReportFilter {
        page: Some(3),
        limit: Some(3),
        ..ReportFilter::default()
    };
    let page = source.query(&filter, true).unwrap();
    assert_eq!(page.total, 7);
    assert_eq!(keys(&page.rows), vec!["6-3"]);
    assert_eq!(page.page_count(), 3);

    // unpaginated: window ignored
    let everything = source.query(&filter, false).unwrap();
    assert_eq!(everything.rows.len(), 7);
    assert_eq!(everything.limit, None);
    assert_eq!(everything.page_count(), 1);
}

#[test]
fn large_groups_page_at_the_default_size() {
    let pool = seeded_pool();
    seed_many(&pool.conn, 250);
    let source = SqliteRowSource::new(&pool.conn);

    let filter = ReportFilter {
        id_group: vec![1],
        page: Some(3),
        ..ReportFilter::default()
    };
    let page = source.query(&filter, true).unwrap();
    assert_eq!(page.total, 253);
    assert_eq!(page.rows.len(), 53);
    assert_eq!(page.limit, Some(100));
    assert_eq!(page.page_count(), 3);
}

#[test]
fn id_filters_narrow_the_hierarchy() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);

    let by_company = ReportFilter {
        id_company: vec![2],
        ..ReportFilter::default()
    };
    assert_eq!(all(&source, by_company), vec!["5-2", "4-2"]);

    let by_center = ReportFilter {
        id_center: vec![1],
        ..ReportFilter::default()
    };
    assert_eq!(source.count(&by_center).unwrap(), 5);

    let by_course = ReportFilter {
        id_course: Some(2),
        ..ReportFilter::default()
    };
    assert_eq!(all(&source, by_course), vec!["1-3", "6-3"]);

    let combined = ReportFilter {
        id_center: vec![1],
        id_group: vec![1, 2],
        ..ReportFilter::default()
    };
    assert_eq!(source.count(&combined).unwrap(), 3);
}

#[test]
fn dates_bound_the_group_period() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);

    let from_march = ReportFilter {
        start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
        ..ReportFilter::default()
    };
    assert_eq!(source.count(&from_march).unwrap(), 4);

    let until_february = ReportFilter {
        end_date: NaiveDate::from_ymd_opt(2025, 2, 28),
        ..ReportFilter::default()
    };
    assert_eq!(all(&source, until_february), vec!["3-1", "1-1", "2-1"]);
}

#[test]
fn search_matches_names_documents_and_usernames() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);

    let search = |text: &str| {
        all(
            &source,
            ReportFilter {
                search: Some(text.to_string()),
                ..ReportFilter::default()
            },
        )
    };

    assert_eq!(search("ortega"), vec!["4-2"]);
    assert_eq!(search("55555"), vec!["5-2"]);
    assert_eq!(search("jvid"), vec!["6-3"]);
    assert_eq!(search("lucia@"), vec!["1-1", "1-3"]);
    assert_eq!(search("   ").len(), 7);
    assert!(search("nadie").is_empty());
}

#[test]
fn sort_field_and_order_apply_with_nulls_last_descending() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);

    let filter = ReportFilter {
        sort_field: Some(SortField::CompletionPercentage),
        sort_order: Some(SortOrder::Desc),
        ..ReportFilter::default()
    };
    assert_eq!(
        all(&source, filter),
        vec!["1-1", "4-2", "2-1", "6-3", "1-3", "3-1", "5-2"]
    );

    let by_center = ReportFilter {
        sort_field: Some(SortField::CenterName),
        ..ReportFilter::default()
    };
    let rows = source.query(&by_center, false).unwrap().rows;
    assert_eq!(rows.first().unwrap().center_name.as_deref(), Some("Centro Norte"));
    assert_eq!(rows.last().unwrap().center_name.as_deref(), Some("Centro Sur"));
}

#[test]
fn find_by_keys_skips_missing_and_collapses_duplicates() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);

    let rows = source
        .find_by_keys(&[key("2-1"), key("2-1"), key("99-9"), key("1-3")])
        .unwrap();
    assert_eq!(keys(&rows), vec!["2-1", "1-3"]);

    // the fallback form covers every enrollment of the user
    let rows = source
        .find_by_keys(&[key("11111111A-501"), key("1-1")])
        .unwrap();
    assert_eq!(keys(&rows), vec!["1-1", "1-3"]);

    assert!(source.find_by_keys(&[]).unwrap().is_empty());
}

#[test]
fn rows_carry_the_joined_hierarchy() {
    let pool = seeded_pool();
    let source = SqliteRowSource::new(&pool.conn);

    let row = source.find_by_keys(&[key("4-2")]).unwrap().remove(0);
    assert_eq!(row.company_name.as_deref(), Some("Beta Servicios"));
    assert_eq!(row.center_name.as_deref(), Some("Centro Sur"));
    assert_eq!(row.course_name.as_deref(), Some("Prevención de riesgos"));
    assert_eq!(row.group_name.as_deref(), Some("PRL-02"));
    assert_eq!(row.group_start_date.as_deref(), Some("2025-03-01"));
    assert_eq!(row.moodle_password.as_deref(), Some("pw-4"));
    assert_eq!(row.full_name(), "Ortega Sanz, Pedro");
}

#[test]
fn all_digit_dni_keys_fall_back_to_dni_lookup() {
    let pool = seeded_pool();
    pool.conn
        .execute("UPDATE users SET dni = '66666666' WHERE id = 6", [])
        .unwrap();
    let source = SqliteRowSource::new(&pool.conn);

    // a row the client saw without ids keys itself by dni and moodle_id
    let seen = ReportRow {
        dni: Some("66666666".into()),
        moodle_id: Some(506),
        ..ReportRow::default()
    };
    assert_eq!(seen.key().as_str(), "66666666-506");

    let rows = source.find_by_keys(&[seen.key()]).unwrap();
    assert_eq!(keys(&rows), vec!["6-3"]);

    // genuine id keys still win
    let rows = source.find_by_keys(&[key("6-3")]).unwrap();
    assert_eq!(keys(&rows), vec!["6-3"]);
}

#[test]
fn search_wildcards_match_literally() {
    let pool = seeded_pool();
    pool.conn
        .execute("UPDATE users SET moodle_username = 'ana_abad' WHERE id = 3", [])
        .unwrap();
    let source = SqliteRowSource::new(&pool.conn);

    let search = |text: &str| ReportFilter {
        search: Some(text.into()),
        ..ReportFilter::default()
    };

    assert_eq!(all(&source, search("_")), vec!["3-1"]);
    assert!(all(&source, search("%")).is_empty());
    assert!(all(&source, search("lgarci_")).is_empty());
    assert_eq!(source.count(&search("_")).unwrap(), 1);
}

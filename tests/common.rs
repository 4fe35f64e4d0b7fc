#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use coursereport::db::initialize::init_db;
use coursereport::db::pool::DbPool;
use coursereport::models::{ReportRow, RowKey};
use rusqlite::{Connection, params};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn crp() -> Command {
    cargo_bin_cmd!("coursereport")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_coursereport.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Small organisation tree:
///
/// - group 1 "PRL-01": Centro Norte / Prevención de riesgos, users 1,2,3
/// - group 2 "PRL-02": Centro Sur / Prevención de riesgos, users 4,5
/// - group 3 "OFI-01": Centro Norte / Ofimática, users 6,1
///
/// Seven enrollments in total.
pub fn seed(conn: &Connection) {
    init_db(conn).expect("init db");

    conn.execute_batch(
        r#"
        INSERT INTO companies (id, name) VALUES (1, 'Acme Formación'), (2, 'Beta Servicios');
        INSERT INTO centers (id, id_company, name) VALUES (1, 1, 'Centro Norte'), (2, 2, 'Centro Sur');
        INSERT INTO courses (id, name) VALUES (1, 'Prevención de riesgos'), (2, 'Ofimática');
        INSERT INTO course_groups (id, id_course, id_center, name, start_date, end_date)
        VALUES (1, 1, 1, 'PRL-01', '2025-01-10', '2025-02-10'),
               (2, 1, 2, 'PRL-02', '2025-03-01', '2025-03-31'),
               (3, 2, 1, 'OFI-01', '2025-04-01', '2025-05-15');
        INSERT INTO users (id, name, first_surname, second_surname, dni, email, moodle_id, moodle_username, moodle_password)
        VALUES (1, 'Lucía', 'García', 'López', '11111111A', 'lucia@example.com', 501, 'lgarcia', 'pw-1'),
               (2, 'Mario', 'Núñez', 'Ruiz', '22222222B', 'mario@example.com', 502, 'mnunez', 'pw-2'),
               (3, 'Ana', 'Abad', NULL, '33333333C', 'ana@example.com', 503, 'aabad', 'pw-3'),
               (4, 'Pedro', 'Ortega', 'Sanz', '44444444D', 'pedro@example.com', 504, 'portega', 'pw-4'),
               (5, 'Sara', 'Molina', NULL, '55555555E', 'sara@example.com', 505, 'smolina', 'pw-5'),
               (6, 'Jorge', 'Vidal', 'Cano', '66666666F', 'jorge@example.com', 506, 'jvidal', 'pw-6');
        INSERT INTO user_groups (id_user, id_group, completion_percentage, time_spent)
        VALUES (1, 1, 100.0, 36000),
               (2, 1, 80.0, 18000),
               (3, 1, 40.0, 3600),
               (4, 2, 90.0, 20000),
               (5, 2, NULL, NULL),
               (6, 3, 75.0, 12000),
               (1, 3, 60.0, 9000);
        "#,
    )
    .expect("seed data");
}

/// `n` extra users enrolled in group 1, numbered from id 100.
pub fn seed_many(conn: &Connection, n: usize) {
    for i in 0..n {
        let id = 100 + i as i64;
        conn.execute(
            "INSERT INTO users (id, name, first_surname, dni, moodle_username)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                format!("Alumno{i:03}"),
                format!("Apellido{i:03}"),
                format!("{:08}X", id),
                format!("user{i:03}")
            ],
        )
        .expect("insert user");
        conn.execute(
            "INSERT INTO user_groups (id_user, id_group, completion_percentage, time_spent)
             VALUES (?1, 1, ?2, ?3)",
            params![id, (i % 101) as f64, (i as i64) * 60],
        )
        .expect("insert enrollment");
    }
}

pub fn seeded_pool() -> DbPool {
    let pool = DbPool::in_memory().expect("in-memory db");
    seed(&pool.conn);
    pool
}

/// File database seeded through the library, for CLI tests.
pub fn seeded_db_file(name: &str) -> String {
    let db_path = setup_test_db(name);
    let conn = Connection::open(&db_path).expect("open db");
    seed(&conn);
    db_path
}

pub fn key(raw: &str) -> RowKey {
    RowKey::from(raw)
}

/// Plain row for grouping and layout tests.
pub fn row(id_user: i64, id_group: i64, center: &str, course: &str, pct: Option<f64>) -> ReportRow {
    ReportRow {
        id_user: Some(id_user),
        id_group: Some(id_group),
        name: format!("Nombre{id_user}"),
        first_surname: Some(format!("Apellido{id_user:03}")),
        center_name: Some(center.to_string()),
        course_name: Some(course.to_string()),
        group_name: Some(format!("G{id_group}")),
        completion_percentage: pct,
        moodle_username: Some(format!("user{id_user}")),
        moodle_password: Some(format!("pw{id_user}")),
        ..ReportRow::default()
    }
}

use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists. It also records applied migrations.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Check if `table` has a column named `column`.
fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Organisation tree plus users and enrollments.
fn create_core_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            id    INTEGER PRIMARY KEY AUTOINCREMENT,
            name  TEXT NOT NULL,
            cif   TEXT
        );

        CREATE TABLE IF NOT EXISTS centers (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            id_company  INTEGER REFERENCES companies(id) ON DELETE SET NULL,
            name        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS courses (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            short_name  TEXT,
            moodle_id   INTEGER
        );

        CREATE TABLE IF NOT EXISTS course_groups (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            id_course   INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
            id_center   INTEGER REFERENCES centers(id) ON DELETE SET NULL,
            name        TEXT NOT NULL,
            start_date  TEXT,
            end_date    TEXT,
            moodle_id   INTEGER
        );

        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            first_surname   TEXT,
            second_surname  TEXT,
            dni             TEXT,
            email           TEXT,
            phone           TEXT,
            moodle_id       INTEGER
        );

        CREATE TABLE IF NOT EXISTS user_groups (
            id_user                INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            id_group               INTEGER NOT NULL REFERENCES course_groups(id) ON DELETE CASCADE,
            completion_percentage  REAL,
            time_spent             INTEGER,
            PRIMARY KEY (id_user, id_group)
        );

        CREATE INDEX IF NOT EXISTS idx_groups_course ON course_groups(id_course);
        CREATE INDEX IF NOT EXISTS idx_groups_center ON course_groups(id_center);
        CREATE INDEX IF NOT EXISTS idx_user_groups_group ON user_groups(id_group);
        CREATE INDEX IF NOT EXISTS idx_users_dni ON users(dni);
        "#,
    )
}

/// Platform credentials shown by the dedication report.
fn add_moodle_credentials(conn: &Connection) -> Result<()> {
    if !has_column(conn, "users", "moodle_username")? {
        conn.execute("ALTER TABLE users ADD COLUMN moodle_username TEXT;", [])?;
    }
    if !has_column(conn, "users", "moodle_password")? {
        conn.execute("ALTER TABLE users ADD COLUMN moodle_password TEXT;", [])?;
    }
    Ok(())
}

type Migration = (&'static str, &'static str, fn(&Connection) -> Result<()>);

const MIGRATIONS: &[Migration] = &[
    (
        "20250301_0001_core_schema",
        "Created companies, centers, courses, groups, users, enrollments",
        create_core_schema,
    ),
    (
        "20250312_0002_moodle_credentials",
        "Added moodle_username / moodle_password to users",
        add_moodle_credentials,
    ),
];

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db(). Each migration is applied at most once and
/// recorded in the `log` table.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    for (version, message, apply) in MIGRATIONS {
        if migration_applied(conn, version)? {
            continue;
        }

        apply(conn)?;
        mark_applied(conn, version, message)?;

        success(format!("Migration applied: {} → {}", version, message));
    }

    Ok(())
}

/// Versions already recorded, oldest first.
pub fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    ensure_log_table(conn)?;
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

//! Row source backed by SQLite: one join over enrollments with the filter
//! translated into a WHERE clause.

use crate::errors::AppResult;
use crate::export::source::{RowPage, RowSource};
use crate::models::report_row::KeyParts;
use crate::models::{ReportFilter, ReportRow, RowKey, SortOrder};
use rusqlite::types::Value;
use rusqlite::{Connection, Result, Row, params, params_from_iter};
use std::collections::HashSet;

/// Page size applied when a paginated query does not name one.
pub const DEFAULT_LIMIT: u32 = 100;

const ROW_SELECT: &str = r#"
    SELECT u.id                     AS id_user,
           g.id                     AS id_group,
           c.id                     AS id_course,
           ce.id                    AS id_center,
           co.id                    AS id_company,
           u.moodle_id              AS moodle_id,
           u.name                   AS name,
           u.first_surname          AS first_surname,
           u.second_surname         AS second_surname,
           u.dni                    AS dni,
           u.email                  AS email,
           u.phone                  AS phone,
           ug.completion_percentage AS completion_percentage,
           ug.time_spent            AS time_spent,
           co.name                  AS company_name,
           ce.name                  AS center_name,
           c.name                   AS course_name,
           g.name                   AS group_name,
           g.start_date             AS group_start_date,
           g.end_date               AS group_end_date,
           u.moodle_username        AS moodle_username,
           u.moodle_password        AS moodle_password
    FROM user_groups ug
    JOIN users u          ON u.id = ug.id_user
    JOIN course_groups g  ON g.id = ug.id_group
    JOIN courses c        ON c.id = g.id_course
    LEFT JOIN centers ce  ON ce.id = g.id_center
    LEFT JOIN companies co ON co.id = ce.id_company
"#;

const ROW_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM user_groups ug
    JOIN users u          ON u.id = ug.id_user
    JOIN course_groups g  ON g.id = ug.id_group
    JOIN courses c        ON c.id = g.id_course
    LEFT JOIN centers ce  ON ce.id = g.id_center
    LEFT JOIN companies co ON co.id = ce.id_company
"#;

/// Mapping DB → ReportRow (reused by every query).
pub fn map_report_row(row: &Row<'_>) -> Result<ReportRow> {
    Ok(ReportRow {
        id_user: row.get("id_user")?,
        id_group: row.get("id_group")?,
        id_course: row.get("id_course")?,
        id_center: row.get("id_center")?,
        id_company: row.get("id_company")?,
        moodle_id: row.get("moodle_id")?,
        name: row.get("name")?,
        first_surname: row.get("first_surname")?,
        second_surname: row.get("second_surname")?,
        dni: row.get("dni")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        completion_percentage: row.get("completion_percentage")?,
        time_spent: row.get("time_spent")?,
        company_name: row.get("company_name")?,
        center_name: row.get("center_name")?,
        course_name: row.get("course_name")?,
        group_name: row.get("group_name")?,
        group_start_date: row.get("group_start_date")?,
        group_end_date: row.get("group_end_date")?,
        moodle_username: row.get("moodle_username")?,
        moodle_password: row.get("moodle_password")?,
    })
}

fn push_in_clause(clauses: &mut Vec<String>, args: &mut Vec<Value>, column: &str, ids: &[i64]) {
    if ids.is_empty() {
        return;
    }
    let marks = vec!["?"; ids.len()].join(", ");
    clauses.push(format!("{column} IN ({marks})"));
    args.extend(ids.iter().map(|id| Value::Integer(*id)));
}

/// WHERE clause (possibly empty) and its positional arguments.
fn build_where(filter: &ReportFilter) -> (String, Vec<Value>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<Value> = Vec::new();

    push_in_clause(&mut clauses, &mut args, "co.id", &filter.id_company);
    push_in_clause(&mut clauses, &mut args, "ce.id", &filter.id_center);
    push_in_clause(&mut clauses, &mut args, "g.id", &filter.id_group);

    if let Some(course) = filter.id_course {
        clauses.push("c.id = ?".into());
        args.push(Value::Integer(course));
    }

    if let Some(start) = filter.start_date {
        clauses.push("g.start_date >= ?".into());
        args.push(Value::Text(start.format("%Y-%m-%d").to_string()));
    }

    if let Some(end) = filter.end_date {
        clauses.push("g.end_date <= ?".into());
        args.push(Value::Text(end.format("%Y-%m-%d").to_string()));
    }

    if let Some(text) = filter.search_text() {
        let pattern = format!("%{}%", escape_like(text));
        let searchable = [
            "u.name",
            "u.first_surname",
            "u.second_surname",
            "u.dni",
            "u.email",
            "u.moodle_username",
        ];
        let ors: Vec<String> = searchable
            .iter()
            .map(|col| format!("{col} LIKE ? ESCAPE '\\'"))
            .collect();
        clauses.push(format!("({})", ors.join(" OR ")));
        args.extend(searchable.iter().map(|_| Value::Text(pattern.clone())));
    }

    if clauses.is_empty() {
        (String::new(), args)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), args)
    }
}

/// Operator text matches literally: `%` and `_` are not wildcards.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn order_by(filter: &ReportFilter) -> String {
    // id pair last: stable order across re-fetches
    match filter.sort_field {
        Some(field) => format!(
            " ORDER BY {} {}, ug.id_user ASC, ug.id_group ASC",
            field.column(),
            filter.sort_order.unwrap_or(SortOrder::Asc).as_sql()
        ),
        None => " ORDER BY u.first_surname ASC, u.name ASC, ug.id_user ASC, ug.id_group ASC".into(),
    }
}

/// Row source over an open connection.
pub struct SqliteRowSource<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteRowSource<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn count(&self, filter: &ReportFilter) -> AppResult<u64> {
        let (where_sql, args) = build_where(filter);
        let total: i64 = self.conn.query_row(
            &format!("{ROW_COUNT}{where_sql}"),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;
        Ok(total.max(0) as u64)
    }

    fn lookup_key(&self, key: &RowKey) -> AppResult<Vec<ReportRow>> {
        match key.parts() {
            KeyParts::Ids { id_user, id_group } => {
                let mut stmt = self.conn.prepare_cached(&format!(
                    "{ROW_SELECT} WHERE ug.id_user = ?1 AND ug.id_group = ?2"
                ))?;
                let rows = stmt
                    .query_map(params![id_user, id_group], map_report_row)?
                    .collect::<Result<Vec<_>>>()?;
                if !rows.is_empty() {
                    return Ok(rows);
                }
                // "12345678-506" may also be an all-digit dni plus moodle_id
                self.lookup_fallback(key.fallback_parts())
            }
            parts => self.lookup_fallback(parts),
        }
    }

    fn lookup_fallback(&self, parts: KeyParts<'_>) -> AppResult<Vec<ReportRow>> {
        let KeyParts::Fallback { dni, moodle_id } = parts else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn.prepare_cached(&format!(
            "{ROW_SELECT} WHERE IFNULL(u.dni, '') = ?1
               AND IFNULL(CAST(u.moodle_id AS TEXT), '') = ?2
             ORDER BY ug.id_user, ug.id_group"
        ))?;
        let rows = stmt
            .query_map(params![dni, moodle_id], map_report_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }
}

impl RowSource for SqliteRowSource<'_> {
    fn query(&self, filter: &ReportFilter, paginate: bool) -> AppResult<RowPage> {
        let total = self.count(filter)?;
        let (where_sql, mut args) = build_where(filter);

        let mut sql = format!("{ROW_SELECT}{where_sql}{}", order_by(filter));

        let (page, limit) = if paginate {
            let limit = filter.limit.unwrap_or(DEFAULT_LIMIT).max(1);
            let page = filter.page.unwrap_or(1).max(1);
            sql.push_str(" LIMIT ? OFFSET ?");
            args.push(Value::Integer(i64::from(limit)));
            args.push(Value::Integer(i64::from(page - 1) * i64::from(limit)));
            (page, Some(limit))
        } else {
            (1, None)
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), map_report_row)?
            .collect::<Result<Vec<_>>>()?;

        Ok(RowPage {
            rows,
            total,
            page,
            limit,
        })
    }

    fn find_by_keys(&self, keys: &[RowKey]) -> AppResult<Vec<ReportRow>> {
        let mut seen_keys: HashSet<&RowKey> = HashSet::new();
        let mut seen_rows: HashSet<RowKey> = HashSet::new();
        let mut out = Vec::with_capacity(keys.len());

        for key in keys {
            if !seen_keys.insert(key) {
                continue;
            }
            for row in self.lookup_key(key)? {
                if seen_rows.insert(row.key()) {
                    out.push(row);
                }
            }
        }

        Ok(out)
    }
}

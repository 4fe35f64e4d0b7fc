//! Sorting and partitioning of report rows into center → course → group
//! sections.

use crate::models::{ReportRow, ReportType};
use std::cmp::Ordering;

pub const NO_CENTER: &str = "Sin centro";
pub const NO_COURSE: &str = "Sin curso";

/// The rendering unit: one certificate page or one dedication section.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportGroup {
    pub center_name: String,
    pub course_name: String,
    /// Only set for certification reports.
    pub group_id: Option<i64>,
    pub rows: Vec<ReportRow>,
}

impl ReportGroup {
    pub fn group_name(&self) -> &str {
        self.rows
            .iter()
            .find_map(|r| r.group_name.as_deref())
            .unwrap_or("")
    }

    /// Earliest group start date among the rows.
    pub fn start_date(&self) -> Option<&str> {
        self.rows
            .iter()
            .filter_map(|r| r.group_start_date.as_deref())
            .min()
    }

    /// Latest group end date among the rows.
    pub fn end_date(&self) -> Option<&str> {
        self.rows
            .iter()
            .filter_map(|r| r.group_end_date.as_deref())
            .max()
    }

    /// Distinct company names, in first-seen order.
    pub fn company_names(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for name in self.rows.iter().filter_map(|r| r.company_name.as_deref()) {
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }
}

pub fn center_of(row: &ReportRow) -> &str {
    row.center_name
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(NO_CENTER)
}

pub fn course_of(row: &ReportRow) -> &str {
    row.course_name
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(NO_COURSE)
}

/// Case and accent insensitive sort key; `ñ` sorts after `n`.
pub fn collate_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.trim().chars().flat_map(char::to_lowercase) {
        match ch {
            'á' | 'à' | 'ä' | 'â' => out.push('a'),
            'é' | 'è' | 'ë' | 'ê' => out.push('e'),
            'í' | 'ì' | 'ï' | 'î' => out.push('i'),
            'ó' | 'ò' | 'ö' | 'ô' => out.push('o'),
            'ú' | 'ù' | 'ü' | 'û' => out.push('u'),
            'ç' => out.push('c'),
            'ñ' => out.push_str("n~"),
            other => out.push(other),
        }
    }
    out
}

fn locale_cmp(a: &str, b: &str) -> Ordering {
    collate_key(a).cmp(&collate_key(b)).then_with(|| a.cmp(b))
}

fn surname_cmp(a: &ReportRow, b: &ReportRow) -> Ordering {
    locale_cmp(&a.surnames(), &b.surnames()).then_with(|| locale_cmp(&a.name, &b.name))
}

/// Deterministic total order used before grouping.
///
/// center, course, then:
/// - dedication: completion descending, surname
/// - certification: numeric group id ascending, surname
///
/// The row key breaks any remaining tie.
pub fn compare_rows(a: &ReportRow, b: &ReportRow, report_type: ReportType) -> Ordering {
    let primary = locale_cmp(center_of(a), center_of(b))
        .then_with(|| locale_cmp(course_of(a), course_of(b)));

    let secondary = match report_type {
        ReportType::Dedication => {
            let pa = a.completion_percentage.unwrap_or(f64::NEG_INFINITY);
            let pb = b.completion_percentage.unwrap_or(f64::NEG_INFINITY);
            pb.total_cmp(&pa).then_with(|| surname_cmp(a, b))
        }
        ReportType::Certification => {
            let ga = a.id_group.unwrap_or(i64::MAX);
            let gb = b.id_group.unwrap_or(i64::MAX);
            ga.cmp(&gb).then_with(|| surname_cmp(a, b))
        }
    };

    primary
        .then(secondary)
        .then_with(|| a.key().cmp(&b.key()))
}

pub fn sort_rows(rows: &mut [ReportRow], report_type: ReportType) {
    rows.sort_by(|a, b| compare_rows(a, b, report_type));
}

/// Sort, then split with a single forward scan: a new group starts whenever
/// the (center, course, group id) triple changes.
pub fn group_rows(mut rows: Vec<ReportRow>, report_type: ReportType) -> Vec<ReportGroup> {
    sort_rows(&mut rows, report_type);

    let mut groups: Vec<ReportGroup> = Vec::new();

    for row in rows {
        let center = center_of(&row).to_string();
        let course = course_of(&row).to_string();
        let group_id = if report_type.groups_by_group_id() {
            row.id_group
        } else {
            None
        };

        match groups.last_mut() {
            Some(last)
                if last.center_name == center
                    && last.course_name == course
                    && last.group_id == group_id =>
            {
                last.rows.push(row);
            }
            _ => groups.push(ReportGroup {
                center_name: center,
                course_name: course,
                group_id,
                rows: vec![row],
            }),
        }
    }

    groups
}

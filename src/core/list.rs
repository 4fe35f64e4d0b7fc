use crate::db::pool::DbPool;
use crate::db::queries::SqliteRowSource;
use crate::errors::AppResult;
use crate::export::grouping::{center_of, course_of};
use crate::export::source::{RowPage, RowSource};
use crate::models::{ReportFilter, ReportRow};
use crate::utils::colors::{CYAN, GREY, RESET, color_for_completion};
use crate::utils::formatting::truncate_chars;
use crate::utils::table::Table;
use crate::utils::{format_percentage, format_time_spent};

pub struct ListLogic;

impl ListLogic {
    /// One page of the enrollment list.
    pub fn page(pool: &DbPool, filter: &ReportFilter) -> AppResult<RowPage> {
        filter.validate()?;
        SqliteRowSource::new(&pool.conn).query(filter, true)
    }

    fn cells(row: &ReportRow) -> Vec<String> {
        vec![
            row.key().to_string(),
            truncate_chars(&row.full_name(), 32),
            row.dni.clone().unwrap_or_else(|| "--".into()),
            truncate_chars(center_of(row), 24),
            truncate_chars(course_of(row), 28),
            row.group_name.clone().unwrap_or_else(|| "--".into()),
            format_percentage(row.completion_percentage),
            format_time_spent(row.time_spent),
        ]
    }

    pub fn render(page: &RowPage) -> String {
        let mut table = Table::with_headers(&[
            "Key", "Alumno", "DNI", "Centro", "Curso", "Grupo", "%", "Tiempo",
        ]);
        for row in &page.rows {
            table.add_row(Self::cells(row));
        }
        table.render()
    }

    pub fn print(page: &RowPage) {
        if page.rows.is_empty() {
            println!("{GREY}No enrollments match the filter.{RESET}");
        } else {
            print!("{}", Self::render(page));
        }

        let avg = if page.rows.is_empty() {
            None
        } else {
            let known: Vec<f64> = page
                .rows
                .iter()
                .filter_map(|r| r.completion_percentage)
                .collect();
            (!known.is_empty()).then(|| known.iter().sum::<f64>() / known.len() as f64)
        };

        println!(
            "\n{CYAN}Page {}/{}{RESET} · {} matching rows · average completion {}{}{RESET}",
            page.page,
            page.page_count(),
            page.total,
            color_for_completion(avg),
            format_percentage(avg),
        );
    }
}

use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::list::ListLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::{ReportFilter, SortField, SortOrder};
use crate::utils::date::parse_date;
use chrono::NaiveDate;

fn date_arg(raw: &Option<String>, flag: &str) -> AppResult<Option<NaiveDate>> {
    match raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .ok_or_else(|| AppError::validation(format!("--{flag}: invalid date '{s}' (expected YYYY-MM-DD)"))),
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List {
        company,
        center,
        course,
        group,
        search,
        from,
        to,
        sort,
        desc,
        page,
        limit,
    } = cmd
    {
        let sort_field = match sort.as_deref() {
            None => None,
            Some(s) => Some(
                SortField::from_str_opt(s)
                    .ok_or_else(|| AppError::validation(format!("unknown sort field '{s}'")))?,
            ),
        };

        let filter = ReportFilter {
            page: Some(*page),
            limit: Some(limit.unwrap_or(cfg.default_page_size)),
            id_company: company.clone(),
            id_center: center.clone(),
            id_course: *course,
            id_group: group.clone(),
            search: search.clone(),
            start_date: date_arg(from, "from")?,
            end_date: date_arg(to, "to")?,
            sort_field,
            sort_order: sort_field.map(|_| if *desc { SortOrder::Desc } else { SortOrder::Asc }),
        };

        let pool = DbPool::new(&cfg.database)?;
        let rows = ListLogic::page(&pool, &filter)?;
        ListLogic::print(&rows);
    }
    Ok(())
}

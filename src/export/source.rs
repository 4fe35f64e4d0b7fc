use crate::errors::AppResult;
use crate::models::{ReportFilter, ReportRow, RowKey};

/// One page of rows plus the filter's total match count.
#[derive(Debug, Clone, Default)]
pub struct RowPage {
    pub rows: Vec<ReportRow>,
    pub total: u64,
    pub page: u32,
    /// `None` when pagination was disabled.
    pub limit: Option<u32>,
}

impl RowPage {
    pub fn page_count(&self) -> u64 {
        match self.limit {
            Some(limit) if limit > 0 => self.total.div_ceil(u64::from(limit)).max(1),
            _ => 1,
        }
    }
}

/// Paged query capability over enrollment rows.
pub trait RowSource {
    /// Rows matching `filter`. With `paginate == false` the page window is
    /// ignored and every match is returned.
    fn query(&self, filter: &ReportFilter, paginate: bool) -> AppResult<RowPage>;

    /// Exact lookup. Keys that match nothing are skipped; duplicates collapse.
    fn find_by_keys(&self, keys: &[RowKey]) -> AppResult<Vec<ReportRow>>;
}

pub mod filter;
pub mod report_row;
pub mod report_type;
pub mod request;

pub use filter::{ReportFilter, SortField, SortOrder};
pub use report_row::{ReportRow, RowKey};
pub use report_type::ReportType;
pub use request::{ExportIntent, ExportRequest};

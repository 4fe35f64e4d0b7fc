// src/export/mod.rs

pub mod assets;
pub mod dispatcher;
mod fs_utils;
pub mod grouping;
pub mod pdf;
pub mod render;
pub mod source;
pub mod surface;
pub mod template;
pub mod writer;

pub use assets::{AssetResolver, Branding, DecodedImage, FsAssetResolver};
pub use dispatcher::{ExportDispatcher, ExportSummary, PreparedExport, resolve_rows};
pub(crate) use fs_utils::ensure_writable;
pub use grouping::{ReportGroup, group_rows};
pub use render::TemplateRenderer;
pub use source::{RowPage, RowSource};
pub use surface::{RecordingSurface, Surface};
pub use writer::{LineOutcome, PageWriter, TableLayout};

use crate::ui::messages::success;
use std::path::Path;

/// Completion line shared by every export target.
pub(crate) fn notify_export_success(label: &str, path: &Path) {
    success(format!("{label} export completed: {}", path.display()));
}

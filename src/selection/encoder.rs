use crate::models::{ExportIntent, ReportFilter};
use crate::selection::SelectionState;

/// Serialize the selection plus the active filter into an export intent.
///
/// - non-empty explicit set  -> exact keys
/// - select-all-matching     -> filter minus exceptions
/// - empty explicit set      -> bare filter
pub fn encode_intent(state: &SelectionState, filter: &ReportFilter) -> ExportIntent {
    let filter = filter.without_pagination();
    match state {
        SelectionState::Explicit(keys) if !keys.is_empty() => {
            ExportIntent::SelectedKeys(keys.iter().cloned().collect())
        }
        SelectionState::Explicit(_) => ExportIntent::Filter(filter),
        SelectionState::SelectAllMatching(exceptions) => ExportIntent::SelectAllMatching {
            deselected: exceptions.clone(),
            filter,
        },
    }
}

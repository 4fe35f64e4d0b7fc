use crate::errors::AppResult;
use crate::models::{ExportRequest, ReportFilter, ReportType, RowKey};
use crate::selection::{SelectionAction, SelectionState, encode_intent};
use serde::{Deserialize, Serialize};
use std::fs;

/// A recorded grid session: the filter's match count, the active filter and
/// the checkbox events in order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionScript {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub filter: ReportFilter,
    #[serde(default)]
    pub actions: Vec<SelectionAction>,
    /// Keys of the page on screen after the last action.
    #[serde(default)]
    pub page_keys: Vec<RowKey>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionOutcome {
    pub state: SelectionState,
    pub count: u64,
    pub checked: Vec<RowKey>,
    pub request: ExportRequest,
}

pub struct SelectLogic;

impl SelectLogic {
    /// Parse a script given inline or as `@path`.
    pub fn load_script(raw: &str) -> AppResult<SelectionScript> {
        let body = match raw.trim() {
            r if r.starts_with('@') => fs::read_to_string(&r[1..])?,
            r => r.to_string(),
        };
        let script: SelectionScript = serde_json::from_str(&body)?;
        script.filter.validate()?;
        Ok(script)
    }

    /// Replay the actions from an empty selection and encode the result.
    pub fn replay(
        script: &SelectionScript,
        report_type: ReportType,
        include_passwords: bool,
    ) -> SelectionOutcome {
        let state = SelectionState::default().apply_all(&script.actions);
        let intent = encode_intent(&state, &script.filter);

        SelectionOutcome {
            count: state.count(script.total),
            checked: state.resolve_visible_keys(&script.page_keys),
            request: ExportRequest::from_intent(intent, report_type, include_passwords),
            state,
        }
    }
}

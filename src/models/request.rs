// src/models/request.rs

use crate::errors::{AppError, AppResult};
use crate::models::filter::ReportFilter;
use crate::models::report_row::RowKey;
use crate::models::report_type::ReportType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Body of an export request, exactly as it travels over the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ReportFilter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<ReportType>,

    /// Dedication only: adds the platform password column.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub include_passwords: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_keys: Option<Vec<RowKey>>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub select_all_matching: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deselected_keys: Vec<RowKey>,

    /// Overrides the configured template for the chosen report type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

/// How the server must resolve the authoritative row set.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportIntent {
    /// Exact key lookup; the filter is ignored.
    SelectedKeys(Vec<RowKey>),
    /// Every row matching the filter except the listed keys.
    SelectAllMatching {
        deselected: BTreeSet<RowKey>,
        filter: ReportFilter,
    },
    /// Every row matching the filter.
    Filter(ReportFilter),
}

impl ExportRequest {
    /// Parse and validate a raw JSON body. Any failure is a rejected request.
    pub fn from_json(body: &str) -> AppResult<Self> {
        let req: ExportRequest =
            serde_json::from_str(body).map_err(|e| AppError::validation(e.to_string()))?;
        req.validate()?;
        Ok(req)
    }

    pub fn validate(&self) -> AppResult<()> {
        if let Some(filter) = &self.filter {
            filter.validate()?;
        }
        if let Some(id) = &self.template_id
            && (id.trim().is_empty() || id.contains(['/', '\\']) || id.contains(".."))
        {
            return Err(AppError::validation(format!("invalid template id '{id}'")));
        }
        Ok(())
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type.unwrap_or_default()
    }

    /// Passwords only ever appear on dedication reports.
    pub fn passwords_enabled(&self) -> bool {
        self.include_passwords && self.report_type() == ReportType::Dedication
    }

    /// Resolve the intent in priority order: explicit keys, select-all
    /// with exceptions, then the bare filter.
    pub fn intent(&self) -> ExportIntent {
        let filter = self.filter.clone().unwrap_or_default();

        match &self.selected_keys {
            Some(keys) if !keys.is_empty() => ExportIntent::SelectedKeys(keys.clone()),
            _ if self.select_all_matching => ExportIntent::SelectAllMatching {
                deselected: self.deselected_keys.iter().cloned().collect(),
                filter,
            },
            _ => ExportIntent::Filter(filter),
        }
    }

    /// Wire shape for an intent built by the selection encoder.
    pub fn from_intent(intent: ExportIntent, report_type: ReportType, include_passwords: bool) -> Self {
        let base = ExportRequest {
            report_type: Some(report_type),
            include_passwords,
            ..Default::default()
        };

        match intent {
            ExportIntent::SelectedKeys(keys) => ExportRequest {
                selected_keys: Some(keys),
                ..base
            },
            ExportIntent::SelectAllMatching { deselected, filter } => ExportRequest {
                select_all_matching: true,
                deselected_keys: deselected.into_iter().collect(),
                filter: Some(filter),
                ..base
            },
            ExportIntent::Filter(filter) => ExportRequest {
                filter: Some(filter),
                ..base
            },
        }
    }
}

impl ExportIntent {
    pub fn strategy(&self) -> &'static str {
        match self {
            ExportIntent::SelectedKeys(_) => "selected_keys",
            ExportIntent::SelectAllMatching { .. } => "select_all_matching",
            ExportIntent::Filter(_) => "filter",
        }
    }
}

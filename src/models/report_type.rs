use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The two documents the export pipeline can produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Per-student completion table grouped by center and course.
    #[default]
    Dedication,
    /// Per-group attendance certificate with a participant table.
    Certification,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Dedication => "dedication",
            ReportType::Certification => "certification",
        }
    }

    /// Download filename announced with the PDF stream.
    pub fn filename(&self) -> String {
        format!("report-{}.pdf", self.as_str())
    }

    /// Groups are split by group id only for certificates.
    pub fn groups_by_group_id(&self) -> bool {
        matches!(self, ReportType::Certification)
    }
}

// src/models/filter.rs

use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Filter sent by the enrollment list and echoed back in export requests.
///
/// Id fields accept numbers, numeric strings or comma separated strings
/// (`"3,4"`), single or in arrays. Anything else makes the request invalid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(default, deserialize_with = "id_list", skip_serializing_if = "Vec::is_empty")]
    pub id_company: Vec<i64>,

    #[serde(default, deserialize_with = "id_list", skip_serializing_if = "Vec::is_empty")]
    pub id_center: Vec<i64>,

    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub id_course: Option<i64>,

    #[serde(default, deserialize_with = "id_list", skip_serializing_if = "Vec::is_empty")]
    pub id_group: Vec<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(default, deserialize_with = "opt_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "opt_date", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<SortField>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

/// Sortable columns of the enrollment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    FirstSurname,
    Dni,
    Email,
    CompletionPercentage,
    TimeSpent,
    CompanyName,
    CenterName,
    CourseName,
    GroupName,
    StartDate,
    EndDate,
}

impl SortField {
    /// SQL expression used by the row source for ORDER BY.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Name => "u.name",
            SortField::FirstSurname => "u.first_surname",
            SortField::Dni => "u.dni",
            SortField::Email => "u.email",
            SortField::CompletionPercentage => "ug.completion_percentage",
            SortField::TimeSpent => "ug.time_spent",
            SortField::CompanyName => "co.name",
            SortField::CenterName => "ce.name",
            SortField::CourseName => "c.name",
            SortField::GroupName => "g.name",
            SortField::StartDate => "g.start_date",
            SortField::EndDate => "g.end_date",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl ReportFilter {
    /// Semantic checks that serde cannot express.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(0) = self.limit {
            return Err(AppError::validation("limit must be greater than zero"));
        }
        if let Some(0) = self.page {
            return Err(AppError::validation("page numbers start at 1"));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && start > end
        {
            return Err(AppError::validation(format!(
                "start_date {start} is after end_date {end}"
            )));
        }
        if self.id_company.iter().chain(&self.id_center).chain(&self.id_group).any(|id| *id <= 0)
            || self.id_course.is_some_and(|id| id <= 0)
        {
            return Err(AppError::validation("ids must be positive integers"));
        }
        Ok(())
    }

    /// Trimmed search text, `None` when blank.
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Same filter without the pagination window.
    pub fn without_pagination(&self) -> Self {
        Self {
            page: None,
            limit: None,
            ..self.clone()
        }
    }
}

// ---------------------------
// Lenient id / date decoding
// ---------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIds {
    One(RawId),
    Many(Vec<RawId>),
}

fn parse_text_ids<E: de::Error>(s: &str, out: &mut Vec<i64>) -> Result<(), E> {
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = part
            .parse::<i64>()
            .map_err(|_| E::custom(format!("invalid id '{part}'")))?;
        out.push(id);
    }
    Ok(())
}

fn push_raw<E: de::Error>(raw: RawId, out: &mut Vec<i64>) -> Result<(), E> {
    match raw {
        RawId::Num(n) => {
            out.push(n);
            Ok(())
        }
        RawId::Text(s) => parse_text_ids(&s, out),
    }
}

fn id_list<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawIds>::deserialize(deserializer)
        .map_err(|_| de::Error::custom("ids must be numbers or numeric strings"))?;

    let mut out = Vec::new();
    match raw {
        None => {}
        Some(RawIds::One(id)) => push_raw(id, &mut out)?,
        Some(RawIds::Many(ids)) => {
            for id in ids {
                push_raw(id, &mut out)?;
            }
        }
    }
    Ok(out)
}

fn opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = id_list(deserializer)?;
    match ids.as_slice() {
        [] => Ok(None),
        [one] => Ok(Some(*one)),
        _ => Err(de::Error::custom("expected a single id")),
    }
}

fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => crate::utils::date::parse_date(s)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date '{s}' (expected YYYY-MM-DD)"))),
    }
}

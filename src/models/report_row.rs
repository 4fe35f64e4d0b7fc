// src/models/report_row.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of one (user, group) enrollment fact.
///
/// Format: `"{id_user}-{id_group}"` when both ids are known, otherwise
/// `"{dni}-{moodle_id}"` with missing parts rendered as empty strings.
/// The client computes the very same string, so selections reconcile exactly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(String);

impl RowKey {
    pub fn new<T: Into<String>>(raw: T) -> Self {
        RowKey(raw.into())
    }

    pub fn from_ids(id_user: i64, id_group: i64) -> Self {
        RowKey(format!("{id_user}-{id_group}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a key back into its lookup shape.
    pub fn parts(&self) -> KeyParts<'_> {
        if let Some((user, group)) = self.0.split_once('-')
            && let (Ok(u), Ok(g)) = (user.parse::<i64>(), group.parse::<i64>())
        {
            return KeyParts::Ids {
                id_user: u,
                id_group: g,
            };
        }

        self.fallback_parts()
    }

    /// Read the key as `dni-moodle_id` only. An all-digit dni makes this
    /// form indistinguishable from the id form, so lookups try both.
    pub fn fallback_parts(&self) -> KeyParts<'_> {
        // dni may itself contain dashes, moodle_id never does
        match self.0.rsplit_once('-') {
            Some((dni, moodle_id)) => KeyParts::Fallback { dni, moodle_id },
            None => KeyParts::Fallback {
                dni: &self.0,
                moodle_id: "",
            },
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        RowKey(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyParts<'a> {
    Ids { id_user: i64, id_group: i64 },
    Fallback { dni: &'a str, moodle_id: &'a str },
}

/// One row per (user, group) enrollment, as returned by the row source.
/// Rows are snapshots: the export pipeline never mutates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub id_user: Option<i64>,
    pub id_group: Option<i64>,
    pub id_course: Option<i64>,
    pub id_center: Option<i64>,
    pub id_company: Option<i64>,
    pub moodle_id: Option<i64>,

    pub name: String,
    pub first_surname: Option<String>,
    pub second_surname: Option<String>,
    pub dni: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,

    pub completion_percentage: Option<f64>,
    /// Seconds spent in the course platform.
    pub time_spent: Option<i64>,

    pub company_name: Option<String>,
    pub center_name: Option<String>,
    pub course_name: Option<String>,
    pub group_name: Option<String>,
    pub group_start_date: Option<String>,
    pub group_end_date: Option<String>,

    pub moodle_username: Option<String>,
    pub moodle_password: Option<String>,
}

impl ReportRow {
    pub fn key(&self) -> RowKey {
        match (self.id_user, self.id_group) {
            (Some(u), Some(g)) => RowKey::from_ids(u, g),
            _ => self.fallback_key(),
        }
    }

    /// The `dni-moodle_id` form, whatever ids the row carries.
    pub fn fallback_key(&self) -> RowKey {
        RowKey(format!(
            "{}-{}",
            self.dni.as_deref().unwrap_or(""),
            self.moodle_id.map(|m| m.to_string()).unwrap_or_default()
        ))
    }

    /// "First Second" surnames, trimmed; empty when both are missing.
    pub fn surnames(&self) -> String {
        let first = self.first_surname.as_deref().unwrap_or("").trim();
        let second = self.second_surname.as_deref().unwrap_or("").trim();
        format!("{first} {second}").trim().to_string()
    }

    /// "Surnames, Name" as printed in the participant tables.
    pub fn full_name(&self) -> String {
        let surnames = self.surnames();
        let name = self.name.trim();
        if surnames.is_empty() {
            name.to_string()
        } else if name.is_empty() {
            surnames
        } else {
            format!("{surnames}, {name}")
        }
    }
}

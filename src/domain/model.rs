use crate::utils::error::{RecordError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// One row of tabular data. Keys are column names; there is no fixed schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CsvRow(BTreeMap<String, String>);

impl CsvRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs.into_iter().collect()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(column.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CsvRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// An issue as returned by the GitHub REST API, reduced to the fields the
/// tracker reads. Extra payload fields are ignored when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubIssue {
    pub number: u64,
    pub title: String,
    /// GitHub sends `null` for issues without a description.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    pub created_at: String,
    pub html_url: String,
}

impl GitHubIssue {
    pub fn created_at_utc(&self) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|source| RecordError::TimestampError {
                field: "created_at".to_string(),
                value: self.created_at.clone(),
                source,
            })
    }
}

impl fmt::Display for GitHubIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.number, self.title)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Added/modified/removed counts. Sums saturate at `u64::MAX` rather than
/// overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    pub added: u64,
    pub modified: u64,
    pub removed: u64,
}

impl ChangeCounts {
    pub fn new(added: u64, modified: u64, removed: u64) -> Self {
        Self {
            added,
            modified,
            removed,
        }
    }

    pub fn total(&self) -> u64 {
        self.added
            .saturating_add(self.modified)
            .saturating_add(self.removed)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Add for ChangeCounts {
    type Output = ChangeCounts;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            added: self.added.saturating_add(rhs.added),
            modified: self.modified.saturating_add(rhs.modified),
            removed: self.removed.saturating_add(rhs.removed),
        }
    }
}

impl AddAssign for ChangeCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// One change-log entry: what changed in the tracked CSV on `date`, and the
/// commit that recorded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateHistory {
    pub date: String,
    pub changes: ChangeCounts,
    #[serde(rename = "commitUrl")]
    pub commit_url: String,
}

impl UpdateHistory {
    pub fn parsed_date(&self, format: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, format).map_err(|source| {
            RecordError::TimestampError {
                field: "date".to_string(),
                value: self.date.clone(),
                source,
            }
        })
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: +{} ~{} -{}",
            self.date, self.changes.added, self.changes.modified, self.changes.removed
        )
    }
}

impl fmt::Display for UpdateHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Which record shape a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Rows,
    Issues,
    History,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rows => "rows",
            Self::Issues => "issues",
            Self::History => "history",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rows" => Ok(Self::Rows),
            "issues" => Ok(Self::Issues),
            "history" => Ok(Self::History),
            other => Err(RecordError::InvalidConfigValueError {
                field: "kind".to_string(),
                value: other.to_string(),
                reason: "Expected one of: rows, issues, history".to_string(),
            }),
        }
    }
}

//! core::types
//!
//! Wire and domain types shared by the proxy, the API client and the
//! workflows.
//!
//! # Types
//!
//! - [`DateRange`] - Validated inclusive calendar date range
//! - [`JobId`] - Opaque changelog generation job identifier
//! - [`Cursor`] - Opaque `lastTimestamp` pagination token
//! - [`Commit`] - A commit as reported by the backend
//! - [`ChangelogRequest`] - Payload for a generation request
//! - [`ChangelogEntry`] - A generated changelog with sections and bullets
//! - [`CommitPage`], [`ChangelogPage`], [`JobStatus`] - Response envelopes
//!
//! # Wire Format
//!
//! Field names follow the backend's camelCase JSON. Optional fields are
//! omitted on the wire rather than sent as `null`.
//!
//! # Examples
//!
//! ```
//! use changelog_portal::core::types::{ChangelogRequest, DateRange};
//! use chrono::NaiveDate;
//!
//! let range = DateRange::new(
//!     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
//! ).unwrap();
//!
//! let request = ChangelogRequest::new(range, "  ", "Spring release");
//! let json = serde_json::to_value(&request).unwrap();
//! assert_eq!(json["startDate"], "2024-03-01");
//! assert!(json.get("version").is_none());
//! assert_eq!(json["title"], "Spring release");
//!
//! // Reversed ranges are rejected at construction time
//! assert!(DateRange::new(
//!     NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
//! ).is_err());
//! ```

use std::fmt;

use chrono::{DateTime, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid date range: {start} is after {end}")]
    ReversedRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid job id: {0}")]
    InvalidJobId(String),
}

/// Number of days covered by the default range, ending today.
pub const DEFAULT_RANGE_DAYS: u64 = 7;

/// An inclusive calendar date range.
///
/// The start is never after the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a validated date range.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::ReversedRange` if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TypeError> {
        if start > end {
            return Err(TypeError::ReversedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The default range: the last seven days ending on `today`.
    pub fn last_week(today: NaiveDate) -> Self {
        let start = today
            .checked_sub_days(Days::new(DEFAULT_RANGE_DAYS))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    /// Parse a range from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, TypeError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Query-string form of the start date.
    pub fn start_param(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// Query-string form of the end date.
    pub fn end_param(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, TypeError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| TypeError::InvalidDate(value.to_string()))
}

/// Opaque identifier for a changelog generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Create a job id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidJobId` if the id is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(TypeError::InvalidJobId("job id cannot be empty".into()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for JobId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque pagination token pointing at the next (older) page of changelogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A commit as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub author: String,
    pub message: String,
    pub date: String,
    pub link: String,
}

impl Commit {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Seven-character abbreviated sha.
    pub fn short_sha(&self) -> &str {
        match self.sha.char_indices().nth(7) {
            Some((idx, _)) => &self.sha[..idx],
            None => &self.sha,
        }
    }

    /// Calendar date of the commit, falling back to the raw value.
    pub fn display_date(&self) -> String {
        display_date(&self.date)
    }
}

/// Render an RFC 3339 timestamp or ISO date as a calendar date.
///
/// Unparseable values are returned unchanged.
pub fn display_date(value: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return ts.date_naive().to_string();
    }
    match parse_date(value) {
        Ok(date) => date.to_string(),
        Err(_) => value.to_string(),
    }
}

/// Payload submitted to start changelog generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ChangelogRequest {
    /// Build a request from raw form input.
    ///
    /// Version and title are trimmed; blank values are dropped.
    pub fn new(range: DateRange, version: &str, title: &str) -> Self {
        Self {
            start_date: range.start(),
            end_date: range.end(),
            version: non_blank(version),
            title: non_blank(title),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A single bullet inside a changelog section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletPoint {
    #[serde(alias = "description")]
    pub bullet_point_details: String,
    #[serde(
        default,
        alias = "commitLink",
        skip_serializing_if = "Option::is_none"
    )]
    pub link_to_relevant_commit: Option<String>,
}

/// A titled group of bullets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(alias = "category")]
    pub heading: String,
    #[serde(default, alias = "items")]
    pub bullet_points: Vec<BulletPoint>,
}

/// A generated changelog.
///
/// Persisted entries and freshly generated previews use different field
/// names on the wire (`sections`/`heading`/`bulletPoints` versus
/// `changes`/`category`/`items`); both decode into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, alias = "changes")]
    pub sections: Vec<Section>,
}

impl ChangelogEntry {
    /// `version - title` from whichever parts are present and non-empty.
    pub fn headline(&self) -> Option<String> {
        let parts: Vec<&str> = [self.version.as_deref(), self.title.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" - "))
        }
    }

    /// Human-readable date range, e.g. `2024-03-01 → 2024-03-08`.
    pub fn date_range_label(&self) -> String {
        let start = self.start_date.as_deref().map(display_date);
        let end = self.end_date.as_deref().map(display_date);
        format!(
            "{} → {}",
            start.as_deref().unwrap_or("?"),
            end.as_deref().unwrap_or("?")
        )
    }
}

/// A page of commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitPage {
    #[serde(default)]
    pub items: Vec<Commit>,
    #[serde(default)]
    pub total_pages: u32,
}

/// A page of persisted changelog entries, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogPage {
    #[serde(default)]
    pub items: Vec<ChangelogEntry>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<Cursor>,
}

/// Response to a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAccepted {
    pub id: JobId,
}

/// Status of a generation job.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog: Option<ChangelogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Query for one page of commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitQuery {
    /// Zero-based page index
    pub page: u32,
    pub page_size: u32,
    pub range: DateRange,
}

impl CommitQuery {
    /// Query parameters in wire order.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
            ("startDate", self.range.start_param()),
            ("endDate", self.range.end_param()),
        ]
    }
}

/// Query for one page of changelog entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogQuery {
    pub page_size: u32,
    /// Absent on the first page
    pub cursor: Option<Cursor>,
}

impl ChangelogQuery {
    /// Query parameters; `lastTimestamp` is only sent with a cursor.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("pageSize", self.page_size.to_string())];
        if let Some(cursor) = &self.cursor {
            params.push(("lastTimestamp", cursor.as_str().to_string()));
        }
        params
    }
}

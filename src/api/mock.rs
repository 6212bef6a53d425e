//! api::mock
//!
//! In-memory [`ChangelogApi`] implementation for deterministic testing.
//!
//! # Design
//!
//! The mock holds a commit list and a changelog list and paginates them the
//! way the backend does. Generation jobs get sequential ids and answer
//! status queries from a script; once the script runs dry every poll reports
//! "still running". Every call is recorded for verification.
//!
//! # Example
//!
//! ```
//! use changelog_portal::api::mock::MockApi;
//! use changelog_portal::api::ChangelogApi;
//! use changelog_portal::core::types::{ChangelogRequest, DateRange, JobStatus};
//! use chrono::NaiveDate;
//!
//! # tokio_test::block_on(async {
//! let api = MockApi::new();
//! api.push_status(JobStatus { completed: true, ..Default::default() });
//!
//! let range = DateRange::last_week(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
//! let job = api.submit_changelog(&ChangelogRequest::new(range, "", "")).await.unwrap();
//! assert_eq!(job.as_str(), "job-1");
//!
//! let status = api.changelog_status(&job).await.unwrap();
//! assert!(status.completed);
//! # });
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::traits::{ApiError, ChangelogApi};
use crate::core::types::{
    parse_date, ChangelogEntry, ChangelogPage, ChangelogQuery, ChangelogRequest, Commit,
    CommitPage, CommitQuery, Cursor, DateRange, JobId, JobStatus,
};

/// Mock API for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockApi {
    inner: Arc<Mutex<MockApiInner>>,
}

#[derive(Debug, Default)]
struct MockApiInner {
    commits: Vec<Commit>,
    changelogs: Vec<ChangelogEntry>,
    statuses: VecDeque<Result<JobStatus, ApiError>>,
    next_job: u64,
    fail_on: Option<FailOn>,
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    ListCommits(ApiError),
    ListChangelogs(ApiError),
    SubmitChangelog(ApiError),
    ChangelogStatus(ApiError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    ListCommits {
        page: u32,
        page_size: u32,
        range: DateRange,
    },
    ListChangelogs {
        page_size: u32,
        cursor: Option<Cursor>,
    },
    SubmitChangelog(ChangelogRequest),
    ChangelogStatus(JobId),
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the commit list.
    pub fn with_commits(self, commits: Vec<Commit>) -> Self {
        self.lock().commits = commits;
        self
    }

    /// Seed the persisted changelogs, newest first.
    pub fn with_changelogs(self, entries: Vec<ChangelogEntry>) -> Self {
        self.lock().changelogs = entries;
        self
    }

    /// Queue a status response.
    pub fn push_status(&self, status: JobStatus) {
        self.lock().statuses.push_back(Ok(status));
    }

    /// Queue a failing status response.
    pub fn push_status_error(&self, error: ApiError) {
        self.lock().statuses.push_back(Err(error));
    }

    /// Make an operation fail until cleared.
    pub fn fail_on(&self, fail: FailOn) {
        self.lock().fail_on = Some(fail);
    }

    pub fn clear_failure(&self) {
        self.lock().fail_on = None;
    }

    /// All recorded operations, in call order.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Number of status requests made so far.
    pub fn status_calls(&self) -> usize {
        self.lock()
            .operations
            .iter()
            .filter(|op| matches!(op, MockOperation::ChangelogStatus(_)))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, MockApiInner> {
        // A poisoned mock only happens after a test already panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Whether a commit's date falls inside the range. Unparseable dates match.
fn in_range(commit: &Commit, range: &DateRange) -> bool {
    let day = chrono::DateTime::parse_from_rfc3339(&commit.date)
        .map(|ts| ts.date_naive())
        .or_else(|_| parse_date(&commit.date));
    match day {
        Ok(day) => day >= range.start() && day <= range.end(),
        Err(_) => true,
    }
}

#[async_trait]
impl ChangelogApi for MockApi {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_commits(&self, query: &CommitQuery) -> Result<CommitPage, ApiError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::ListCommits {
            page: query.page,
            page_size: query.page_size,
            range: query.range,
        });
        if let Some(FailOn::ListCommits(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        let matching: Vec<&Commit> = inner
            .commits
            .iter()
            .filter(|c| in_range(c, &query.range))
            .collect();
        let size = query.page_size.max(1) as usize;
        let total_pages = matching.len().div_ceil(size) as u32;
        let items = matching
            .into_iter()
            .skip(query.page as usize * size)
            .take(size)
            .cloned()
            .collect();

        Ok(CommitPage { items, total_pages })
    }

    async fn list_changelogs(&self, query: &ChangelogQuery) -> Result<ChangelogPage, ApiError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::ListChangelogs {
            page_size: query.page_size,
            cursor: query.cursor.clone(),
        });
        if let Some(FailOn::ListChangelogs(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        // The mock's cursor is the offset of the next entry.
        let offset = match &query.cursor {
            Some(cursor) => cursor.as_str().parse::<usize>().map_err(|_| ApiError::Status {
                status: 400,
                message: format!("bad cursor '{}'", cursor.as_str()),
            })?,
            None => 0,
        };
        let size = query.page_size.max(1) as usize;
        let items: Vec<ChangelogEntry> = inner
            .changelogs
            .iter()
            .skip(offset)
            .take(size)
            .cloned()
            .collect();
        let next = offset + items.len();
        let has_more = next < inner.changelogs.len();

        Ok(ChangelogPage {
            items,
            has_more,
            last_timestamp: has_more.then(|| Cursor::new(next.to_string())),
        })
    }

    async fn submit_changelog(&self, request: &ChangelogRequest) -> Result<JobId, ApiError> {
        let mut inner = self.lock();
        inner
            .operations
            .push(MockOperation::SubmitChangelog(request.clone()));
        if let Some(FailOn::SubmitChangelog(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        inner.next_job += 1;
        JobId::new(format!("job-{}", inner.next_job)).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn changelog_status(&self, id: &JobId) -> Result<JobStatus, ApiError> {
        let mut inner = self.lock();
        inner
            .operations
            .push(MockOperation::ChangelogStatus(id.clone()));
        if let Some(FailOn::ChangelogStatus(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        inner.statuses.pop_front().unwrap_or_else(|| Ok(JobStatus::default()))
    }
}

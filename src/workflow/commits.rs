//! workflow::commits
//!
//! Commit browser: one page of commits for a date range at a time.
//!
//! # Invariants
//!
//! - Changing the date range resets the page index to 0 and discards the
//!   listing until the new range is fetched.
//! - `previous` is unavailable at page 0; `next` is unavailable at the last
//!   page (`total_pages - 1`) or when there are no pages. Stepping past a
//!   boundary is a no-op.
//! - A failed fetch records an error and suppresses the listing.
//! - Generation is only possible when a non-empty listing is loaded.

use chrono::NaiveDate;

use crate::api::{ApiError, ChangelogApi};
use crate::core::types::{Commit, CommitQuery, DateRange, TypeError};

/// State of the commit listing for one date range.
#[derive(Debug, Clone)]
pub struct CommitBrowser {
    range: DateRange,
    page: u32,
    page_size: u32,
    total_pages: u32,
    /// `None` until the first successful fetch, and after a failed one
    commits: Option<Vec<Commit>>,
    loading: bool,
    error: Option<String>,
}

impl CommitBrowser {
    pub fn new(range: DateRange, page_size: u32) -> Self {
        Self {
            range,
            page: 0,
            page_size: page_size.max(1),
            total_pages: 0,
            commits: None,
            loading: false,
            error: None,
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Zero-based page index.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// The current listing, if one is loaded.
    pub fn commits(&self) -> Option<&[Commit]> {
        self.commits.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the date range. Returns `true` if it changed.
    ///
    /// A change resets the page and drops the previous range's listing;
    /// nothing is reported for the new range until the next [`fetch`].
    ///
    /// [`fetch`]: CommitBrowser::fetch
    pub fn set_range(&mut self, range: DateRange) -> bool {
        if range == self.range {
            return false;
        }
        self.range = range;
        self.page = 0;
        self.total_pages = 0;
        self.commits = None;
        self.error = None;
        true
    }

    /// Change only the start date.
    pub fn set_start(&mut self, start: NaiveDate) -> Result<bool, TypeError> {
        let range = DateRange::new(start, self.range.end())?;
        Ok(self.set_range(range))
    }

    /// Change only the end date.
    pub fn set_end(&mut self, end: NaiveDate) -> Result<bool, TypeError> {
        let range = DateRange::new(self.range.start(), end)?;
        Ok(self.set_range(range))
    }

    pub fn can_previous(&self) -> bool {
        self.page > 0
    }

    pub fn can_next(&self) -> bool {
        self.page.saturating_add(1) < self.total_pages
    }

    /// Step back one page. Returns `false` at the first page.
    pub fn previous(&mut self) -> bool {
        if !self.can_previous() {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Step forward one page. Returns `false` at the last page.
    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Jump to a page, clamped to the known page count.
    pub fn go_to(&mut self, page: u32) {
        self.page = page.min(self.total_pages.saturating_sub(1));
    }

    /// Whether a loaded listing exists and is empty.
    pub fn is_empty(&self) -> bool {
        matches!(&self.commits, Some(c) if c.is_empty())
    }

    /// Whether changelog generation should be offered for this range.
    pub fn can_generate(&self) -> bool {
        matches!(&self.commits, Some(c) if !c.is_empty())
    }

    /// The query for the current page.
    pub fn query(&self) -> CommitQuery {
        CommitQuery {
            page: self.page,
            page_size: self.page_size,
            range: self.range,
        }
    }

    /// Fetch the current page.
    ///
    /// On failure the error is recorded, the listing is cleared and the
    /// error is returned.
    pub async fn fetch(&mut self, api: &dyn ChangelogApi) -> Result<(), ApiError> {
        self.loading = true;
        let query = self.query();
        tracing::debug!(api = api.name(), page = query.page, range = %query.range, "fetching commits");

        let result = api.list_commits(&query).await;
        self.loading = false;

        match result {
            Ok(page) => {
                self.total_pages = page.total_pages;
                self.commits = Some(page.items);
                self.error = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch commits");
                self.commits = None;
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

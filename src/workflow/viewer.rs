//! workflow::viewer
//!
//! Cursor-paginated changelog feed.
//!
//! The first load fetches without a cursor. Each "load more" sends the
//! cursor from the previous response and appends the new entries below the
//! ones already shown. Entries arrive newest first.

use crate::api::{ApiError, ChangelogApi};
use crate::core::types::{ChangelogEntry, ChangelogQuery, Cursor};

#[derive(Debug, Clone)]
pub struct ChangelogViewer {
    page_size: u32,
    entries: Vec<ChangelogEntry>,
    cursor: Option<Cursor>,
    has_more: bool,
    loaded: bool,
    loading: bool,
    error: Option<String>,
}

impl ChangelogViewer {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            entries: Vec::new(),
            cursor: None,
            has_more: false,
            loaded: false,
            loading: false,
            error: None,
        }
    }

    pub fn entries(&self) -> &[ChangelogEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether the first page has been loaded successfully.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the "Load More" control should be shown.
    pub fn can_load_more(&self) -> bool {
        self.loaded && self.has_more && self.cursor.is_some() && !self.loading
    }

    /// Load the first page, replacing anything shown.
    pub async fn load_first(&mut self, api: &dyn ChangelogApi) -> Result<usize, ApiError> {
        self.entries.clear();
        self.cursor = None;
        self.has_more = false;
        self.loaded = false;
        self.fetch(api, None).await
    }

    /// Append the next page. Returns the number of entries added; `0` when
    /// there is nothing more to load.
    pub async fn load_more(&mut self, api: &dyn ChangelogApi) -> Result<usize, ApiError> {
        if !self.can_load_more() {
            return Ok(0);
        }
        let cursor = self.cursor.clone();
        self.fetch(api, cursor).await
    }

    async fn fetch(
        &mut self,
        api: &dyn ChangelogApi,
        cursor: Option<Cursor>,
    ) -> Result<usize, ApiError> {
        let query = ChangelogQuery {
            page_size: self.page_size,
            cursor,
        };
        tracing::debug!(
            api = api.name(),
            cursor = ?query.cursor.as_ref().map(Cursor::as_str),
            "fetching changelogs"
        );

        self.loading = true;
        let result = api.list_changelogs(&query).await;
        self.loading = false;

        match result {
            Ok(page) => {
                let added = page.items.len();
                self.entries.extend(page.items);
                self.has_more = page.has_more;
                self.cursor = page.last_timestamp;
                self.loaded = true;
                self.error = None;
                Ok(added)
            }
            Err(err) => {
                // Entries already shown stay; the cursor is kept so the
                // same page can be retried.
                tracing::warn!(error = %err, "failed to fetch changelogs");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

use super::query::{FeedRequest, QueryDescriptor, DEFAULT_PAGE_SIZE};
use crate::api::{Article, ArticlePage, ErrorNotice};

/// Identity of one issued feed request.
///
/// The generation is bumped on every issue, so two requests for the same
/// descriptor are still told apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub descriptor: QueryDescriptor,
    pub generation: u64,
}

/// A request the caller must execute and report back through
/// [`FeedController::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub key: RequestKey,
    pub request: FeedRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    /// Showing (or loading) the first page.
    Fresh,
    /// At least one load-more has been issued.
    Paging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Page 1 replaced the list.
    Replaced,
    /// A later page was appended.
    Appended,
    /// The response belonged to a superseded request and was dropped.
    Stale,
    /// The request failed; the list was kept.
    Failed,
}

/// Feed state machine: owns the query descriptor and the accumulated
/// article list, and decides what to request and how to merge results.
///
/// It never performs I/O. Every mutating call returns the
/// [`PendingFetch`] to execute (if any); results come back through
/// [`apply`](Self::apply) and only the response matching the latest issued
/// key may touch the list.
#[derive(Debug)]
pub struct FeedController {
    descriptor: QueryDescriptor,
    page_size: u32,
    articles: Vec<Article>,
    total: u64,
    has_next: bool,
    /// Last page merged into `articles`; 0 when nothing has loaded.
    loaded_page: u32,
    generation: u64,
    in_flight: Option<RequestKey>,
    error: Option<ErrorNotice>,
    last_failed: Option<QueryDescriptor>,
}

impl Default for FeedController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FeedController {
    pub fn new(page_size: u32) -> Self {
        Self {
            descriptor: QueryDescriptor::default(),
            page_size: page_size.max(1),
            articles: Vec::new(),
            total: 0,
            has_next: false,
            loaded_page: 0,
            generation: 0,
            in_flight: None,
            error: None,
            last_failed: None,
        }
    }

    /// Start from a restored category (e.g. the one persisted last run).
    pub fn with_category(page_size: u32, category: &str) -> Self {
        let mut controller = Self::new(page_size);
        controller.descriptor.category = category.to_string();
        controller
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Request the first page of the current descriptor.
    pub fn start(&mut self) -> PendingFetch {
        self.descriptor.page = 1;
        self.issue()
    }

    /// Change the search text (already normalized). Resets to page 1 and
    /// clears the list; returns `None` when the text is unchanged.
    pub fn set_search(&mut self, search: &str) -> Option<PendingFetch> {
        if self.descriptor.search == search {
            return None;
        }
        self.descriptor.search = search.to_string();
        Some(self.reset())
    }

    /// Change the category. Same reset rules as [`set_search`](Self::set_search).
    pub fn set_category(&mut self, category: &str) -> Option<PendingFetch> {
        if self.descriptor.category == category {
            return None;
        }
        self.descriptor.category = category.to_string();
        Some(self.reset())
    }

    /// Request the next page. Only allowed while the server reports more
    /// results and no request is outstanding.
    pub fn load_more(&mut self) -> Option<PendingFetch> {
        if !self.can_load_more() {
            return None;
        }
        self.descriptor.page = self.loaded_page + 1;
        Some(self.issue())
    }

    /// Re-request page 1 without clearing what is displayed.
    pub fn refresh(&mut self) -> PendingFetch {
        self.descriptor.page = 1;
        self.issue()
    }

    /// Re-issue the request that last failed. `None` if nothing failed.
    pub fn retry(&mut self) -> Option<PendingFetch> {
        let failed = self.last_failed.clone()?;
        if failed.search != self.descriptor.search || failed.category != self.descriptor.category {
            return None;
        }
        self.descriptor.page = failed.page;
        Some(self.issue())
    }

    /// Merge a response. Responses whose key is not the latest issued one
    /// are discarded without touching any state.
    pub fn apply(
        &mut self,
        key: &RequestKey,
        result: Result<ArticlePage, ErrorNotice>,
    ) -> ApplyOutcome {
        if self.in_flight.as_ref() != Some(key) {
            tracing::debug!(
                generation = key.generation,
                current = self.generation,
                "Discarding stale feed response"
            );
            return ApplyOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(page) => self.merge(key.descriptor.page, page),
            Err(notice) => {
                tracing::warn!(
                    page = key.descriptor.page,
                    title = %notice.title,
                    "Feed request failed"
                );
                self.error = Some(notice);
                self.last_failed = Some(key.descriptor.clone());
                self.descriptor.page = self.loaded_page.max(1);
                ApplyOutcome::Failed
            }
        }
    }

    /// Show a cached page for the in-flight request while the network
    /// refresh continues. Returns false if `key` is not current.
    pub fn show_cached(&mut self, key: &RequestKey, page: ArticlePage) -> bool {
        if self.in_flight.as_ref() != Some(key) {
            return false;
        }
        self.merge(key.descriptor.page, page);
        true
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn reset(&mut self) -> PendingFetch {
        self.descriptor.page = 1;
        self.articles.clear();
        self.total = 0;
        self.has_next = false;
        self.loaded_page = 0;
        self.error = None;
        self.last_failed = None;
        self.issue()
    }

    fn issue(&mut self) -> PendingFetch {
        self.generation += 1;
        let key = RequestKey {
            descriptor: self.descriptor.clone(),
            generation: self.generation,
        };
        self.in_flight = Some(key.clone());
        PendingFetch {
            request: FeedRequest::build(&self.descriptor, self.page_size),
            key,
        }
    }

    fn merge(&mut self, page_no: u32, page: ArticlePage) -> ApplyOutcome {
        self.total = page.total;
        self.has_next = page.has_next;
        self.error = None;
        self.last_failed = None;
        if page_no <= 1 {
            self.articles = page.articles;
            self.loaded_page = 1;
            ApplyOutcome::Replaced
        } else {
            // A stale-then-fresh pair for the same page must not duplicate.
            let keep = self.page_offset(page_no);
            self.articles.truncate(keep);
            self.articles.extend(page.articles);
            self.loaded_page = page_no;
            ApplyOutcome::Appended
        }
    }

    /// Number of articles that precede `page_no` in the accumulated list.
    fn page_offset(&self, page_no: u32) -> usize {
        let before = (page_no.saturating_sub(1) as usize).saturating_mul(self.page_size as usize);
        before.min(self.articles.len())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    pub fn search(&self) -> &str {
        &self.descriptor.search
    }

    pub fn category(&self) -> &str {
        &self.descriptor.category
    }

    pub fn page(&self) -> u32 {
        self.descriptor.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True while a page beyond the first is outstanding.
    pub fn is_loading_more(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|key| key.descriptor.page > 1)
    }

    pub fn can_load_more(&self) -> bool {
        self.has_next && self.in_flight.is_none()
    }

    pub fn error(&self) -> Option<&ErrorNotice> {
        self.error.as_ref()
    }

    pub fn phase(&self) -> FeedPhase {
        if self.descriptor.page > 1 {
            FeedPhase::Paging
        } else {
            FeedPhase::Fresh
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

//! Bookmark status and list state for the current user.
//!
//! Status checks and the bookmark list are cached per user. Every
//! mutation replaces that article's status entry with the mutation's result
//! and invalidates the whole list so the next list read goes to the server.
//!
//! Each article carries a mutation epoch. A status check is tagged with the
//! epoch current when it was issued, and a result from an older epoch is
//! dropped: it may predate a create or delete that has since landed.

use crate::api::{ApiClient, ApiError, Bookmark, ErrorNotice};
use crate::cache::{CacheKey, Lookup, QueryCache};
use crate::session::SessionIdentity;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Cache tag for the bookmark list.
pub const BOOKMARKS_TAG: &str = "bookmarks";

/// Cache tag for per-article status checks.
pub const STATUS_TAG: &str = "bookmark-status";

pub const DEFAULT_BOOKMARKS_TTL: Duration = Duration::from_secs(30);

/// Page requested from `GET /api/bookmarks`.
pub const LIST_SKIP: u32 = 0;
pub const LIST_LIMIT: u32 = 50;

/// Flip the bookmark on `article_id`: check the server-side status, then
/// create or delete. Returns the new status.
pub async fn toggle_bookmark(
    api: &ApiClient,
    user: &SessionIdentity,
    article_id: i64,
) -> Result<bool, ApiError> {
    if api.is_bookmarked(article_id, user).await? {
        api.delete_bookmark_for_article(article_id, user).await?;
        tracing::info!(article_id, "Bookmark removed");
        Ok(false)
    } else {
        api.create_bookmark(article_id, user).await?;
        tracing::info!(article_id, "Bookmark added");
        Ok(true)
    }
}

#[derive(Debug)]
pub struct BookmarkBook {
    user: SessionIdentity,
    ttl: Duration,
    status: QueryCache<bool>,
    list_cache: QueryCache<Vec<Bookmark>>,
    bookmarks: Vec<Bookmark>,
    list_loading: bool,
    list_error: Option<ErrorNotice>,
    toggling: HashSet<i64>,
    epochs: HashMap<i64, u64>,
    /// Mutations applied so far, and the count when the running list load
    /// was issued.
    mutations: u64,
    list_issued_at: u64,
}

impl BookmarkBook {
    pub fn new(user: SessionIdentity, ttl: Duration, capacity: NonZeroUsize) -> Self {
        Self {
            user,
            ttl,
            status: QueryCache::new(capacity),
            list_cache: QueryCache::new(NonZeroUsize::MIN),
            bookmarks: Vec::new(),
            list_loading: false,
            list_error: None,
            toggling: HashSet::new(),
            epochs: HashMap::new(),
            mutations: 0,
            list_issued_at: 0,
        }
    }

    pub fn user(&self) -> &SessionIdentity {
        &self.user
    }

    fn status_key(&self, article_id: i64) -> CacheKey {
        CacheKey::new(STATUS_TAG, &[article_id.to_string().as_str(), self.user.as_str()])
    }

    fn list_key(&self) -> CacheKey {
        CacheKey::new(
            BOOKMARKS_TAG,
            &[
                self.user.as_str(),
                LIST_SKIP.to_string().as_str(),
                LIST_LIMIT.to_string().as_str(),
            ],
        )
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Last known status, fresh or stale.
    pub fn cached_status(&mut self, article_id: i64, now: Instant) -> Option<bool> {
        let key = self.status_key(article_id);
        self.status.lookup(&key, now).value()
    }

    /// True if no fresh status is cached for `article_id`.
    pub fn needs_status_check(&mut self, article_id: i64, now: Instant) -> bool {
        let key = self.status_key(article_id);
        !self.status.lookup(&key, now).is_fresh()
    }

    /// Epoch to tag a status check for `article_id` with.
    pub fn status_epoch(&self, article_id: i64) -> u64 {
        self.epochs.get(&article_id).copied().unwrap_or(0)
    }

    /// Cache a checked status. Returns false, leaving the cache alone, if
    /// the article was mutated after the check was issued at `epoch`.
    pub fn record_status(
        &mut self,
        article_id: i64,
        epoch: u64,
        bookmarked: bool,
        now: Instant,
    ) -> bool {
        if epoch != self.status_epoch(article_id) {
            tracing::debug!(article_id, epoch, "Dropping superseded bookmark status");
            return false;
        }
        self.store_status(article_id, bookmarked, now);
        true
    }

    fn store_status(&mut self, article_id: i64, bookmarked: bool, now: Instant) {
        let key = self.status_key(article_id);
        self.status.insert(&key, bookmarked, self.ttl, now);
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Mark a toggle as running. False if one is already running for this
    /// article.
    pub fn begin_toggle(&mut self, article_id: i64) -> bool {
        self.toggling.insert(article_id)
    }

    pub fn is_toggling(&self, article_id: i64) -> bool {
        self.toggling.contains(&article_id)
    }

    /// Settle a toggle. On success the list cache is invalidated, the
    /// article's epoch moves on and the new status is cached and returned.
    pub fn finish_toggle(
        &mut self,
        article_id: i64,
        result: Result<bool, ApiError>,
        now: Instant,
    ) -> Result<bool, ErrorNotice> {
        self.toggling.remove(&article_id);
        match result {
            Ok(bookmarked) => {
                self.after_mutation(article_id, bookmarked, now);
                if !bookmarked {
                    self.bookmarks.retain(|b| b.article_id != article_id);
                }
                Ok(bookmarked)
            }
            Err(e) => {
                tracing::warn!(article_id, error = %e, "Bookmark toggle failed");
                Err(ErrorNotice::from_error(&e, Some("Bookmark update failed")))
            }
        }
    }

    /// A bookmark was deleted by id from the bookmarks view.
    pub fn on_removed(&mut self, bookmark_id: i64, now: Instant) {
        let article_id = self
            .bookmarks
            .iter()
            .find(|b| b.id == bookmark_id)
            .map(|b| b.article_id);
        self.bookmarks.retain(|b| b.id != bookmark_id);
        match article_id {
            Some(article_id) => self.after_mutation(article_id, false, now),
            None => {
                self.mutations += 1;
                self.list_cache.invalidate_tag(BOOKMARKS_TAG);
            }
        }
    }

    fn after_mutation(&mut self, article_id: i64, bookmarked: bool, now: Instant) {
        *self.epochs.entry(article_id).or_insert(0) += 1;
        self.mutations += 1;
        self.list_cache.invalidate_tag(BOOKMARKS_TAG);
        // Replaces whatever status was cached before the mutation.
        self.store_status(article_id, bookmarked, now);
    }

    // ========================================================================
    // List
    // ========================================================================

    /// Show the cached list if any. Returns true if the caller should fetch
    /// `GET /api/bookmarks`.
    pub fn begin_list_load(&mut self, now: Instant) -> bool {
        if self.list_loading {
            return false;
        }
        let key = self.list_key();
        let needs_fetch = match self.list_cache.lookup(&key, now) {
            Lookup::Fresh(list) => {
                self.bookmarks = list;
                false
            }
            Lookup::Stale(list) => {
                self.bookmarks = list;
                true
            }
            Lookup::Miss => true,
        };
        self.list_loading = needs_fetch;
        if needs_fetch {
            self.list_issued_at = self.mutations;
        }
        needs_fetch
    }

    /// Drop the cached list so the next load goes to the server.
    pub fn invalidate_list(&mut self) {
        self.list_cache.invalidate_tag(BOOKMARKS_TAG);
    }

    /// Show a fetched list. Returns false if a mutation landed while it was
    /// in flight; the list is still shown but neither it nor the statuses
    /// it implies are cached.
    pub fn on_list(&mut self, bookmarks: Vec<Bookmark>, now: Instant) -> bool {
        let current = self.list_issued_at == self.mutations;
        if current {
            let key = self.list_key();
            self.list_cache.insert(&key, bookmarks.clone(), self.ttl, now);
            for b in &bookmarks {
                self.store_status(b.article_id, true, now);
            }
        }
        self.bookmarks = bookmarks;
        self.list_loading = false;
        self.list_error = None;
        current
    }

    pub fn on_list_failed(&mut self, err: &ApiError) {
        self.list_loading = false;
        self.list_error = Some(ErrorNotice::from_error(err, Some("Failed to load bookmarks")));
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn is_list_loading(&self) -> bool {
        self.list_loading
    }

    pub fn list_error(&self) -> Option<&ErrorNotice> {
        self.list_error.as_ref()
    }
}

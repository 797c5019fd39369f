use super::controller::{ApplyOutcome, FeedController, PendingFetch};
use crate::api::{ApiError, ArticlePage, ErrorNotice};
use crate::cache::{Lookup, QueryCache};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Freshness window for list and search pages.
pub const DEFAULT_FEED_TTL: Duration = Duration::from_secs(5 * 60);

/// [`FeedController`] backed by the query cache.
///
/// Fresh cache hits are applied immediately and produce no network work.
/// Stale hits are shown at once and still return the fetch so the caller
/// refreshes in the background. Every successful response is cached, even
/// one the controller discards as stale.
#[derive(Debug)]
pub struct FeedStore {
    controller: FeedController,
    cache: QueryCache<ArticlePage>,
    ttl: Duration,
}

impl FeedStore {
    pub fn new(controller: FeedController, ttl: Duration, capacity: NonZeroUsize) -> Self {
        Self {
            controller,
            cache: QueryCache::new(capacity),
            ttl,
        }
    }

    pub fn controller(&self) -> &FeedController {
        &self.controller
    }

    /// Replace the category before the first fetch, e.g. with the one
    /// persisted last run.
    pub fn restore_category(&mut self, category: &str) {
        self.controller = FeedController::with_category(self.controller.page_size(), category);
    }

    pub fn start(&mut self, now: Instant) -> Option<PendingFetch> {
        let fetch = self.controller.start();
        self.route(fetch, now)
    }

    pub fn set_search(&mut self, search: &str, now: Instant) -> Option<PendingFetch> {
        let fetch = self.controller.set_search(search)?;
        self.route(fetch, now)
    }

    pub fn set_category(&mut self, category: &str, now: Instant) -> Option<PendingFetch> {
        let fetch = self.controller.set_category(category)?;
        self.route(fetch, now)
    }

    pub fn load_more(&mut self, now: Instant) -> Option<PendingFetch> {
        let fetch = self.controller.load_more()?;
        self.route(fetch, now)
    }

    /// Explicit refresh always goes to the network.
    pub fn refresh(&mut self) -> PendingFetch {
        self.controller.refresh()
    }

    /// Retry always goes to the network.
    pub fn retry(&mut self) -> Option<PendingFetch> {
        self.controller.retry()
    }

    pub fn dismiss_error(&mut self) {
        self.controller.dismiss_error();
    }

    /// Report the result of a fetch returned earlier.
    pub fn complete(
        &mut self,
        fetch: &PendingFetch,
        result: Result<ArticlePage, ApiError>,
        now: Instant,
    ) -> ApplyOutcome {
        match result {
            Ok(page) => {
                self.cache
                    .insert(&fetch.request.cache_key(), page.clone(), self.ttl, now);
                self.controller.apply(&fetch.key, Ok(page))
            }
            Err(e) => {
                let title = if fetch.request.is_search() {
                    "Search failed"
                } else {
                    "Failed to load articles"
                };
                let notice = ErrorNotice::from_error(&e, Some(title));
                self.controller.apply(&fetch.key, Err(notice))
            }
        }
    }

    /// Drop every cached page, e.g. after the API base changes.
    pub fn invalidate(&mut self) -> usize {
        self.cache.invalidate_tag(super::query::ARTICLES_TAG)
    }

    fn route(&mut self, fetch: PendingFetch, now: Instant) -> Option<PendingFetch> {
        match self.cache.lookup(&fetch.request.cache_key(), now) {
            Lookup::Fresh(page) => {
                tracing::debug!(page = fetch.request.page(), "Feed page served from cache");
                self.controller.apply(&fetch.key, Ok(page));
                None
            }
            Lookup::Stale(page) => {
                tracing::debug!(page = fetch.request.page(), "Showing stale feed page while refreshing");
                self.controller.show_cached(&fetch.key, page);
                Some(fetch)
            }
            Lookup::Miss => Some(fetch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Article;

    fn page(ids: std::ops::Range<i64>, has_next: bool) -> ArticlePage {
        ArticlePage {
            articles: ids
                .map(|id| {
                    serde_json::from_value::<Article>(serde_json::json!({
                        "id": id, "title": "t", "url": "https://e.com"
                    }))
                    .unwrap()
                })
                .collect(),
            total: 10,
            page: 1,
            page_size: 2,
            has_next,
        }
    }

    fn store() -> FeedStore {
        FeedStore::new(
            FeedController::new(2),
            DEFAULT_FEED_TTL,
            NonZeroUsize::new(16).unwrap(),
        )
    }

    #[test]
    fn fresh_hit_skips_network() {
        let mut s = store();
        let t0 = Instant::now();
        let fetch = s.start(t0).unwrap();
        s.complete(&fetch, Ok(page(1..3, true)), t0);

        // Leave and come back to the same query.
        let search = s.set_search("ai", t0).unwrap();
        s.complete(&search, Ok(page(5..7, false)), t0);
        assert_eq!(s.set_search("", t0 + Duration::from_secs(10)), None);
        assert_eq!(s.controller().articles().len(), 2);
        assert_eq!(s.controller().articles()[0].id, 1);
        assert!(!s.controller().is_loading());
    }

    #[test]
    fn stale_hit_shows_data_and_refetches() {
        let mut s = store();
        let t0 = Instant::now();
        let fetch = s.start(t0).unwrap();
        s.complete(&fetch, Ok(page(1..3, true)), t0);
        s.set_search("ai", t0).unwrap();

        let later = t0 + DEFAULT_FEED_TTL + Duration::from_secs(1);
        let refetch = s.set_search("", later).unwrap();
        assert_eq!(s.controller().articles().len(), 2);
        assert!(s.controller().is_loading());

        s.complete(&refetch, Ok(page(3..5, true)), later);
        assert_eq!(s.controller().articles()[0].id, 3);
    }

    #[test]
    fn failure_is_titled_by_mode() {
        let mut s = store();
        let t0 = Instant::now();
        let fetch = s.set_search("ai", t0).unwrap();
        s.complete(
            &fetch,
            Err(ApiError::HttpStatus {
                status: 502,
                detail: None,
            }),
            t0,
        );
        assert_eq!(
            s.controller().error().map(|e| e.title.as_str()),
            Some("Search failed")
        );
    }

    #[test]
    fn refresh_bypasses_cache() {
        let mut s = store();
        let t0 = Instant::now();
        let fetch = s.start(t0).unwrap();
        s.complete(&fetch, Ok(page(1..3, true)), t0);
        let refresh = s.refresh();
        assert_eq!(refresh.key.descriptor.page, 1);
        assert!(s.controller().is_loading());
        assert_eq!(s.invalidate(), 1);
    }
}

use crate::api::{ApiClient, ApiError, ArticleFilter, ArticlePage, ListQuery, SearchQuery};
use crate::cache::CacheKey;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Shortest trimmed search text that is sent to the server.
pub const MIN_SEARCH_LEN: usize = 2;

/// Cache tag for list and search pages.
pub const ARTICLES_TAG: &str = "articles";

/// Maps the UI category to the wire filter: `"all"` (any case) and blank
/// mean no filter.
pub fn normalize_category(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_CATEGORIES) {
        None
    } else {
        Some(trimmed)
    }
}

/// What the feed is currently showing: search text, category and how many
/// pages deep the user has scrolled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryDescriptor {
    pub search: String,
    pub category: String,
    pub page: u32,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
            page: 1,
        }
    }
}

/// The network request a descriptor maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedRequest {
    /// `GET /api/articles`
    List(ListQuery),
    /// `GET /api/search`
    Search(SearchQuery),
}

impl FeedRequest {
    /// Non-empty search text selects search mode; otherwise the plain list.
    pub fn build(descriptor: &QueryDescriptor, page_size: u32) -> Self {
        let filter = ArticleFilter::category(normalize_category(&descriptor.category));
        if descriptor.search.is_empty() {
            FeedRequest::List(ListQuery {
                page: descriptor.page,
                page_size,
                filter,
            })
        } else {
            FeedRequest::Search(SearchQuery {
                q: descriptor.search.clone(),
                page: descriptor.page,
                page_size,
                filter,
            })
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            FeedRequest::List(q) => q.page,
            FeedRequest::Search(q) => q.page,
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, FeedRequest::Search(_))
    }

    /// Cache identity covering every field that reaches the wire.
    pub fn cache_key(&self) -> CacheKey {
        let (mode, q, filter, page, page_size) = match self {
            FeedRequest::List(l) => ("list", "", &l.filter, l.page, l.page_size),
            FeedRequest::Search(s) => ("search", s.q.as_str(), &s.filter, s.page, s.page_size),
        };
        let page = page.to_string();
        let page_size = page_size.to_string();
        let filter_parts: Vec<String> = filter
            .query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        let mut parts = vec![mode, q, page.as_str(), page_size.as_str()];
        parts.extend(filter_parts.iter().map(String::as_str));
        CacheKey::new(ARTICLES_TAG, &parts)
    }

    pub async fn execute(&self, api: &ApiClient) -> Result<ArticlePage, ApiError> {
        match self {
            FeedRequest::List(q) => api.list_articles(q).await,
            FeedRequest::Search(q) => api.search_articles(q).await,
        }
    }
}

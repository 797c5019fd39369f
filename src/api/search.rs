use super::client::ApiClient;
use super::error::ApiError;
use super::types::{ArticleFilter, ArticlePage, PopularSearch, PopularSearches, SearchRequest, Suggestions};

/// Parameters for `GET /api/search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: String,
    pub page: u32,
    pub page_size: u32,
    pub filter: ArticleFilter,
}

impl ApiClient {
    /// `GET /api/search`: full-text search. `q` is sent first, then filters,
    /// then paging.
    pub async fn search_articles(&self, query: &SearchQuery) -> Result<ArticlePage, ApiError> {
        let mut pairs = vec![("q", query.q.clone())];
        pairs.extend(query.filter.query_pairs());
        pairs.push(("page", query.page.to_string()));
        pairs.push(("page_size", query.page_size.to_string()));
        self.get_json(&["api", "search"], &pairs).await
    }

    /// `POST /api/search` with a structured body.
    pub async fn advanced_search(&self, request: &SearchRequest) -> Result<ArticlePage, ApiError> {
        self.post_json(&["api", "search"], &[], Some(request)).await
    }

    /// `GET /api/search/suggestions`
    pub async fn search_suggestions(&self, q: &str, limit: u32) -> Result<Vec<String>, ApiError> {
        let body: Suggestions = self
            .get_json(
                &["api", "search", "suggestions"],
                &[("q", q.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(body.suggestions)
    }

    /// `GET /api/search/popular`
    pub async fn popular_searches(&self, limit: u32) -> Result<Vec<PopularSearch>, ApiError> {
        let body: PopularSearches = self
            .get_json(
                &["api", "search", "popular"],
                &[("limit", limit.to_string())],
            )
            .await?;
        Ok(body.popular_searches)
    }
}

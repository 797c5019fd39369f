use super::client::ApiClient;
use super::error::ApiError;
use super::types::{Article, ArticleFilter, ArticlePage};

/// Parameters for `GET /api/articles`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub filter: ArticleFilter,
}

impl ApiClient {
    /// `GET /api/articles`: newest-first page, optionally filtered.
    pub async fn list_articles(&self, query: &ListQuery) -> Result<ArticlePage, ApiError> {
        let mut pairs = vec![
            ("page", query.page.to_string()),
            ("page_size", query.page_size.to_string()),
        ];
        pairs.extend(query.filter.query_pairs());
        self.get_json(&["api", "articles"], &pairs).await
    }

    /// `GET /api/articles/{id}`
    pub async fn get_article(&self, id: i64) -> Result<Article, ApiError> {
        self.get_json(&["api", "articles", id.to_string().as_str()], &[]).await
    }

    /// `GET /api/articles/category/{category}`
    pub async fn articles_by_category(
        &self,
        category: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ArticlePage, ApiError> {
        self.get_json(
            &["api", "articles", "category", category],
            &[("page", page.to_string()), ("page_size", page_size.to_string())],
        )
        .await
    }

    /// `GET /api/articles/recent/{hours}`
    pub async fn recent_articles(
        &self,
        hours: u32,
        page: u32,
        page_size: u32,
    ) -> Result<ArticlePage, ApiError> {
        self.get_json(
            &["api", "articles", "recent", hours.to_string().as_str()],
            &[("page", page.to_string()), ("page_size", page_size.to_string())],
        )
        .await
    }
}

use super::client::ApiClient;
use super::error::ApiError;
use super::types::{Bookmark, BookmarkStatus, MessageResponse, NewBookmark};
use crate::session::SessionIdentity;

impl ApiClient {
    /// `POST /api/bookmarks`
    pub async fn create_bookmark(
        &self,
        article_id: i64,
        user: &SessionIdentity,
    ) -> Result<Bookmark, ApiError> {
        let body = NewBookmark {
            article_id,
            user_id: user.as_str(),
        };
        self.post_json(&["api", "bookmarks"], &[], Some(&body)).await
    }

    /// `GET /api/bookmarks`, newest first.
    pub async fn bookmarks(
        &self,
        user: &SessionIdentity,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Bookmark>, ApiError> {
        self.get_json(
            &["api", "bookmarks"],
            &[
                ("user_id", user.as_str().to_string()),
                ("skip", skip.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// `DELETE /api/bookmarks/{id}`
    pub async fn delete_bookmark(
        &self,
        bookmark_id: i64,
        user: &SessionIdentity,
    ) -> Result<MessageResponse, ApiError> {
        self.delete_json(
            &["api", "bookmarks", bookmark_id.to_string().as_str()],
            &[("user_id", user.as_str().to_string())],
        )
        .await
    }

    /// `DELETE /api/bookmarks/article/{articleId}`
    pub async fn delete_bookmark_for_article(
        &self,
        article_id: i64,
        user: &SessionIdentity,
    ) -> Result<MessageResponse, ApiError> {
        self.delete_json(
            &["api", "bookmarks", "article", article_id.to_string().as_str()],
            &[("user_id", user.as_str().to_string())],
        )
        .await
    }

    /// `GET /api/bookmarks/check/{articleId}`
    pub async fn is_bookmarked(
        &self,
        article_id: i64,
        user: &SessionIdentity,
    ) -> Result<bool, ApiError> {
        let status: BookmarkStatus = self
            .get_json(
                &["api", "bookmarks", "check", article_id.to_string().as_str()],
                &[("user_id", user.as_str().to_string())],
            )
            .await?;
        Ok(status.is_bookmarked)
    }
}

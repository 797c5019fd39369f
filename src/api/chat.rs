use super::client::ApiClient;
use super::error::ApiError;
use super::types::{ArticleSummary, ArticleTopics, ChatReply, ChatRequest, ChatTurn, MessageResponse};
use crate::session::SessionIdentity;

impl ApiClient {
    /// `POST /api/chat`
    pub async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.post_json(&["api", "chat"], &[], Some(request)).await
    }

    /// `POST /api/chat/summarize/{articleId}`
    pub async fn summarize_article(&self, article_id: i64) -> Result<ArticleSummary, ApiError> {
        self.post_json::<(), _>(
            &["api", "chat", "summarize", article_id.to_string().as_str()],
            &[],
            None,
        )
        .await
    }

    /// `GET /api/chat/history/{userId}`, oldest turn first.
    pub async fn chat_history(
        &self,
        user: &SessionIdentity,
        limit: u32,
    ) -> Result<Vec<ChatTurn>, ApiError> {
        self.get_json(
            &["api", "chat", "history", user.as_str()],
            &[("limit", limit.to_string())],
        )
        .await
    }

    /// `DELETE /api/chat/history/{userId}`
    pub async fn clear_chat_history(
        &self,
        user: &SessionIdentity,
    ) -> Result<MessageResponse, ApiError> {
        self.delete_json(&["api", "chat", "history", user.as_str()], &[])
            .await
    }

    /// `GET /api/chat/topics/{articleId}`
    pub async fn article_topics(&self, article_id: i64) -> Result<ArticleTopics, ApiError> {
        self.get_json(&["api", "chat", "topics", article_id.to_string().as_str()], &[])
            .await
    }
}

use super::client::ApiClient;
use super::error::ApiError;
use super::types::{CategoryCount, SentimentShare, SourceCount, TimelinePoint, TrendingTopic};

impl ApiClient {
    /// `GET /api/trending/topics`
    pub async fn trending_topics(
        &self,
        hours: u32,
        limit: u32,
    ) -> Result<Vec<TrendingTopic>, ApiError> {
        self.get_json(
            &["api", "trending", "topics"],
            &[("hours", hours.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// `GET /api/trending/categories`
    pub async fn trending_categories(&self, hours: u32) -> Result<Vec<CategoryCount>, ApiError> {
        self.get_json(
            &["api", "trending", "categories"],
            &[("hours", hours.to_string())],
        )
        .await
    }

    /// `GET /api/trending/sources`
    pub async fn trending_sources(&self, hours: u32) -> Result<Vec<SourceCount>, ApiError> {
        self.get_json(
            &["api", "trending", "sources"],
            &[("hours", hours.to_string())],
        )
        .await
    }

    /// `GET /api/trending/sentiment`
    pub async fn sentiment_trends(&self, hours: u32) -> Result<Vec<SentimentShare>, ApiError> {
        self.get_json(
            &["api", "trending", "sentiment"],
            &[("hours", hours.to_string())],
        )
        .await
    }

    /// `GET /api/trending/timeline`
    pub async fn trending_timeline(
        &self,
        hours: u32,
        interval_hours: u32,
    ) -> Result<Vec<TimelinePoint>, ApiError> {
        self.get_json(
            &["api", "trending", "timeline"],
            &[
                ("hours", hours.to_string()),
                ("interval_hours", interval_hours.to_string()),
            ],
        )
        .await
    }
}

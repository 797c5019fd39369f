//! Wire types for the TechFlow REST API.
//!
//! Field names follow the service's JSON. Timestamps stay as strings on the
//! wire and are parsed on demand with [`crate::util::parse_timestamp`],
//! because the service mixes naive and offset ISO-8601 forms.

use crate::util::{normalize_image_url, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Articles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }
}

/// Unknown sentiment labels are treated as absent instead of failing the
/// whole page.
fn lenient_sentiment<'de, D>(deserializer: D) -> Result<Option<Sentiment>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Sentiment::parse))
}

fn image_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(normalize_image_url(raw.as_deref()))
}

/// A news article. Immutable from the client's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_sentiment")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, deserialize_with = "image_url")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Article {
    /// Publication time, falling back to the ingestion time.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published_at
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| parse_timestamp(&self.created_at))
    }

    /// Text for the reader: full content when present, else the summary.
    pub fn body(&self) -> Option<&str> {
        self.content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| self.summary.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

/// One page of a list or search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlePage {
    #[serde(alias = "items")]
    pub articles: Vec<Article>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_next: bool,
}

/// Optional filters shared by `GET /api/articles` and `GET /api/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

impl ArticleFilter {
    pub fn category(category: Option<&str>) -> Self {
        Self {
            category: category.map(str::to_string),
            ..Self::default()
        }
    }

    /// Query pairs for the filter, skipping unset fields.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(c) = &self.category {
            pairs.push(("category", c.clone()));
        }
        if let Some(s) = &self.source {
            pairs.push(("source", s.clone()));
        }
        if let Some(s) = self.sentiment {
            pairs.push(("sentiment", s.as_str().to_string()));
        }
        if let Some(d) = &self.date_from {
            pairs.push(("date_from", d.clone()));
        }
        if let Some(d) = &self.date_to {
            pairs.push(("date_to", d.clone()));
        }
        pairs
    }
}

/// Body of `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<ArticleFilter>,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopularSearch {
    pub term: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Suggestions {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PopularSearches {
    pub popular_searches: Vec<PopularSearch>,
}

// ============================================================================
// Chat
// ============================================================================

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub article_context: Option<Article>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

/// One persisted exchange in a user's chat history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatTurn {
    pub id: i64,
    pub message: String,
    pub response: String,
    #[serde(default)]
    pub article_id: Option<i64>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleTopics {
    pub article_id: i64,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleSummary {
    pub article_id: i64,
    pub summary: String,
}

// ============================================================================
// Bookmarks
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub article_id: i64,
    pub article: Article,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewBookmark<'a> {
    pub article_id: i64,
    pub user_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BookmarkStatus {
    pub is_bookmarked: bool,
}

/// `{message}` acknowledgement returned by delete endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Trending
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrendingTopic {
    pub topic: String,
    pub count: u64,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceCount {
    pub source: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SentimentShare {
    pub sentiment: String,
    pub count: u64,
    #[serde(default)]
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimelinePoint {
    pub timestamp: String,
    pub count: u64,
    #[serde(default)]
    pub top_categories: BTreeMap<String, u64>,
}

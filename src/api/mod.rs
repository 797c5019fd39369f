//! Remote data gateway for the TechFlow REST API.
//!
//! [`ApiClient`] owns a single `reqwest::Client` and exposes one async
//! method per endpoint. Every call:
//! - resolves its path under the configured base URL,
//! - is bounded by the request timeout and a 5 MB body cap,
//! - maps failures into [`ApiError`] so callers can decide on retry
//!   ([`ApiError::is_retryable`]) and presentation ([`ErrorNotice`]).
//!
//! Retries are not applied here; callers wrap calls in [`with_retry`] with
//! the policy that fits the query.

mod articles;
mod bookmarks;
mod chat;
mod client;
mod error;
mod search;
mod trending;
mod types;

pub use articles::ListQuery;
pub use client::{with_retry, ApiClient, RetryPolicy, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{
    ApiError, ErrorKind, ErrorNotice, AI_UNAVAILABLE_MESSAGE, CHAT_SEND_FAILED_MESSAGE,
    CONNECTION_HINTS,
};
pub use search::SearchQuery;
pub use types::{
    Article, ArticleFilter, ArticlePage, ArticleSummary, ArticleTopics, Bookmark, CategoryCount,
    ChatReply, ChatRequest, ChatTurn, MessageResponse, PopularSearch, SearchRequest, Sentiment,
    SentimentShare, SourceCount, TimelinePoint, TrendingTopic,
};

//! Trending data: a compact summary for the sidebar and a detail view.

use crate::api::{
    ApiClient, ApiError, CategoryCount, ErrorNotice, SentimentShare, SourceCount, TimelinePoint,
    TrendingTopic,
};
use crate::cache::{CacheKey, Lookup, QueryCache};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Look-back window, in hours.
pub const DEFAULT_TRENDING_HOURS: u32 = 168;
pub const DEFAULT_TRENDING_TTL: Duration = Duration::from_secs(15 * 60);
pub const TIMELINE_INTERVAL_HOURS: u32 = 24;

/// Topics requested for the sidebar.
pub const TOPICS_LIMIT: u32 = 8;
pub const SIDEBAR_TOPICS: usize = 6;
pub const SIDEBAR_CATEGORIES: usize = 5;

const TRENDING_TAG: &str = "trending";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendingSummary {
    pub topics: Vec<TrendingTopic>,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendingDetail {
    pub sources: Vec<SourceCount>,
    pub sentiment: Vec<SentimentShare>,
    pub timeline: Vec<TimelinePoint>,
}

/// Topics and categories, fetched concurrently.
pub async fn fetch_summary(api: &ApiClient, hours: u32) -> Result<TrendingSummary, ApiError> {
    let (topics, categories) = tokio::try_join!(
        api.trending_topics(hours, TOPICS_LIMIT),
        api.trending_categories(hours)
    )?;
    Ok(TrendingSummary { topics, categories })
}

pub async fn fetch_detail(api: &ApiClient, hours: u32) -> Result<TrendingDetail, ApiError> {
    let (sources, sentiment, timeline) = tokio::try_join!(
        api.trending_sources(hours),
        api.sentiment_trends(hours),
        api.trending_timeline(hours, TIMELINE_INTERVAL_HOURS)
    )?;
    Ok(TrendingDetail {
        sources,
        sentiment,
        timeline,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendingPart {
    Summary,
    Detail,
}

/// One cached section with its load and error state.
#[derive(Debug)]
struct Section<T> {
    data: Option<T>,
    loading: bool,
    error: Option<ErrorNotice>,
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

#[derive(Debug)]
pub struct TrendingState {
    hours: u32,
    ttl: Duration,
    summary: Section<TrendingSummary>,
    detail: Section<TrendingDetail>,
    summary_cache: QueryCache<TrendingSummary>,
    detail_cache: QueryCache<TrendingDetail>,
}

impl TrendingState {
    pub fn new(hours: u32, ttl: Duration) -> Self {
        Self {
            hours,
            ttl,
            summary: Section::default(),
            detail: Section::default(),
            summary_cache: QueryCache::new(NonZeroUsize::MIN),
            detail_cache: QueryCache::new(NonZeroUsize::MIN),
        }
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    fn key(&self, part: TrendingPart) -> CacheKey {
        let part = match part {
            TrendingPart::Summary => "summary",
            TrendingPart::Detail => "detail",
        };
        CacheKey::new(TRENDING_TAG, &[part, self.hours.to_string().as_str()])
    }

    /// Show cached data for `part`; returns true if a fetch is needed.
    /// `force` skips the cache (manual retry or refresh).
    pub fn begin(&mut self, part: TrendingPart, now: Instant, force: bool) -> bool {
        let key = self.key(part);
        match part {
            TrendingPart::Summary => {
                begin_section(&mut self.summary, &mut self.summary_cache, &key, now, force)
            }
            TrendingPart::Detail => {
                begin_section(&mut self.detail, &mut self.detail_cache, &key, now, force)
            }
        }
    }

    pub fn on_summary(&mut self, result: Result<TrendingSummary, ApiError>, now: Instant) {
        let key = self.key(TrendingPart::Summary);
        finish_section(&mut self.summary, &mut self.summary_cache, &key, self.ttl, result, now);
    }

    pub fn on_detail(&mut self, result: Result<TrendingDetail, ApiError>, now: Instant) {
        let key = self.key(TrendingPart::Detail);
        finish_section(&mut self.detail, &mut self.detail_cache, &key, self.ttl, result, now);
    }

    /// Up to six topics for the sidebar.
    pub fn top_topics(&self) -> &[TrendingTopic] {
        self.summary
            .data
            .as_ref()
            .map_or(&[][..], |s| &s.topics[..s.topics.len().min(SIDEBAR_TOPICS)])
    }

    /// Up to five categories for the sidebar.
    pub fn top_categories(&self) -> &[CategoryCount] {
        self.summary.data.as_ref().map_or(&[][..], |s| {
            &s.categories[..s.categories.len().min(SIDEBAR_CATEGORIES)]
        })
    }

    pub fn summary(&self) -> Option<&TrendingSummary> {
        self.summary.data.as_ref()
    }

    pub fn detail(&self) -> Option<&TrendingDetail> {
        self.detail.data.as_ref()
    }

    pub fn is_loading(&self, part: TrendingPart) -> bool {
        match part {
            TrendingPart::Summary => self.summary.loading,
            TrendingPart::Detail => self.detail.loading,
        }
    }

    pub fn error(&self, part: TrendingPart) -> Option<&ErrorNotice> {
        match part {
            TrendingPart::Summary => self.summary.error.as_ref(),
            TrendingPart::Detail => self.detail.error.as_ref(),
        }
    }
}

fn begin_section<T: Clone>(
    section: &mut Section<T>,
    cache: &mut QueryCache<T>,
    key: &CacheKey,
    now: Instant,
    force: bool,
) -> bool {
    if section.loading {
        return false;
    }
    let needs_fetch = match cache.lookup(key, now) {
        Lookup::Fresh(data) => {
            section.data = Some(data);
            force
        }
        Lookup::Stale(data) => {
            section.data = Some(data);
            true
        }
        Lookup::Miss => true,
    };
    section.loading = needs_fetch;
    needs_fetch
}

fn finish_section<T: Clone>(
    section: &mut Section<T>,
    cache: &mut QueryCache<T>,
    key: &CacheKey,
    ttl: Duration,
    result: Result<T, ApiError>,
    now: Instant,
) {
    section.loading = false;
    match result {
        Ok(data) => {
            cache.insert(key, data.clone(), ttl, now);
            section.data = Some(data);
            section.error = None;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Trending request failed");
            section.error = Some(ErrorNotice::from_error(&e, Some("Failed to load trends")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(topics: usize, categories: usize) -> TrendingSummary {
        TrendingSummary {
            topics: (0..topics)
                .map(|i| TrendingTopic {
                    topic: format!("topic-{i}"),
                    count: 10 - i as u64,
                    score: 1.0,
                    articles: Vec::new(),
                })
                .collect(),
            categories: (0..categories)
                .map(|i| CategoryCount {
                    category: format!("cat-{i}"),
                    count: i as u64,
                })
                .collect(),
        }
    }

    #[test]
    fn sidebar_truncates() {
        let mut t = TrendingState::new(DEFAULT_TRENDING_HOURS, DEFAULT_TRENDING_TTL);
        let now = Instant::now();
        assert!(t.top_topics().is_empty());
        assert!(t.begin(TrendingPart::Summary, now, false));
        t.on_summary(Ok(summary(8, 9)), now);
        assert_eq!(t.top_topics().len(), 6);
        assert_eq!(t.top_categories().len(), 5);

        t.on_summary(Ok(summary(2, 1)), now);
        assert_eq!(t.top_topics().len(), 2);
    }

    #[test]
    fn cached_for_fifteen_minutes() {
        let mut t = TrendingState::new(DEFAULT_TRENDING_HOURS, DEFAULT_TRENDING_TTL);
        let now = Instant::now();
        assert!(t.begin(TrendingPart::Summary, now, false));
        assert!(!t.begin(TrendingPart::Summary, now, false));
        t.on_summary(Ok(summary(3, 3)), now);
        assert!(!t.begin(TrendingPart::Summary, now + Duration::from_secs(60), false));
        assert!(t.begin(TrendingPart::Summary, now + Duration::from_secs(60), true));
        t.on_summary(Ok(summary(3, 3)), now);
        assert!(t.begin(TrendingPart::Summary, now + DEFAULT_TRENDING_TTL, false));
    }

    #[test]
    fn error_keeps_previous_data() {
        let mut t = TrendingState::new(DEFAULT_TRENDING_HOURS, DEFAULT_TRENDING_TTL);
        let now = Instant::now();
        t.begin(TrendingPart::Summary, now, false);
        t.on_summary(Ok(summary(3, 3)), now);
        t.begin(TrendingPart::Summary, now, true);
        t.on_summary(Err(ApiError::Timeout(10)), now);
        assert_eq!(t.top_topics().len(), 3);
        assert_eq!(
            t.error(TrendingPart::Summary).map(|e| e.title.as_str()),
            Some("Connection Error")
        );
        assert!(!t.is_loading(TrendingPart::Summary));
        assert!(t.error(TrendingPart::Detail).is_none());
    }
}

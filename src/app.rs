use crate::api::{
    ApiClient, ApiError, Article, ArticlePage, ArticleSummary, ArticleTopics, Bookmark, ChatReply,
    ChatTurn, ErrorNotice, MessageResponse, RetryPolicy,
};
use crate::bookmarks::BookmarkBook;
use crate::chat::ChatPanel;
use crate::config::Config;
use crate::feed::{FeedController, FeedStore, PendingFetch, SearchDebouncer};
use crate::keybindings::{Context, KeybindingRegistry};
use crate::session::SessionIdentity;
use crate::storage::Database;
use crate::strip::{default_categories, CategoryStrip};
use crate::theme::{ColorPalette, ThemeVariant};
use crate::trending::{TrendingDetail, TrendingState, TrendingSummary};
use ratatui::layout::Rect;
use ratatui::text::Line;
use std::borrow::Cow;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

/// Maximum scroll offset for the reader view (ratatui u16 limit).
pub const MAX_SCROLL: usize = u16::MAX as usize;

/// Status messages disappear after this long.
pub const STATUS_TTL: Duration = Duration::from_secs(3);

/// Local state keys for persisted UI preferences.
pub const THEME_PREF_KEY: &str = "ui.theme";
pub const CATEGORY_PREF_KEY: &str = "ui.category";

// ============================================================================
// View and Focus Enums
// ============================================================================

/// Current view mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Feed,      // Search bar, category strip, articles and sidebar
    Reader,    // Full-screen article reader
    Bookmarks, // Saved articles
    Trending,  // Full trending dashboard
}

/// Which panel has focus in the Feed view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Categories,
    Articles,
    Chat,
}

// ============================================================================
// Content and Event Types
// ============================================================================

/// Content loading state for the article reader.
#[derive(Debug, Clone)]
pub enum ContentState {
    Idle,
    Loading {
        article_id: i64,
    },
    Loaded {
        article_id: i64,
        /// Markdown source, kept so a theme change can restyle it.
        body: String,
        rendered_lines: Vec<Line<'static>>,
    },
    Failed {
        article_id: i64,
        notice: ErrorNotice,
    },
}

/// AI summary shown at the top of the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryState {
    Idle,
    Loading { article_id: i64 },
    Ready { article_id: i64, text: String },
    Failed { article_id: i64, message: String },
}

/// Events from background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A feed page request finished. Carries the fetch so the store can
    /// check its key against the current one.
    FeedPageLoaded {
        fetch: PendingFetch,
        result: Result<ArticlePage, ApiError>,
    },
    /// `GET /api/articles/{id}` for the reader.
    ArticleLoaded {
        article_id: i64,
        generation: u64,
        result: Result<Article, ApiError>,
    },
    ChatHistoryLoaded(Result<Vec<ChatTurn>, ApiError>),
    ChatReplied(Result<ChatReply, ApiError>),
    ChatCleared(Result<MessageResponse, ApiError>),
    ArticleTopicsLoaded(Result<ArticleTopics, ApiError>),
    SummaryLoaded {
        article_id: i64,
        result: Result<ArticleSummary, ApiError>,
    },
    BookmarkStatusLoaded {
        article_id: i64,
        /// Mutation epoch of the article when the check was issued.
        epoch: u64,
        result: Result<bool, ApiError>,
    },
    BookmarkToggled {
        article_id: i64,
        result: Result<bool, ApiError>,
    },
    BookmarksLoaded(Result<Vec<Bookmark>, ApiError>),
    BookmarkRemoved {
        bookmark_id: i64,
        result: Result<MessageResponse, ApiError>,
    },
    TrendingLoaded(Result<TrendingSummary, ApiError>),
    TrendingDetailLoaded(Result<TrendingDetail, ApiError>),
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "feed_page", "chat_send")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub api: ApiClient,
    pub db: Database,
    pub session: SessionIdentity,
    pub retry: RetryPolicy,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: ColorPalette,

    /// Keybinding registry for action-key mapping with config overrides.
    pub keybindings: KeybindingRegistry,

    // Feature state
    pub feed: FeedStore,
    pub strip: CategoryStrip,
    pub debouncer: SearchDebouncer,
    pub chat: ChatPanel,
    pub bookmarks: BookmarkBook,
    pub trending: TrendingState,

    /// Known bookmark status per article id, for list markers.
    pub bookmark_marks: HashMap<i64, bool>,

    // UI State
    pub view: View,
    pub focus: Focus,
    pub selected_article: usize,
    /// First visible row of the article list, written back by the renderer.
    pub article_offset: usize,
    pub selected_bookmark: usize,
    pub scroll_offset: usize,

    // Search
    pub search_mode: bool,
    pub search_input: String,

    // Reader
    pub content_state: ContentState,
    pub reader_article: Option<Article>,
    /// View the reader returns to on exit.
    pub reader_origin: View,
    pub summary: SummaryState,
    /// Generation counter for reader loads; responses for older
    /// generations are dropped.
    pub content_load_generation: u64,
    /// Last known reader viewport size (visible lines), without borders.
    pub reader_visible_lines: usize,
    /// Last known reader viewport width, without borders.
    pub reader_viewport_width: usize,
    /// Cached (viewport_width, wrapped content lines).
    pub reader_cached_line_count: Option<(usize, usize)>,

    // Chat
    pub chat_scroll: usize,
    pub chat_visible_lines: usize,

    // Mouse hit areas, recorded during render
    pub strip_area: Rect,
    pub articles_area: Rect,

    // Status message with expiry; Cow avoids allocation for static literals
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,

    /// Current frame of the loading spinner animation.
    pub spinner_frame: usize,

    /// Whether the help overlay is currently displayed.
    pub show_help: bool,
    /// Scroll offset in the help screen for long keybinding lists.
    pub help_scroll_offset: usize,

    // Background task handles, aborted when superseded
    pub feed_handle: Option<tokio::task::JoinHandle<()>>,
    pub content_load_handle: Option<tokio::task::JoinHandle<()>>,
    pub chat_handle: Option<tokio::task::JoinHandle<()>>,
}

impl App {
    pub fn new(api: ApiClient, db: Database, session: SessionIdentity, config: &Config) -> Self {
        let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or(ThemeVariant::Dark);
        let capacity = config.cache_capacity();
        let controller = FeedController::new(config.page_size);

        Self {
            api,
            db,
            bookmarks: BookmarkBook::new(session.clone(), config.bookmarks_ttl(), capacity),
            session,
            retry: config.retry_policy(),
            theme_variant,
            theme: theme_variant.palette(),
            keybindings: KeybindingRegistry::new(),
            feed: FeedStore::new(controller, config.feed_ttl(), capacity),
            strip: CategoryStrip::new(default_categories()),
            debouncer: SearchDebouncer::new(config.search_debounce()),
            chat: ChatPanel::new(),
            trending: TrendingState::new(config.trending_hours, config.trending_ttl()),
            bookmark_marks: HashMap::new(),
            view: View::Feed,
            focus: Focus::Articles,
            selected_article: 0,
            article_offset: 0,
            selected_bookmark: 0,
            scroll_offset: 0,
            search_mode: false,
            search_input: String::new(),
            content_state: ContentState::Idle,
            reader_article: None,
            reader_origin: View::Feed,
            summary: SummaryState::Idle,
            content_load_generation: 0,
            reader_visible_lines: 0,
            reader_viewport_width: 0,
            reader_cached_line_count: None,
            chat_scroll: 0,
            chat_visible_lines: 0,
            strip_area: Rect::default(),
            articles_area: Rect::default(),
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
            show_help: false,
            help_scroll_offset: 0,
            feed_handle: None,
            content_load_handle: None,
            chat_handle: None,
        }
    }

    /// Switch to a different theme variant at runtime.
    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = variant.palette();
        if let ContentState::Loaded {
            body,
            rendered_lines,
            ..
        } = &mut self.content_state
        {
            *rendered_lines = crate::ui::reader::render_markdown(body, &self.theme);
        }
        self.reader_cached_line_count = None;
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant (Dark → Light → Dark).
    ///
    /// Returns the name of the new theme for status display.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    /// Select a persisted category on the strip and in the feed. Only
    /// meaningful before the initial load; unknown values are ignored.
    pub fn restore_category(&mut self, category: &str) -> bool {
        if !self.strip.select_value(category) {
            return false;
        }
        let value = self.strip.selected_value().to_string();
        self.feed.restore_category(&value);
        true
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn articles(&self) -> &[Article] {
        self.feed.controller().articles()
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.articles().get(self.selected_article)
    }

    pub fn selected_bookmark(&self) -> Option<&Bookmark> {
        self.bookmarks.bookmarks().get(self.selected_bookmark)
    }

    /// The article that article-level actions (bookmark, open, chat) target
    /// in the current view.
    pub fn focused_article(&self) -> Option<&Article> {
        match self.view {
            View::Reader => self.reader_article.as_ref(),
            View::Bookmarks => self.selected_bookmark().map(|b| &b.article),
            View::Feed | View::Trending => self.selected_article(),
        }
    }

    /// Keep selection indices inside their lists.
    pub fn clamp_selections(&mut self) {
        let articles = self.articles().len();
        self.selected_article = self.selected_article.min(articles.saturating_sub(1));
        let bookmarks = self.bookmarks.bookmarks().len();
        self.selected_bookmark = self.selected_bookmark.min(bookmarks.saturating_sub(1));
    }

    /// Move the selection down. Returns true if it moved.
    pub fn nav_down(&mut self) -> bool {
        let (selected, len) = match self.view {
            View::Bookmarks => (&mut self.selected_bookmark, self.bookmarks.bookmarks().len()),
            _ => (&mut self.selected_article, self.feed.controller().articles().len()),
        };
        if *selected + 1 < len {
            *selected += 1;
            true
        } else {
            false
        }
    }

    /// Move the selection up. Returns true if it moved.
    pub fn nav_up(&mut self) -> bool {
        let selected = match self.view {
            View::Bookmarks => &mut self.selected_bookmark,
            _ => &mut self.selected_article,
        };
        if *selected > 0 {
            *selected -= 1;
            true
        } else {
            false
        }
    }

    /// True when the selection sits on the last loaded article.
    pub fn at_list_end(&self) -> bool {
        let len = self.articles().len();
        len > 0 && self.selected_article + 1 >= len
    }

    /// Cycle focus in the Feed view: Articles → Categories → Chat (when
    /// open) → Articles.
    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Articles => Focus::Categories,
            Focus::Categories if self.chat.is_open() => Focus::Chat,
            Focus::Categories | Focus::Chat => Focus::Articles,
        };
    }

    /// Keybinding context for the current view, focus and mode.
    pub fn context(&self) -> Context {
        if self.search_mode {
            return Context::Search;
        }
        match self.view {
            View::Reader => Context::Reader,
            View::Bookmarks => Context::Bookmarks,
            View::Trending => Context::Trending,
            View::Feed => match self.focus {
                Focus::Categories => Context::Categories,
                Focus::Articles => Context::ArticleList,
                Focus::Chat => Context::Chat,
            },
        }
    }

    // ========================================================================
    // Reader
    // ========================================================================

    /// Enter reader view for `article`. Returns the load generation the
    /// caller tags its fetch with.
    pub fn enter_reader(&mut self, article: Article) -> u64 {
        self.content_load_generation = self.content_load_generation.wrapping_add(1);
        if self.view != View::Reader {
            self.reader_origin = self.view;
        }
        self.view = View::Reader;
        self.scroll_offset = 0;
        self.content_state = ContentState::Loading {
            article_id: article.id,
        };
        if !matches!(&self.summary, SummaryState::Ready { article_id, .. } if *article_id == article.id)
        {
            self.summary = SummaryState::Idle;
        }
        self.reader_article = Some(article);
        self.reader_cached_line_count = None;
        self.content_load_generation
    }

    /// Exit reader view back to the view it was opened from.
    pub fn exit_reader(&mut self) {
        if let Some(handle) = self.content_load_handle.take() {
            handle.abort();
            tracing::debug!("Aborted content load task on reader exit");
        }
        self.view = self.reader_origin;
        self.content_state = ContentState::Idle;
        self.scroll_offset = 0;
        self.reader_article = None;
        self.reader_cached_line_count = None;
    }

    /// Install the fetched article body (or summary) as reader content.
    pub fn show_article_content(&mut self, article: Article) {
        let body = article
            .body()
            .map(str::to_string)
            .unwrap_or_else(|| "_No content available for this article._".to_string());
        let rendered_lines = crate::ui::reader::render_markdown(&body, &self.theme);
        self.content_state = ContentState::Loaded {
            article_id: article.id,
            body,
            rendered_lines,
        };
        self.reader_article = Some(article);
        self.reader_cached_line_count = None;
    }

    /// Lines the reader header occupies: title, metadata, blank line, plus
    /// the summary block when present.
    pub fn reader_header_lines(&self) -> usize {
        let width = self.reader_viewport_width.max(1);
        let summary = match &self.summary {
            SummaryState::Ready { text, .. } => {
                2 + text
                    .lines()
                    .map(|l| l.width().max(1).div_ceil(width))
                    .sum::<usize>()
            }
            SummaryState::Loading { .. } | SummaryState::Failed { .. } => 2,
            SummaryState::Idle => 0,
        };
        3 + summary
    }

    /// Total reader lines after wrapping at the current viewport width.
    pub fn reader_content_lines(&self) -> usize {
        let width = self.reader_viewport_width.max(1);
        if let Some((cached_width, cached_count)) = self.reader_cached_line_count {
            if cached_width == width {
                return self.reader_header_lines() + cached_count;
            }
        }
        self.reader_header_lines() + self.count_content_lines(width)
    }

    fn count_content_lines(&self, width: usize) -> usize {
        match &self.content_state {
            ContentState::Idle | ContentState::Loading { .. } => 1,
            ContentState::Loaded { rendered_lines, .. } => rendered_lines
                .iter()
                .map(|line| wrapped_line_count(line, width))
                .sum(),
            ContentState::Failed { notice, .. } => {
                2 + notice.description.width().max(1).div_ceil(width) + notice.hints.len()
            }
        }
    }

    /// Compute and cache the content line count for the current viewport.
    pub fn cache_reader_line_count(&mut self) {
        let width = self.reader_viewport_width.max(1);
        let content_lines = self.count_content_lines(width);
        self.reader_cached_line_count = Some((width, content_lines));
    }

    /// Clamp the reader scroll offset to content bounds.
    pub fn clamp_reader_scroll(&mut self) {
        self.cache_reader_line_count();
        let max = self
            .reader_content_lines()
            .saturating_sub(self.reader_visible_lines)
            .min(MAX_SCROLL);
        self.scroll_offset = self.scroll_offset.min(max);
    }

    pub fn scroll_reader(&mut self, delta: isize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
        self.clamp_reader_scroll();
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message if it has expired.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self, now: Instant) -> bool {
        if let Some((_, time)) = &self.status_message {
            if now.saturating_duration_since(*time) >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

/// How many display lines a single Line occupies after wrapping.
pub(crate) fn wrapped_line_count(line: &Line<'_>, viewport_width: usize) -> usize {
    let width = viewport_width.max(1);
    let line_width: usize = line.spans.iter().map(|s| s.content.width()).sum();
    if line_width == 0 {
        1
    } else {
        line_width.div_ceil(width)
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

/// Abort all in-flight tasks on App drop so none outlive the event loop.
impl Drop for App {
    fn drop(&mut self) {
        for handle in [
            self.feed_handle.take(),
            self.content_load_handle.take(),
            self.chat_handle.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DEFAULT_TIMEOUT;
    use crate::feed::RequestKey;

    async fn test_app() -> App {
        let db = Database::open(":memory:").await.unwrap();
        let api = ApiClient::new("http://localhost:8000", DEFAULT_TIMEOUT).unwrap();
        let session = SessionIdentity::parse("user_abc123def_loyw3v28").unwrap();
        App::new(api, db, session, &Config::default())
    }

    fn article(id: i64) -> Article {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Article {id}"),
            "url": format!("https://example.com/{id}"),
            "content": "# Heading\n\nBody text."
        }))
        .unwrap()
    }

    fn load_page(app: &mut App, ids: &[i64], has_next: bool) {
        let fetch = app.feed.refresh();
        let page = ArticlePage {
            articles: ids.iter().copied().map(article).collect(),
            total: ids.len() as u64,
            page: 1,
            page_size: 20,
            has_next,
        };
        app.feed.complete(&fetch, Ok(page), Instant::now());
    }

    #[tokio::test]
    async fn test_restore_category_updates_strip_and_feed() {
        let mut app = test_app().await;
        assert!(app.restore_category("learning"));
        assert_eq!(app.strip.selected_value(), "Learning");
        assert_eq!(app.feed.controller().category(), "Learning");
        assert!(!app.restore_category("Gardening"));
        assert_eq!(app.feed.controller().category(), "Learning");
    }

    #[tokio::test]
    async fn test_nav_empty_list() {
        let mut app = test_app().await;
        assert!(app.selected_article().is_none());
        assert!(!app.nav_down());
        assert!(!app.nav_up());
        assert!(!app.at_list_end());
    }

    #[tokio::test]
    async fn test_nav_bounds_and_list_end() {
        let mut app = test_app().await;
        load_page(&mut app, &[1, 2, 3], true);
        assert!(app.nav_down());
        assert!(app.nav_down());
        assert!(!app.nav_down());
        assert!(app.at_list_end());
        assert_eq!(app.selected_article().map(|a| a.id), Some(3));
        assert!(app.nav_up());
        assert_eq!(app.selected_article, 1);
    }

    #[tokio::test]
    async fn test_clamp_after_list_shrinks() {
        let mut app = test_app().await;
        load_page(&mut app, &[1, 2, 3], false);
        app.selected_article = 2;
        load_page(&mut app, &[9], false);
        app.clamp_selections();
        assert_eq!(app.selected_article, 0);
    }

    #[tokio::test]
    async fn test_cycle_focus_skips_closed_chat() {
        let mut app = test_app().await;
        assert_eq!(app.focus, Focus::Articles);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Categories);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Articles);

        app.chat.open_for(None);
        app.cycle_focus();
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Chat);
        assert_eq!(app.context(), Context::Chat);
    }

    #[tokio::test]
    async fn test_context_follows_mode() {
        let mut app = test_app().await;
        assert_eq!(app.context(), Context::ArticleList);
        app.search_mode = true;
        assert_eq!(app.context(), Context::Search);
        app.search_mode = false;
        app.view = View::Bookmarks;
        assert_eq!(app.context(), Context::Bookmarks);
    }

    #[tokio::test]
    async fn test_enter_reader_bumps_generation() {
        let mut app = test_app().await;
        let first = app.enter_reader(article(1));
        let second = app.enter_reader(article(2));
        assert_ne!(first, second);
        assert!(matches!(
            app.content_state,
            ContentState::Loading { article_id: 2 }
        ));
        app.exit_reader();
        assert_eq!(app.view, View::Feed);
        assert!(app.reader_article.is_none());
    }

    #[tokio::test]
    async fn test_reader_scroll_is_clamped() {
        let mut app = test_app().await;
        app.enter_reader(article(1));
        app.show_article_content(article(1));
        app.reader_viewport_width = 40;
        app.reader_visible_lines = 2;
        app.scroll_reader(1_000);
        let max = app.reader_content_lines() - 2;
        assert_eq!(app.scroll_offset, max);
        app.scroll_reader(-1_000);
        assert_eq!(app.scroll_offset, 0);
    }

    #[tokio::test]
    async fn test_status_expires() {
        let mut app = test_app().await;
        app.set_status("Bookmarked");
        let set_at = app.status_message.as_ref().unwrap().1;
        assert!(!app.clear_expired_status(set_at + Duration::from_secs(1)));
        assert!(app.clear_expired_status(set_at + STATUS_TTL));
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_cycle_theme_restyles_reader() {
        let mut app = test_app().await;
        app.enter_reader(article(1));
        app.show_article_content(article(1));
        assert_eq!(app.cycle_theme(), "Light");
        assert_eq!(app.theme_variant, ThemeVariant::Light);
        assert!(matches!(app.content_state, ContentState::Loaded { .. }));
    }

    #[tokio::test]
    async fn test_stale_feed_key_does_not_touch_selection_list() {
        let mut app = test_app().await;
        load_page(&mut app, &[1, 2], false);
        let stale = PendingFetch {
            key: RequestKey {
                descriptor: app.feed.controller().descriptor().clone(),
                generation: 0,
            },
            request: app.feed.refresh().request,
        };
        let page = ArticlePage {
            articles: vec![article(42)],
            total: 1,
            page: 1,
            page_size: 20,
            has_next: false,
        };
        app.feed.complete(&stale, Ok(page), Instant::now());
        assert_eq!(app.articles().len(), 2);
    }
}

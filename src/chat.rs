//! AI chat sidebar state.
//!
//! The transcript is owned by the server; this panel mirrors it, tracks the
//! one outstanding send and keeps the inline error for a failed send. A
//! failed message is never added to the transcript.

use crate::api::{ApiError, Article, ChatReply, ChatRequest, ChatTurn, ErrorNotice};
use crate::session::SessionIdentity;
use thiserror::Error;

/// Turns requested from `GET /api/chat/history/{userId}`.
pub const HISTORY_LIMIT: u32 = 50;

/// Starter prompts offered while the transcript is empty and an article is
/// selected.
pub const SUGGESTED_PROMPTS: [&str; 3] = [
    "Can you summarize this article?",
    "What are the key takeaways?",
    "How does this impact the industry?",
];

/// Why a submit was refused locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChatValidation {
    #[error("Message cannot be empty")]
    Empty,
    #[error("A message is already being sent")]
    Busy,
}

#[derive(Debug, Default)]
pub struct ChatPanel {
    open: bool,
    article: Option<Article>,
    topics: Vec<String>,
    transcript: Vec<ChatTurn>,
    history_loaded: bool,
    history_loading: bool,
    /// The transcript changed server-side while a history fetch was running,
    /// so its response is out of date on arrival.
    refetch_after_load: bool,
    history_error: Option<ErrorNotice>,
    input: String,
    /// Trimmed text of the outstanding send.
    pending: Option<String>,
    send_error: Option<&'static str>,
    scroll_to_latest: bool,
}

impl ChatPanel {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Visibility and context
    // ========================================================================

    /// Open the panel with `article` as context. Returns the article id
    /// whose topics should be fetched, if the context changed.
    pub fn open_for(&mut self, article: Option<&Article>) -> Option<i64> {
        self.open = true;
        let new_id = article.map(|a| a.id);
        let old_id = self.article.as_ref().map(|a| a.id);
        self.article = article.cloned();
        if new_id != old_id {
            self.topics.clear();
            return new_id;
        }
        None
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// True when the transcript has never been fetched and no fetch is
    /// running. Marks the fetch as started.
    pub fn begin_history_load(&mut self) -> bool {
        if self.history_loaded || self.history_loading {
            return false;
        }
        self.history_loading = true;
        true
    }

    /// Force the next [`begin_history_load`](Self::begin_history_load) to
    /// fetch again.
    pub fn invalidate_history(&mut self) {
        self.history_loaded = false;
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    pub fn set_topics(&mut self, article_id: i64, topics: Vec<String>) {
        if self.article.as_ref().map(|a| a.id) == Some(article_id) {
            self.topics = topics;
        }
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// The input stays editable while a send is outstanding.
    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn placeholder(&self) -> &'static str {
        if self.article.is_some() {
            "Ask about this article..."
        } else {
            "Ask about tech news..."
        }
    }

    /// Prompts to offer, empty once the conversation has started.
    pub fn suggestions(&self) -> &'static [&'static str] {
        if self.transcript.is_empty() && self.article.is_some() && self.pending.is_none() {
            &SUGGESTED_PROMPTS
        } else {
            &[]
        }
    }

    /// Copy suggestion `index` into the input.
    pub fn apply_suggestion(&mut self, index: usize) -> bool {
        match self.suggestions().get(index) {
            Some(prompt) => {
                self.input = (*prompt).to_string();
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Send lifecycle
    // ========================================================================

    /// Validate the input and mark a send as outstanding.
    pub fn submit(&mut self, user: &SessionIdentity) -> Result<ChatRequest, ChatValidation> {
        if self.pending.is_some() {
            return Err(ChatValidation::Busy);
        }
        let message = self.input.trim();
        if message.is_empty() {
            return Err(ChatValidation::Empty);
        }
        let message = message.to_string();
        self.pending = Some(message.clone());
        self.send_error = None;
        self.scroll_to_latest = true;
        Ok(ChatRequest {
            message,
            article_id: self.article.as_ref().map(|a| a.id),
            user_id: Some(user.as_str().to_string()),
        })
    }

    /// The reply arrived: clear the input, show the exchange until the
    /// refreshed transcript replaces it. The caller re-fetches history.
    pub fn on_sent(&mut self, reply: ChatReply) {
        let Some(message) = self.pending.take() else {
            return;
        };
        self.input.clear();
        self.transcript.push(ChatTurn {
            id: 0,
            message,
            response: reply.response,
            article_id: self.article.as_ref().map(|a| a.id),
            created_at: String::new(),
        });
        self.history_loaded = false;
        if self.history_loading {
            self.refetch_after_load = true;
        }
        self.scroll_to_latest = true;
    }

    /// The send failed: keep the input, show an inline error.
    pub fn on_send_failed(&mut self, err: &ApiError) {
        self.pending = None;
        self.send_error = Some(err.chat_message());
        self.scroll_to_latest = true;
    }

    pub fn dismiss_error(&mut self) {
        self.send_error = None;
    }

    /// Apply a fetched transcript. Returns true, discarding `turns`, when a
    /// send or clear completed after the fetch was issued; the caller must
    /// fetch again.
    pub fn on_history(&mut self, turns: Vec<ChatTurn>) -> bool {
        self.history_loading = false;
        if std::mem::take(&mut self.refetch_after_load) {
            self.history_loaded = false;
            return true;
        }
        self.transcript = turns;
        self.history_loaded = true;
        self.history_error = None;
        self.scroll_to_latest = true;
        false
    }

    /// Returns true when the failed fetch was already out of date and the
    /// caller should fetch again instead of showing the error.
    pub fn on_history_failed(&mut self, notice: ErrorNotice) -> bool {
        self.history_loading = false;
        if std::mem::take(&mut self.refetch_after_load) {
            return true;
        }
        self.history_error = Some(notice);
        false
    }

    pub fn on_cleared(&mut self) {
        self.transcript.clear();
        self.history_loaded = true;
        if self.history_loading {
            self.refetch_after_load = true;
        }
        self.scroll_to_latest = true;
    }

    /// Returns true once after the transcript or pending state changed.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_latest)
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn is_sending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn send_error(&self) -> Option<&'static str> {
        self.send_error
    }

    pub fn history_error(&self) -> Option<&ErrorNotice> {
        self.history_error.as_ref()
    }

    pub fn is_history_loading(&self) -> bool {
        self.history_loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AI_UNAVAILABLE_MESSAGE, CHAT_SEND_FAILED_MESSAGE};

    fn user() -> SessionIdentity {
        SessionIdentity::parse("user_abc123xyz_lq2m3n4").unwrap()
    }

    fn article(id: i64) -> Article {
        serde_json::from_value(serde_json::json!({
            "id": id, "title": "Rust 2024", "url": "https://e.com/r"
        }))
        .unwrap()
    }

    fn reply(text: &str) -> ChatReply {
        ChatReply {
            response: text.into(),
            article_context: None,
            sources: None,
        }
    }

    #[test]
    fn empty_message_is_rejected() {
        let mut chat = ChatPanel::new();
        chat.set_input("   ");
        assert_eq!(chat.submit(&user()), Err(ChatValidation::Empty));
        assert!(!chat.is_sending());
    }

    #[test]
    fn submit_trims_and_carries_context() {
        let mut chat = ChatPanel::new();
        chat.open_for(Some(&article(9)));
        chat.set_input("  what changed?  ");
        let req = chat.submit(&user()).unwrap();
        assert_eq!(req.message, "what changed?");
        assert_eq!(req.article_id, Some(9));
        assert_eq!(req.user_id.as_deref(), Some("user_abc123xyz_lq2m3n4"));
        assert!(chat.take_scroll_request());
        assert!(!chat.take_scroll_request());
    }

    #[test]
    fn second_submit_while_pending_is_busy() {
        let mut chat = ChatPanel::new();
        chat.set_input("one");
        chat.submit(&user()).unwrap();
        chat.push_char('!');
        assert_eq!(chat.submit(&user()), Err(ChatValidation::Busy));
        assert_eq!(chat.input(), "one!");
    }

    #[test]
    fn success_clears_input_and_requests_history() {
        let mut chat = ChatPanel::new();
        chat.on_history(Vec::new());
        chat.set_input("hello");
        chat.submit(&user()).unwrap();
        chat.on_sent(reply("hi there"));
        assert_eq!(chat.input(), "");
        assert_eq!(chat.transcript().len(), 1);
        assert_eq!(chat.transcript()[0].response, "hi there");
        assert!(chat.begin_history_load());
    }

    #[test]
    fn failure_keeps_transcript_and_input() {
        let mut chat = ChatPanel::new();
        chat.set_input("hello");
        chat.submit(&user()).unwrap();
        chat.on_send_failed(&ApiError::HttpStatus {
            status: 500,
            detail: None,
        });
        assert!(chat.transcript().is_empty());
        assert_eq!(chat.input(), "hello");
        assert_eq!(chat.send_error(), Some(AI_UNAVAILABLE_MESSAGE));
        chat.dismiss_error();
        assert_eq!(chat.send_error(), None);

        chat.submit(&user()).unwrap();
        chat.on_send_failed(&ApiError::Timeout(10));
        assert_eq!(chat.send_error(), Some(CHAT_SEND_FAILED_MESSAGE));
    }

    #[test]
    fn suggestions_only_for_fresh_article_conversation() {
        let mut chat = ChatPanel::new();
        assert!(chat.suggestions().is_empty());
        assert_eq!(chat.open_for(Some(&article(3))), Some(3));
        assert_eq!(chat.suggestions().len(), 3);
        assert!(chat.apply_suggestion(1));
        assert_eq!(chat.input(), "What are the key takeaways?");
        assert!(!chat.apply_suggestion(7));

        chat.on_history(vec![ChatTurn {
            id: 1,
            message: "m".into(),
            response: "r".into(),
            article_id: Some(3),
            created_at: String::new(),
        }]);
        assert!(chat.suggestions().is_empty());
    }

    #[test]
    fn topics_follow_article_context() {
        let mut chat = ChatPanel::new();
        assert_eq!(chat.open_for(Some(&article(1))), Some(1));
        chat.set_topics(1, vec!["rust".into()]);
        chat.set_topics(2, vec!["stale".into()]);
        assert_eq!(chat.topics(), ["rust".to_string()]);
        assert_eq!(chat.open_for(Some(&article(1))), None);
        assert_eq!(chat.open_for(Some(&article(2))), Some(2));
        assert!(chat.topics().is_empty());
    }

    #[test]
    fn send_during_first_history_load_refetches() {
        let mut chat = ChatPanel::new();
        assert!(chat.begin_history_load());
        chat.set_input("hello");
        chat.submit(&user()).unwrap();
        chat.on_sent(reply("hi there"));
        assert!(!chat.begin_history_load());

        // The fetch issued before the send completes without the new turn.
        assert!(chat.on_history(Vec::new()));
        assert_eq!(chat.transcript().len(), 1);
        assert!(chat.begin_history_load());

        let refreshed = vec![ChatTurn {
            id: 4,
            message: "hello".into(),
            response: "hi there".into(),
            article_id: None,
            created_at: "2024-05-01T10:00:00".into(),
        }];
        assert!(!chat.on_history(refreshed));
        assert_eq!(chat.transcript()[0].id, 4);
        assert!(!chat.begin_history_load());
    }

    #[test]
    fn clear_during_history_load_refetches_even_on_failure() {
        let mut chat = ChatPanel::new();
        assert!(chat.begin_history_load());
        chat.on_cleared();
        let notice = ErrorNotice::from_error(&ApiError::Timeout(10), None);
        assert!(chat.on_history_failed(notice.clone()));
        assert!(chat.history_error().is_none());
        assert!(chat.transcript().is_empty());

        assert!(!chat.on_history_failed(notice));
        assert!(chat.history_error().is_some());
    }

    #[test]
    fn history_load_runs_once() {
        let mut chat = ChatPanel::new();
        assert!(chat.begin_history_load());
        assert!(!chat.begin_history_load());
        chat.on_history(Vec::new());
        assert!(!chat.begin_history_load());
        chat.invalidate_history();
        assert!(chat.begin_history_load());
    }
}

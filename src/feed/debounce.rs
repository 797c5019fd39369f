use super::query::MIN_SEARCH_LEN;
use std::time::{Duration, Instant};

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// What a settled search input asks the feed to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchIntent {
    /// Input was emptied: leave search mode.
    Clear,
    /// Search for this trimmed text.
    Search(String),
}

/// Single-shot debounce for the search box.
///
/// Every keystroke replaces the pending deadline. When the deadline passes
/// the trimmed text is dispatched, unless it is shorter than
/// [`MIN_SEARCH_LEN`] (but not empty) or equal to the last dispatched value.
/// The owner polls from its tick; nothing here spawns timers.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
    last_dispatched: String,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            last_dispatched: String::new(),
        }
    }

    /// Record the full input value after a keystroke.
    pub fn input(&mut self, raw: &str, now: Instant) {
        self.pending = Some((raw.to_string(), now + self.delay));
    }

    /// Dispatch the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<SearchIntent> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => {}
            _ => return None,
        }
        let (raw, _) = self.pending.take()?;
        self.evaluate(&raw)
    }

    /// Dispatch the pending value immediately (Enter in the search box).
    pub fn flush(&mut self) -> Option<SearchIntent> {
        let (raw, _) = self.pending.take()?;
        self.evaluate(&raw)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Align with a search value applied outside the debouncer, so that
    /// typing it again is suppressed.
    pub fn sync(&mut self, applied: &str) {
        self.last_dispatched = applied.trim().to_string();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    fn evaluate(&mut self, raw: &str) -> Option<SearchIntent> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();
        if len > 0 && len < MIN_SEARCH_LEN {
            return None;
        }
        if trimmed == self.last_dispatched {
            return None;
        }
        self.last_dispatched = trimmed.to_string();
        tracing::debug!(query_len = len, "Search input settled");
        if trimmed.is_empty() {
            Some(SearchIntent::Clear)
        } else {
            Some(SearchIntent::Search(trimmed.to_string()))
        }
    }
}

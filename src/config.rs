//! Configuration file parser for ~/.config/techflow/config.toml.
//!
//! The file is optional; a missing or empty file yields `Config::default()`.
//! Unknown keys are accepted but logged, so typos show up in the log file.
//! The API base URL can also come from `TECHFLOW_API_URL` or `--api-url`,
//! which take precedence in that order (CLI first).
use crate::api::{RetryPolicy, DEFAULT_BASE_URL};
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding `api_url`.
pub const API_URL_ENV: &str = "TECHFLOW_API_URL";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Top-level application configuration.
///
/// Every field is `#[serde(default)]`, so any subset of keys may be given.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the TechFlow API.
    pub api_url: String,

    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Articles per feed page.
    pub page_size: u32,

    pub request_timeout_secs: u64,

    /// Quiet period after the last keystroke before a search is sent.
    pub search_debounce_ms: u64,

    /// Freshness window for feed and search pages.
    pub feed_stale_minutes: u64,

    pub trending_stale_minutes: u64,

    pub bookmarks_stale_secs: u64,

    /// Retries after the first attempt for list, search and trending.
    pub retry_attempts: u32,

    pub retry_delay_ms: u64,

    /// Look-back window for trending panels.
    pub trending_hours: u32,

    /// Query cache entries kept across all result kinds.
    pub cache_capacity: usize,

    /// Keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            theme: "dark".to_string(),
            page_size: 20,
            request_timeout_secs: 10,
            search_debounce_ms: 300,
            feed_stale_minutes: 5,
            trending_stale_minutes: 15,
            bookmarks_stale_secs: 30,
            retry_attempts: 2,
            retry_delay_ms: 1000,
            trending_hours: 168,
            cache_capacity: 256,
            keybindings: HashMap::new(),
        }
    }
}

const KNOWN_KEYS: [&str; 13] = [
    "api_url",
    "theme",
    "page_size",
    "request_timeout_secs",
    "search_debounce_ms",
    "feed_stale_minutes",
    "trending_stale_minutes",
    "bookmarks_stale_secs",
    "retry_attempts",
    "retry_delay_ms",
    "trending_hours",
    "cache_capacity",
    "keybindings",
];

/// Largest page the API accepts.
const MAX_PAGE_SIZE: u32 = 100;

impl Config {
    /// SEC: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → `Ok(Config::default())`
    /// - Invalid TOML or wrong types → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as a warning
    /// - Out-of-range numbers → clamped, logged as a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            api_url = %config.api_url,
            theme = %config.theme,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse TOML text. Blank input yields the defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        Ok(config.sanitized())
    }

    /// Clamp values that would break paging, caching or timers.
    fn sanitized(mut self) -> Self {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            let clamped = self.page_size.clamp(1, MAX_PAGE_SIZE);
            tracing::warn!(value = self.page_size, clamped, "page_size out of range");
            self.page_size = clamped;
        }
        if self.request_timeout_secs == 0 {
            tracing::warn!("request_timeout_secs must be positive, using 10");
            self.request_timeout_secs = 10;
        }
        if self.cache_capacity == 0 {
            tracing::warn!("cache_capacity must be positive, using 256");
            self.cache_capacity = 256;
        }
        if self.trending_hours == 0 {
            tracing::warn!("trending_hours must be positive, using 168");
            self.trending_hours = 168;
        }
        self
    }

    /// Pick the API base: CLI flag, then environment, then config file.
    /// Blank overrides are ignored.
    pub fn resolve_api_url(&self, cli: Option<&str>, env: Option<&str>) -> String {
        [cli, env]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(self.api_url.trim())
            .to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn feed_ttl(&self) -> Duration {
        Duration::from_secs(self.feed_stale_minutes * 60)
    }

    pub fn trending_ttl(&self) -> Duration {
        Duration::from_secs(self.trending_stale_minutes * 60)
    }

    pub fn bookmarks_ttl(&self) -> Duration {
        Duration::from_secs(self.bookmarks_stale_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.retry_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )
    }

    pub fn cache_capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.cache_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("techflow_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.theme, "dark");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.feed_ttl(), Duration::from_secs(300));
        assert_eq!(config.trending_ttl(), Duration::from_secs(900));
        assert_eq!(config.bookmarks_ttl(), Duration::from_secs(30));
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/techflow_test_nonexistent_config.toml");
        assert_eq!(Config::load(path).unwrap(), Config::default());
    }

    #[test]
    fn test_whitespace_only_returns_default() {
        assert_eq!(Config::parse("   \n  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = temp_config("partial", "theme = \"light\"\npage_size = 50\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "light");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.retry_attempts, 2);
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
api_url = "https://news.example.com"
theme = "light"
page_size = 10
request_timeout_secs = 5
search_debounce_ms = 150
feed_stale_minutes = 1
trending_stale_minutes = 2
bookmarks_stale_secs = 3
retry_attempts = 0
retry_delay_ms = 250
trending_hours = 24
cache_capacity = 32

[keybindings]
quit = "Ctrl+q"
refresh = "F5"
"#;
        let config = Config::parse(content).unwrap();
        assert_eq!(config.api_url, "https://news.example.com");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.search_debounce(), Duration::from_millis(150));
        assert_eq!(config.feed_ttl(), Duration::from_secs(60));
        assert_eq!(config.retry_policy(), RetryPolicy::fixed(0, Duration::from_millis(250)));
        assert_eq!(config.trending_hours, 24);
        assert_eq!(config.cache_capacity().get(), 32);
        assert_eq!(
            config.keybindings.get("quit").map(String::as_str),
            Some("Ctrl+q")
        );
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::parse("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        assert!(Config::parse("page_size = \"twenty\"\n").is_err());
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = Config::parse("theme = \"dark\"\njina_api_key = \"x\"\n").unwrap();
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let config =
            Config::parse("page_size = 0\nrequest_timeout_secs = 0\ncache_capacity = 0\n").unwrap();
        assert_eq!(config.page_size, 1);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.cache_capacity, 256);

        let config = Config::parse("page_size = 5000\n").unwrap();
        assert_eq!(config.page_size, 100);
    }

    #[test]
    fn test_api_url_precedence() {
        let config = Config::parse("api_url = \"http://from-file:8000\"\n").unwrap();
        assert_eq!(config.resolve_api_url(None, None), "http://from-file:8000");
        assert_eq!(
            config.resolve_api_url(None, Some("http://from-env")),
            "http://from-env"
        );
        assert_eq!(
            config.resolve_api_url(Some("http://from-cli"), Some("http://from-env")),
            "http://from-cli"
        );
        assert_eq!(
            config.resolve_api_url(Some("  "), None),
            "http://from-file:8000"
        );
    }

    // SEC: File size limit
    #[test]
    fn test_too_large_file_rejected() {
        let path = temp_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }
}

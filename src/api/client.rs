use super::error::ApiError;
use crate::util::validate_api_base;
use futures::StreamExt;
use reqwest::redirect::Policy;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Base URL used when neither config, env nor CLI provide one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

// ============================================================================
// Retry Policy
// ============================================================================

/// Fixed-delay retry policy for transient failures.
///
/// `attempts` counts retries after the first try, so `attempts = 2` means at
/// most three requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const NONE: RetryPolicy = RetryPolicy {
        attempts: 0,
        delay: Duration::ZERO,
    };

    pub const fn fixed(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(2, Duration::from_secs(1))
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// policy's retry budget is spent.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut retry_count = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && retry_count < policy.attempts => {
                retry_count += 1;
                tracing::debug!(
                    error = %e,
                    retry = retry_count,
                    delay_ms = policy.delay.as_millis() as u64,
                    "Retrying API request after transient error"
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Redirect policy with loop detection and a three-hop limit.
fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }
        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev == url) {
            return attempt.error("Redirect loop detected");
        }
        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

// ============================================================================
// API Client
// ============================================================================

/// Typed gateway to the TechFlow REST API.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted, so
/// background tasks take their own copy. Endpoint methods live in sibling
/// modules as `impl ApiClient` blocks.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiClient {
    /// Build a client for `base_url`.
    ///
    /// # Errors
    ///
    /// `ApiError::InvalidUrl` if the base is not an absolute http(s) URL,
    /// `ApiError::Network` if the TLS backend cannot be initialised.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = validate_api_base(base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        let http = reqwest::Client::builder()
            .redirect(redirect_policy())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(timeout)
            .user_agent(concat!("techflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Network)?;
        tracing::info!(base_url = %base, timeout_secs = timeout.as_secs(), "API client configured");
        Ok(Self {
            http,
            base,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve `segments` under the base URL and attach `query`.
    ///
    /// Segments are percent-encoded individually, so category names such as
    /// "Products & Ideas" are safe to pass as path components.
    pub(crate) fn endpoint(
        &self,
        segments: &[&str],
        query: &[(&'static str, String)],
    ) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments, query)?;
        self.execute(Method::GET, url, None).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments, query)?;
        let body = body.map(serde_json::to_vec).transpose()?;
        self.execute(Method::POST, url, body).await
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments, query)?;
        self.execute(Method::DELETE, url, None).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<T, ApiError> {
        tracing::debug!(method = %method, url = %url, "API request");
        let mut request: RequestBuilder = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(bytes) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes);
        }

        let timeout_secs = self.timeout.as_secs();
        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| ApiError::Timeout(timeout_secs))?
            .map_err(|e| ApiError::from_reqwest(e, timeout_secs))?;

        let status = response.status();
        let bytes = read_limited(response, MAX_RESPONSE_SIZE, timeout_secs).await?;

        if !status.is_success() {
            let detail = error_detail(&bytes);
            tracing::warn!(status = status.as_u16(), detail = ?detail, "API returned error status");
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Extract FastAPI's `{"detail": "..."}` message from an error body.
fn error_detail(bytes: &[u8]) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct Detail {
        detail: serde_json::Value,
    }
    let parsed: Detail = serde_json::from_slice(bytes).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Read a body with a hard size cap, checking `Content-Length` first.
async fn read_limited(
    response: reqwest::Response,
    limit: usize,
    timeout_secs: u64,
) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ApiError::from_reqwest(e, timeout_secs))?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

use thiserror::Error;

/// Message shown when the chat endpoint answers HTTP 500, which the service
/// returns when no AI provider key is configured.
pub const AI_UNAVAILABLE_MESSAGE: &str = "The AI service is currently unavailable. \
Please check that the OpenAI API key is configured in the backend.";

/// Message shown for any other failed chat send.
pub const CHAT_SEND_FAILED_MESSAGE: &str = "Unable to send message. Please try again.";

/// Troubleshooting hints attached to connection failures.
pub const CONNECTION_HINTS: [&str; 3] = [
    "Check that the TechFlow API is running (default port 8000)",
    "Verify your network connection",
    "Press r to retry",
];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Could not connect to the API: {0}")]
    Connection(String),
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    #[error("HTTP error: status {status}")]
    HttpStatus { status: u16, detail: Option<String> },
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Coarse classification used by the UI to pick titles and hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never got an HTTP answer.
    Connection,
    /// The server answered with an error status.
    Server(u16),
    /// The answer could not be used (bad body, bad URL, too large).
    Invalid,
}

impl ApiError {
    /// Splits transport errors into connection failures and the rest, so
    /// the UI can tell "API is down" apart from protocol trouble.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(timeout_secs)
        } else if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else {
            ApiError::Network(err)
        }
    }

    /// Returns true if this error is transient and the request should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Timeout(_) | ApiError::Connection(_) | ApiError::Network(_) => true,
            ApiError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            ApiError::ResponseTooLarge(_) | ApiError::Decode(_) | ApiError::InvalidUrl(_) => false,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Timeout(_) | ApiError::Connection(_) | ApiError::Network(_) => {
                ErrorKind::Connection
            }
            ApiError::HttpStatus { status, .. } => ErrorKind::Server(*status),
            ApiError::ResponseTooLarge(_) | ApiError::Decode(_) | ApiError::InvalidUrl(_) => {
                ErrorKind::Invalid
            }
        }
    }

    pub fn is_connection_error(&self) -> bool {
        self.kind() == ErrorKind::Connection
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided `detail` string from a FastAPI error body, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::HttpStatus { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// User-facing text for a failed chat send.
    pub fn chat_message(&self) -> &'static str {
        if self.status() == Some(500) {
            AI_UNAVAILABLE_MESSAGE
        } else {
            CHAT_SEND_FAILED_MESSAGE
        }
    }
}

/// A rendered, cloneable description of a failure for error panels.
///
/// `ApiError` wraps `reqwest::Error` and is not `Clone`; views keep this
/// instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub kind: ErrorKind,
    pub title: String,
    pub description: String,
    pub hints: Vec<&'static str>,
}

impl ErrorNotice {
    /// Builds the panel text for `err`.
    ///
    /// Connection failures always get the "Connection Error" title and the
    /// troubleshooting hints; everything else uses `title` (or "Something
    /// went wrong") with the server detail or error text as description.
    pub fn from_error(err: &ApiError, title: Option<&str>) -> Self {
        if err.is_connection_error() {
            return Self {
                kind: ErrorKind::Connection,
                title: "Connection Error".to_string(),
                description: "Unable to reach the TechFlow API.".to_string(),
                hints: CONNECTION_HINTS.to_vec(),
            };
        }
        let description = match err.detail() {
            Some(detail) => detail.to_string(),
            None => err.to_string(),
        };
        Self {
            kind: err.kind(),
            title: title.unwrap_or("Something went wrong").to_string(),
            description,
            hints: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ApiError {
        ApiError::HttpStatus {
            status: code,
            detail: None,
        }
    }

    #[test]
    fn retryable_statuses() {
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(status(408).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!status(422).is_retryable());
        assert!(ApiError::Timeout(10).is_retryable());
        assert!(ApiError::Connection("refused".into()).is_retryable());
        assert!(!ApiError::ResponseTooLarge(10).is_retryable());
    }

    #[test]
    fn chat_message_special_cases_500() {
        assert_eq!(status(500).chat_message(), AI_UNAVAILABLE_MESSAGE);
        assert_eq!(status(502).chat_message(), CHAT_SEND_FAILED_MESSAGE);
        assert_eq!(
            ApiError::Timeout(10).chat_message(),
            CHAT_SEND_FAILED_MESSAGE
        );
    }

    #[test]
    fn notice_for_connection_failure() {
        let notice = ErrorNotice::from_error(&ApiError::Connection("refused".into()), Some("x"));
        assert_eq!(notice.title, "Connection Error");
        assert_eq!(notice.kind, ErrorKind::Connection);
        assert_eq!(notice.hints.len(), 3);
    }

    #[test]
    fn notice_prefers_server_detail() {
        let err = ApiError::HttpStatus {
            status: 404,
            detail: Some("Article not found".into()),
        };
        let notice = ErrorNotice::from_error(&err, None);
        assert_eq!(notice.title, "Something went wrong");
        assert_eq!(notice.description, "Article not found");
        assert_eq!(notice.kind, ErrorKind::Server(404));
        assert!(notice.hints.is_empty());
    }
}

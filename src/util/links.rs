use thiserror::Error;
use url::Url;

/// Errors raised while validating URLs supplied by configuration or by the
/// remote service.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
    #[error("API base URL must not carry a query string or fragment")]
    UnexpectedQuery,
}

/// Applies the image URL rule to a server-provided value.
///
/// Blank values become `None`. Only absolute `http://` / `https://` URLs and
/// protocol-relative `//host/...` URLs are kept; anything else (relative
/// paths, `data:` URIs, garbage) is dropped so the UI never tries to show it.
///
/// ```
/// use techflow::util::normalize_image_url;
///
/// assert_eq!(normalize_image_url(Some("https://cdn.example.com/a.png")).as_deref(),
///            Some("https://cdn.example.com/a.png"));
/// assert_eq!(normalize_image_url(Some("//cdn.example.com/a.png")).as_deref(),
///            Some("//cdn.example.com/a.png"));
/// assert_eq!(normalize_image_url(Some("/static/a.png")), None);
/// assert_eq!(normalize_image_url(Some("")), None);
/// ```
pub fn normalize_image_url(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }
    if value.starts_with("http://") || value.starts_with("https://") || value.starts_with("//") {
        Some(value.to_string())
    } else {
        None
    }
}

/// Parses and checks the API base URL from config, env or CLI.
///
/// Plain `http` is accepted because the service defaults to
/// `http://localhost:8000`. A trailing path prefix is kept so the client can
/// sit behind a reverse proxy mount point.
pub fn validate_api_base(raw: &str) -> Result<Url, LinkError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(LinkError::UnsupportedScheme(other.to_owned())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(LinkError::MissingHost);
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(LinkError::UnexpectedQuery);
    }
    Ok(url)
}

/// SEC: Checks an article link before handing it to the system opener.
///
/// `open::that` passes the string to a platform launcher, so anything other
/// than a well-formed http(s) URL is refused.
pub fn validate_url_for_open(raw: &str) -> Result<Url, LinkError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(LinkError::UnsupportedScheme(other.to_owned())),
    }
    if url.host_str().is_none() {
        return Err(LinkError::MissingHost);
    }
    Ok(url)
}

/// Host of `url` without a leading `www.`, used when an article has no
/// `source` field.
pub fn extract_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

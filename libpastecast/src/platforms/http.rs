//! HTTP plumbing shared by the platform adapters

use reqwest::{Client, Response, StatusCode, Url};
use std::time::Duration;

use crate::error::{PlatformError, PlatformResult, RegistryError};

/// Longest response excerpt kept in an error message
const ERROR_BODY_LIMIT: usize = 200;

/// Build the pooled client shared by every adapter
///
/// The client-level timeout mirrors the per-adapter deadline so a stuck
/// socket is torn down even when the caller drops the future late.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, RegistryError> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| RegistryError::HttpClient(e.to_string()))
}

/// Map a transport-level reqwest error
pub(crate) fn map_reqwest_error(error: reqwest::Error, platform: &str) -> PlatformError {
    if error.is_timeout() {
        return PlatformError::Timeout;
    }

    if error.is_decode() {
        return PlatformError::MalformedResponse(format!(
            "{} returned an unreadable body: {}",
            platform, error
        ));
    }

    if error.is_connect() {
        return PlatformError::Network(format!("Could not connect to {}: {}", platform, error));
    }

    PlatformError::Network(format!("Request to {} failed: {}", platform, error))
}

/// Turn a non-2xx response into an error carrying a body excerpt
pub(crate) async fn ensure_success(response: Response, platform: &str) -> PlatformResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body, platform))
}

pub(crate) fn status_error(status: StatusCode, body: &str, platform: &str) -> PlatformError {
    let detail = excerpt(body);
    let reason = status.canonical_reason().unwrap_or("Unknown");
    let message = if detail.is_empty() {
        format!("{} rejected the request ({})", platform, reason)
    } else {
        format!("{} rejected the request ({}): {}", platform, reason, detail)
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        return PlatformError::RateLimit(message);
    }

    PlatformError::Http {
        status: status.as_u16(),
        message,
    }
}

/// Read the body as text
pub(crate) async fn read_text(response: Response, platform: &str) -> PlatformResult<String> {
    response
        .text()
        .await
        .map_err(|e| map_reqwest_error(e, platform))
}

/// Read and decode a JSON body, reporting the raw text when decoding fails
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    response: Response,
    platform: &str,
) -> PlatformResult<T> {
    let body = read_text(response, platform).await?;
    serde_json::from_str(&body).map_err(|e| {
        PlatformError::MalformedResponse(format!(
            "{} returned invalid JSON ({}): {}",
            platform,
            e,
            excerpt(&body)
        ))
    })
}

/// Extract the URL from a plain-text body whose first non-empty line is it
pub(crate) fn url_from_body(body: &str, base: &str, platform: &str) -> PlatformResult<String> {
    let line = body
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| {
            PlatformError::MalformedResponse(format!("{} returned an empty body", platform))
        })?;

    absolutize(line, base, platform)
}

/// Resolve `candidate` against `base`, accepting only http(s) results
pub(crate) fn absolutize(candidate: &str, base: &str, platform: &str) -> PlatformResult<String> {
    let malformed = || {
        PlatformError::MalformedResponse(format!(
            "{} returned something that is not a URL: {}",
            platform,
            excerpt(candidate)
        ))
    };

    let candidate = candidate.trim();
    if candidate.is_empty() || candidate.contains(char::is_whitespace) {
        return Err(malformed());
    }

    let url = if candidate.contains("://") {
        Url::parse(candidate)
    } else {
        Url::parse(&with_trailing_slash(base)).and_then(|base| base.join(candidate))
    }
    .map_err(|_| malformed())?;

    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        _ => Err(malformed()),
    }
}

/// Join a base URL and a path segment without doubling slashes
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= ERROR_BODY_LIMIT {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(ERROR_BODY_LIMIT).collect();
    format!("{}...", cut)
}

//! Rentry adapter
//!
//! Rentry is a Django app protected by CSRF double-submit: the token in the
//! `csrftoken` cookie must equal the `csrfmiddlewaretoken` form field. We
//! generate a fresh token locally and send it both ways, which keeps every
//! publish to a single `POST /api/new`.
//!
//! The API answers `200` even for rejected entries; the real verdict is the
//! `status` field of the JSON body (sent as a string).

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::header::{COOKIE, REFERER};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{PlatformError, PlatformResult};
use crate::platforms::{check_request, http, Platform};
use crate::types::{PlatformDescriptor, PublishRequest};

pub const DEFAULT_BASE_URL: &str = "https://rentry.co";

const CSRF_TOKEN_LEN: usize = 32;
const CUSTOM_URL_MIN: usize = 2;
const CUSTOM_URL_MAX: usize = 100;

pub struct RentryPlatform {
    client: Client,
    base_url: String,
    descriptor: PlatformDescriptor,
}

#[derive(Debug, Deserialize)]
struct RentryResponse {
    status: serde_json::Value,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    errors: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl RentryResponse {
    fn is_ok(&self) -> bool {
        match &self.status {
            serde_json::Value::String(s) => s == "200",
            serde_json::Value::Number(n) => n.as_u64() == Some(200),
            _ => false,
        }
    }
}

impl RentryPlatform {
    pub fn new(client: Client, base_url: Option<&str>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
            descriptor: Self::describe(),
        }
    }

    pub fn describe() -> PlatformDescriptor {
        PlatformDescriptor::new("rentry", "Rentry")
            .aliases(&["rentry.co", "rentry.org"])
            .supports_custom_url()
            .max_content_bytes(200_000)
    }

    fn csrf_token() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CSRF_TOKEN_LEN)
            .map(char::from)
            .collect()
    }

    fn parse_response(&self, body: RentryResponse) -> PlatformResult<String> {
        let name = &self.descriptor.display_name;

        if !body.is_ok() {
            let reason = body
                .errors
                .or(body.content)
                .unwrap_or_else(|| format!("status {}", body.status));
            return Err(PlatformError::Validation(format!(
                "{} rejected the entry: {}",
                name, reason
            )));
        }

        let url = body.url.ok_or_else(|| {
            PlatformError::MalformedResponse(format!("{} response has no url field", name))
        })?;

        http::absolutize(&url, &self.base_url, name)
    }
}

/// Rentry slugs: 2-100 characters of `[A-Za-z0-9_-]`
fn check_custom_url(slug: &str) -> PlatformResult<()> {
    let len = slug.chars().count();
    let valid_chars = slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !(CUSTOM_URL_MIN..=CUSTOM_URL_MAX).contains(&len) || !valid_chars {
        return Err(PlatformError::Validation(format!(
            "Custom URL '{}' must be {}-{} characters of letters, digits, '-' or '_'",
            slug, CUSTOM_URL_MIN, CUSTOM_URL_MAX
        )));
    }
    Ok(())
}

#[async_trait]
impl Platform for RentryPlatform {
    fn descriptor(&self) -> &PlatformDescriptor {
        &self.descriptor
    }

    fn validate_request(&self, request: &PublishRequest) -> PlatformResult<()> {
        check_request(&self.descriptor, request)?;
        if let Some(slug) = request.custom_url() {
            check_custom_url(slug)?;
        }
        Ok(())
    }

    async fn submit(&self, request: &PublishRequest) -> PlatformResult<String> {
        let name = &self.descriptor.display_name;
        let token = Self::csrf_token();

        let mut form = vec![
            ("csrfmiddlewaretoken", token.as_str()),
            ("text", request.content.as_str()),
        ];
        if let Some(slug) = request.custom_url() {
            debug!("Requesting custom {} URL '{}'", name, slug);
            form.push(("url", slug));
        }

        let response = self
            .client
            .post(http::endpoint(&self.base_url, "/api/new"))
            .header(COOKIE, format!("csrftoken={}", token))
            .header(REFERER, self.base_url.as_str())
            .form(&form)
            .send()
            .await
            .map_err(|e| http::map_reqwest_error(e, name))?;

        let response = http::ensure_success(response, name).await?;
        let body: RentryResponse = http::read_json(response, name).await?;
        self.parse_response(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> RentryPlatform {
        let client = http::build_client("test", std::time::Duration::from_secs(1)).unwrap();
        RentryPlatform::new(client, None)
    }

    fn response(json: &str) -> RentryResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_success() {
        let body = r#"{"status":"200","content":"OK","url":"https://rentry.co/abc12"}"#;
        let url = platform().parse_response(response(body)).unwrap();
        assert_eq!(url, "https://rentry.co/abc12");
    }

    #[test]
    fn test_parse_success_with_numeric_status_and_relative_url() {
        let url = platform()
            .parse_response(response(r#"{"status":200,"url":"/xyz"}"#))
            .unwrap();
        assert_eq!(url, "https://rentry.co/xyz");
    }

    #[test]
    fn test_parse_rejection_reports_errors_field() {
        let body = r#"{"status":"400","content":"Invalid data","errors":"Url already exists."}"#;
        let err = platform().parse_response(response(body)).unwrap_err();
        assert!(matches!(err, PlatformError::Validation(_)));
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_parse_success_without_url_is_malformed() {
        let err = platform()
            .parse_response(response(r#"{"status":"200","content":"OK"}"#))
            .unwrap_err();
        assert!(matches!(err, PlatformError::MalformedResponse(_)));
    }

    #[test]
    fn test_csrf_token_shape() {
        let token = RentryPlatform::csrf_token();
        assert_eq!(token.len(), CSRF_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, RentryPlatform::csrf_token());
    }

    #[test]
    fn test_custom_url_validation() {
        assert!(check_custom_url("my-notes_2").is_ok());
        assert!(check_custom_url("a").is_err());
        assert!(check_custom_url("has space").is_err());
        assert!(check_custom_url("ümlaut").is_err());
        assert!(check_custom_url(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_request_checks_slug() {
        let platform = platform();
        let request = PublishRequest::new("body").with_custom_url("bad slug!");
        assert!(platform.validate_request(&request).is_err());

        let request = PublishRequest::new("body").with_custom_url("good-slug");
        assert!(platform.validate_request(&request).is_ok());
    }
}

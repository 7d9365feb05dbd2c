//! Paste.rs adapter
//!
//! `POST /` with the raw content as body. The service answers `201 Created`
//! with the paste URL as plain text, or `206 Partial Content` when the body
//! went over its limit and only a prefix was stored.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::{PlatformError, PlatformResult};
use crate::platforms::{http, Platform};
use crate::types::{PlatformDescriptor, PublishRequest};

pub const DEFAULT_BASE_URL: &str = "https://paste.rs";

pub struct PasteRsPlatform {
    client: Client,
    base_url: String,
    descriptor: PlatformDescriptor,
}

impl PasteRsPlatform {
    pub fn new(client: Client, base_url: Option<&str>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
            descriptor: Self::describe(),
        }
    }

    pub fn describe() -> PlatformDescriptor {
        PlatformDescriptor::new("paste-rs", "Paste.rs")
            .aliases(&["pasters", "paste.rs"])
            .max_content_bytes(1024 * 1024)
    }
}

#[async_trait]
impl Platform for PasteRsPlatform {
    fn descriptor(&self) -> &PlatformDescriptor {
        &self.descriptor
    }

    async fn submit(&self, request: &PublishRequest) -> PlatformResult<String> {
        let name = &self.descriptor.display_name;
        debug!("Uploading {} bytes to {}", request.content_len(), name);

        let response = self
            .client
            .post(http::endpoint(&self.base_url, "/"))
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(request.content.clone())
            .send()
            .await
            .map_err(|e| http::map_reqwest_error(e, name))?;

        if response.status() == StatusCode::PARTIAL_CONTENT {
            return Err(PlatformError::Validation(format!(
                "{} stored only part of the content; it exceeds the server limit",
                name
            )));
        }

        let response = http::ensure_success(response, name).await?;
        let body = http::read_text(response, name).await?;
        http::url_from_body(&body, &self.base_url, name)
    }
}

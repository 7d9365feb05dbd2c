//! Hastebin adapter
//!
//! Any haste-server instance: `POST /documents` with the raw content returns
//! `{"key": "..."}` and the paste lives at `<base>/<key>`. When the request
//! carries a filename with an extension, it is appended so the viewer picks
//! the right highlighting.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{PlatformError, PlatformResult};
use crate::platforms::{http, Platform};
use crate::types::{PlatformDescriptor, PublishRequest};

/// Public no-auth haste-server instance
pub const DEFAULT_BASE_URL: &str = "https://hastebin.skyra.pw";

pub struct HastebinPlatform {
    client: Client,
    base_url: String,
    descriptor: PlatformDescriptor,
}

#[derive(Debug, Deserialize)]
struct HasteResponse {
    key: Option<String>,
    message: Option<String>,
}

impl HastebinPlatform {
    pub fn new(client: Client, base_url: Option<&str>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
            descriptor: Self::describe(),
        }
    }

    pub fn describe() -> PlatformDescriptor {
        PlatformDescriptor::new("hastebin", "Hastebin")
            .aliases(&["haste", "toptal"])
            .max_content_bytes(400_000)
    }

    fn document_url(
        &self,
        body: HasteResponse,
        request: &PublishRequest,
    ) -> PlatformResult<String> {
        let name = &self.descriptor.display_name;

        let key = body
            .key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                let detail = body.message.unwrap_or_else(|| "no document key".to_string());
                PlatformError::MalformedResponse(format!("{} response: {}", name, detail))
            })?;

        let path = match extension(request) {
            Some(ext) => format!("{}.{}", key, ext),
            None => key,
        };

        http::absolutize(&http::endpoint(&self.base_url, &path), &self.base_url, name)
    }
}

fn extension(request: &PublishRequest) -> Option<&str> {
    request
        .filename()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
}

#[async_trait]
impl Platform for HastebinPlatform {
    fn descriptor(&self) -> &PlatformDescriptor {
        &self.descriptor
    }

    async fn submit(&self, request: &PublishRequest) -> PlatformResult<String> {
        let name = &self.descriptor.display_name;

        let response = self
            .client
            .post(http::endpoint(&self.base_url, "/documents"))
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(request.content.clone())
            .send()
            .await
            .map_err(|e| http::map_reqwest_error(e, name))?;

        let response = http::ensure_success(response, name).await?;
        let body: HasteResponse = http::read_json(response, name).await?;
        self.document_url(body, request)
    }
}

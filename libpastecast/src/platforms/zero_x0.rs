//! 0x0.st adapter
//!
//! The null pointer file host takes a multipart upload in the `file` field and
//! answers with the URL on a single line.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

use crate::error::PlatformResult;
use crate::platforms::{http, upload_filename, Platform};
use crate::types::{PlatformDescriptor, PublishRequest};

pub const DEFAULT_BASE_URL: &str = "https://0x0.st";

pub struct ZeroX0Platform {
    client: Client,
    base_url: String,
    descriptor: PlatformDescriptor,
}

impl ZeroX0Platform {
    pub fn new(client: Client, base_url: Option<&str>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
            descriptor: Self::describe(),
        }
    }

    pub fn describe() -> PlatformDescriptor {
        PlatformDescriptor::new("0x0", "0x0.st")
            .aliases(&["0x0.st", "nullpointer"])
            .file_host()
            .max_content_bytes(512 * 1024 * 1024)
    }
}

pub(crate) fn text_part(request: &PublishRequest, platform: &str) -> PlatformResult<Part> {
    Part::text(request.content.clone())
        .file_name(upload_filename(request))
        .mime_str("text/plain")
        .map_err(|e| http::map_reqwest_error(e, platform))
}

#[async_trait]
impl Platform for ZeroX0Platform {
    fn descriptor(&self) -> &PlatformDescriptor {
        &self.descriptor
    }

    async fn submit(&self, request: &PublishRequest) -> PlatformResult<String> {
        let name = &self.descriptor.display_name;
        debug!(
            "Uploading {} bytes as {} to {}",
            request.content_len(),
            upload_filename(request),
            name
        );

        let form = Form::new().part("file", text_part(request, name)?);

        let response = self
            .client
            .post(http::endpoint(&self.base_url, "/"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| http::map_reqwest_error(e, name))?;

        let response = http::ensure_success(response, name).await?;
        let body = http::read_text(response, name).await?;
        http::url_from_body(&body, &self.base_url, name)
    }
}

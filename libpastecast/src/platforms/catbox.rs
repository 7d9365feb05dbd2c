//! Catbox adapter
//!
//! Anonymous uploads go to `POST /user/api.php` as multipart with
//! `reqtype=fileupload` and an empty `userhash`. The reply is the file URL as
//! plain text; anything else (catbox sends bare error strings with 200) is
//! treated as a malformed response.

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;

use crate::error::{PlatformError, PlatformResult};
use crate::platforms::{http, zero_x0::text_part, Platform};
use crate::types::{PlatformDescriptor, PublishRequest};

pub const DEFAULT_BASE_URL: &str = "https://catbox.moe";

pub struct CatboxPlatform {
    client: Client,
    base_url: String,
    descriptor: PlatformDescriptor,
}

impl CatboxPlatform {
    pub fn new(client: Client, base_url: Option<&str>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
            descriptor: Self::describe(),
        }
    }

    pub fn describe() -> PlatformDescriptor {
        PlatformDescriptor::new("catbox", "Catbox")
            .aliases(&["catbox.moe"])
            .file_host()
            .max_content_bytes(200 * 1024 * 1024)
    }
}

fn parse_body(body: &str, base: &str, platform: &str) -> PlatformResult<String> {
    let line = body.trim();
    if !line.starts_with("http") {
        return Err(PlatformError::MalformedResponse(format!(
            "{} did not return a file URL: {}",
            platform,
            line.chars().take(200).collect::<String>()
        )));
    }
    http::url_from_body(line, base, platform)
}

#[async_trait]
impl Platform for CatboxPlatform {
    fn descriptor(&self) -> &PlatformDescriptor {
        &self.descriptor
    }

    async fn submit(&self, request: &PublishRequest) -> PlatformResult<String> {
        let name = &self.descriptor.display_name;

        let form = Form::new()
            .text("reqtype", "fileupload")
            .text("userhash", "")
            .part("fileToUpload", text_part(request, name)?);

        let response = self
            .client
            .post(http::endpoint(&self.base_url, "/user/api.php"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| http::map_reqwest_error(e, name))?;

        let response = http::ensure_success(response, name).await?;
        let body = http::read_text(response, name).await?;
        parse_body(&body, &self.base_url, name)
    }
}

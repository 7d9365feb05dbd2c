//! Dpaste adapter
//!
//! Uses the dpaste.com v2 API: a form-encoded `POST /api/v2/`. On success the
//! service replies `201 Created` with the paste URL both in the `Location`
//! header and as the body.

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::Client;
use tracing::debug;

use crate::error::PlatformResult;
use crate::platforms::{http, Platform};
use crate::types::{PlatformDescriptor, PublishRequest};

pub const DEFAULT_BASE_URL: &str = "https://dpaste.com";

/// Days before dpaste removes the paste
const EXPIRY_DAYS: &str = "7";

pub struct DpastePlatform {
    client: Client,
    base_url: String,
    descriptor: PlatformDescriptor,
}

impl DpastePlatform {
    pub fn new(client: Client, base_url: Option<&str>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
            descriptor: Self::describe(),
        }
    }

    pub fn describe() -> PlatformDescriptor {
        PlatformDescriptor::new("dpaste", "Dpaste")
            .aliases(&["dpaste.com"])
            .supports_title()
            .max_content_bytes(250_000)
    }

    fn form<'a>(request: &'a PublishRequest) -> Vec<(&'static str, &'a str)> {
        let mut form = vec![
            ("content", request.content.as_str()),
            ("syntax", "text"),
            ("expiry_days", EXPIRY_DAYS),
        ];
        if let Some(title) = request.title() {
            form.push(("title", title));
        }
        form
    }
}

#[async_trait]
impl Platform for DpastePlatform {
    fn descriptor(&self) -> &PlatformDescriptor {
        &self.descriptor
    }

    async fn submit(&self, request: &PublishRequest) -> PlatformResult<String> {
        let name = &self.descriptor.display_name;
        debug!("Creating {} paste ({} bytes)", name, request.content_len());

        let response = self
            .client
            .post(http::endpoint(&self.base_url, "/api/v2/"))
            .form(&Self::form(request))
            .send()
            .await
            .map_err(|e| http::map_reqwest_error(e, name))?;

        let response = http::ensure_success(response, name).await?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        match location {
            Some(location) => http::absolutize(&location, &self.base_url, name),
            None => {
                let body = http::read_text(response, name).await?;
                http::url_from_body(&body, &self.base_url, name)
            }
        }
    }
}

//! Platform abstraction and implementations
//!
//! Every supported "no-login" host lives behind the [`Platform`] trait. An
//! adapter knows how to turn a [`PublishRequest`] into exactly one HTTP call
//! against its host and how to dig the resulting URL out of whatever the host
//! sends back. Adapters never retry and never time themselves out; both are
//! the job of [`crate::publisher`].
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//! use libpastecast::platforms::{http, paste_rs::PasteRsPlatform, Platform};
//! use libpastecast::types::PublishRequest;
//!
//! # async fn example() -> libpastecast::error::PlatformResult<()> {
//! let client = http::build_client("pastecast-docs", Duration::from_secs(15)).unwrap();
//! let platform = PasteRsPlatform::new(client, None);
//!
//! let url = platform.publish(&PublishRequest::new("Hello, world!")).await?;
//! println!("Published to {}", url);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::{PlatformError, PlatformResult};
use crate::types::{PlatformDescriptor, PublishRequest};

pub mod catbox;
pub mod dpaste;
pub mod hastebin;
pub mod http;
pub mod paste_rs;
pub mod rentry;
pub mod telegraph;
pub mod zero_x0;

// Mock platform is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Filename used by file hosts when the request does not name one
pub const DEFAULT_FILENAME: &str = "paste.txt";

/// Unified interface over one publishing backend
#[async_trait]
pub trait Platform: Send + Sync {
    /// Static capabilities and names of this platform
    fn descriptor(&self) -> &PlatformDescriptor;

    /// Canonical key, e.g. "paste-rs"
    fn name(&self) -> &str {
        &self.descriptor().key
    }

    /// Client-side checks run before any network traffic
    ///
    /// The default rejects empty content and content above
    /// `max_content_bytes`. Adapters with extra constraints (slug format,
    /// title length) override this and call [`check_request`] first.
    fn validate_request(&self, request: &PublishRequest) -> PlatformResult<()> {
        check_request(self.descriptor(), request)
    }

    /// Perform the platform call and return the absolute URL of the result
    ///
    /// Implementations make exactly one outbound request and must not
    /// retry. Callers should go through [`Platform::publish`].
    async fn submit(&self, request: &PublishRequest) -> PlatformResult<String>;

    /// Validate, then submit
    async fn publish(&self, request: &PublishRequest) -> PlatformResult<String> {
        self.validate_request(request)?;
        self.submit(request).await
    }
}

/// Shared validation: non-empty content within the size ceiling
pub fn check_request(
    descriptor: &PlatformDescriptor,
    request: &PublishRequest,
) -> PlatformResult<()> {
    if request.content.trim().is_empty() {
        return Err(PlatformError::Validation(
            "Content cannot be empty".to_string(),
        ));
    }

    if let Some(limit) = descriptor.max_content_bytes {
        let size = request.content_len();
        if size > limit {
            return Err(PlatformError::Validation(format!(
                "Content exceeds {}'s {} byte limit (got {} bytes)",
                descriptor.display_name, limit, size
            )));
        }
    }

    Ok(())
}

/// Filename for file-host uploads
pub(crate) fn upload_filename(request: &PublishRequest) -> String {
    request
        .filename()
        .map(|name| {
            name.rsplit(['/', '\\'])
                .next()
                .unwrap_or(name)
                .to_string()
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

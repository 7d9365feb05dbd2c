//! Telegraph adapter
//!
//! Telegraph pages need an access token. We create one anonymous account per
//! process on first use (`createAccount`) and cache its token; after that each
//! publish is a single `createPage` call.
//!
//! Content is sent as Telegraph nodes: blank-line separated blocks become
//! `<p>` elements, single newlines inside a block become `<br>`.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{PlatformError, PlatformResult};
use crate::platforms::{check_request, http, Platform};
use crate::types::{PlatformDescriptor, PublishRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.telegra.ph";

const ACCOUNT_SHORT_NAME: &str = "pastecast";
/// Telegraph caps the serialized node tree, not the source text
const MAX_CONTENT_BYTES: usize = 64 * 1024;
const MAX_TITLE_CHARS: usize = 256;
const MAX_AUTHOR_CHARS: usize = 128;
const UNTITLED: &str = "Untitled";

pub struct TelegraphPlatform {
    client: Client,
    base_url: String,
    descriptor: PlatformDescriptor,
    access_token: OnceCell<String>,
}

/// Envelope shared by every Telegraph API method
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Account {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Page {
    url: String,
}

#[derive(Debug, Serialize)]
struct CreatePage<'a> {
    access_token: &'a str,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author_name: Option<String>,
    content: Vec<Value>,
    return_content: bool,
}

impl TelegraphPlatform {
    pub fn new(client: Client, base_url: Option<&str>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
            descriptor: Self::describe(),
            access_token: OnceCell::new(),
        }
    }

    pub fn describe() -> PlatformDescriptor {
        PlatformDescriptor::new("telegraph", "Telegraph")
            .aliases(&["telegra.ph", "telegra-ph"])
            .supports_title()
            .max_content_bytes(MAX_CONTENT_BYTES)
    }

    async fn call<B: Serialize + Sync + ?Sized, T: DeserializeOwned + Send>(
        &self,
        method: &str,
        body: &B,
    ) -> PlatformResult<T> {
        let name = &self.descriptor.display_name;

        let response = self
            .client
            .post(http::endpoint(&self.base_url, method))
            .json(body)
            .send()
            .await
            .map_err(|e| http::map_reqwest_error(e, name))?;

        let response = http::ensure_success(response, name).await?;
        let envelope: ApiResponse<T> = http::read_json(response, name).await?;
        unwrap_envelope(envelope, method)
    }

    async fn token(&self) -> PlatformResult<&str> {
        let token = self
            .access_token
            .get_or_try_init(|| async {
                debug!("Creating anonymous Telegraph account");
                let account: Account = self
                    .call(
                        "createAccount",
                        &json!({
                            "short_name": ACCOUNT_SHORT_NAME,
                            "author_name": ACCOUNT_SHORT_NAME,
                        }),
                    )
                    .await?;
                info!("Telegraph account ready");
                Ok::<_, PlatformError>(account.access_token)
            })
            .await?;
        Ok(token.as_str())
    }
}

fn unwrap_envelope<T>(envelope: ApiResponse<T>, method: &str) -> PlatformResult<T> {
    if !envelope.ok {
        let error = envelope.error.unwrap_or_else(|| "unknown error".to_string());
        return Err(api_error(&error));
    }
    envelope.result.ok_or_else(|| {
        PlatformError::MalformedResponse(format!("Telegraph {} returned no result", method))
    })
}

fn api_error(error: &str) -> PlatformError {
    if error.starts_with("FLOOD_WAIT") {
        return PlatformError::RateLimit(format!("Telegraph: {}", error));
    }
    PlatformError::Validation(format!("Telegraph rejected the page: {}", error))
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Page title: the explicit title, else the first non-empty line
fn page_title(request: &PublishRequest) -> String {
    request
        .title()
        .or_else(|| {
            request
                .content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
        })
        .map(|title| truncate_chars(title, MAX_TITLE_CHARS))
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn content_nodes(content: &str) -> Vec<Value> {
    let normalized = content.replace("\r\n", "\n");

    normalized
        .split("\n\n")
        .map(|block| block.trim_matches('\n'))
        .filter(|block| !block.trim().is_empty())
        .map(|block| {
            let mut children = Vec::new();
            for (i, line) in block.lines().enumerate() {
                if i > 0 {
                    children.push(json!({ "tag": "br" }));
                }
                children.push(Value::String(line.to_string()));
            }
            json!({ "tag": "p", "children": children })
        })
        .collect()
}

#[async_trait]
impl Platform for TelegraphPlatform {
    fn descriptor(&self) -> &PlatformDescriptor {
        &self.descriptor
    }

    fn validate_request(&self, request: &PublishRequest) -> PlatformResult<()> {
        check_request(&self.descriptor, request)?;

        let nodes = serde_json::to_vec(&content_nodes(&request.content))
            .map_err(|e| PlatformError::Validation(format!("Unencodable content: {}", e)))?;
        if nodes.len() > MAX_CONTENT_BYTES {
            return Err(PlatformError::Validation(format!(
                "Content exceeds Telegraph's {} byte limit once encoded (got {} bytes)",
                MAX_CONTENT_BYTES,
                nodes.len()
            )));
        }

        if let Some(title) = request.title() {
            if title.chars().count() > MAX_TITLE_CHARS {
                return Err(PlatformError::Validation(format!(
                    "Telegraph titles are limited to {} characters",
                    MAX_TITLE_CHARS
                )));
            }
        }
        Ok(())
    }

    async fn submit(&self, request: &PublishRequest) -> PlatformResult<String> {
        let access_token = self.token().await?;

        let page = CreatePage {
            access_token,
            title: page_title(request),
            author_name: request.author().map(|a| truncate_chars(a, MAX_AUTHOR_CHARS)),
            content: content_nodes(&request.content),
            return_content: false,
        };

        let created: Page = self.call("createPage", &page).await?;
        http::absolutize(&created.url, "https://telegra.ph", &self.descriptor.display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_title_fallbacks() {
        assert_eq!(page_title(&PublishRequest::new("body").with_title("Notes")), "Notes");
        assert_eq!(page_title(&PublishRequest::new("\n  First line\nsecond")), "First line");

        let long = "t".repeat(300);
        assert_eq!(page_title(&PublishRequest::new(long)).chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_content_nodes_paragraphs_and_breaks() {
        let nodes = content_nodes("one\ntwo\n\nthree");
        assert_eq!(
            nodes,
            vec![
                json!({"tag": "p", "children": ["one", {"tag": "br"}, "two"]}),
                json!({"tag": "p", "children": ["three"]}),
            ]
        );
    }

    #[test]
    fn test_content_nodes_skip_empty_blocks() {
        let nodes = content_nodes("\r\n\r\nonly\r\n\r\n\r\n\r\n");
        assert_eq!(nodes, vec![json!({"tag": "p", "children": ["only"]})]);
    }

    #[test]
    fn test_unwrap_envelope() {
        let ok: ApiResponse<Page> =
            serde_json::from_str(r#"{"ok":true,"result":{"url":"https://telegra.ph/Notes-01-01"}}"#)
                .unwrap();
        assert_eq!(
            unwrap_envelope(ok, "createPage").unwrap().url,
            "https://telegra.ph/Notes-01-01"
        );

        let rejected: ApiResponse<Page> =
            serde_json::from_str(r#"{"ok":false,"error":"CONTENT_TOO_BIG"}"#).unwrap();
        let err = unwrap_envelope(rejected, "createPage").unwrap_err();
        assert!(matches!(err, PlatformError::Validation(_)));
        assert!(err.to_string().contains("CONTENT_TOO_BIG"));

        let flood: ApiResponse<Page> =
            serde_json::from_str(r#"{"ok":false,"error":"FLOOD_WAIT_7"}"#).unwrap();
        assert!(matches!(
            unwrap_envelope(flood, "createPage").unwrap_err(),
            PlatformError::RateLimit(_)
        ));

        let empty: ApiResponse<Page> = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(matches!(
            unwrap_envelope(empty, "createPage").unwrap_err(),
            PlatformError::MalformedResponse(_)
        ));
    }

    fn platform() -> TelegraphPlatform {
        let client = http::build_client("test", std::time::Duration::from_secs(1)).unwrap();
        TelegraphPlatform::new(client, None)
    }

    #[test]
    fn test_validate_rejects_long_title() {
        let request = PublishRequest::new("body").with_title("t".repeat(257));
        assert!(platform().validate_request(&request).is_err());
    }

    #[test]
    fn test_validate_measures_encoded_nodes() {
        // 60 000 raw bytes, but every newline costs a {"tag":"br"} node
        let many_lines = "a\n".repeat(30_000);
        assert!(many_lines.len() < MAX_CONTENT_BYTES);

        let err = platform()
            .validate_request(&PublishRequest::new(many_lines))
            .unwrap_err();
        assert!(matches!(err, PlatformError::Validation(_)));
        assert!(err.to_string().contains("once encoded"));

        let prose = "word ".repeat(10_000);
        assert!(platform().validate_request(&PublishRequest::new(prose)).is_ok());
    }
}

//! Core types for Pastecast

use serde::{Deserialize, Serialize};

use crate::error::{PastecastError, Result};

/// Content to publish, shared read-only by every adapter of one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
}

impl PublishRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: None,
            author: None,
            filename: None,
            custom_url: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_custom_url(mut self, custom_url: impl Into<String>) -> Self {
        self.custom_url = Some(custom_url.into());
        self
    }

    /// Precondition shared by the single and bulk paths
    ///
    /// Whitespace-only content counts as empty.
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(PastecastError::InvalidInput(
                "Content cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Size of the content body in bytes
    pub fn content_len(&self) -> usize {
        self.content.len()
    }

    /// Title if set and not blank
    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    pub fn author(&self) -> Option<&str> {
        non_blank(self.author.as_deref())
    }

    pub fn filename(&self) -> Option<&str> {
        non_blank(self.filename.as_deref())
    }

    pub fn custom_url(&self) -> Option<&str> {
        non_blank(self.custom_url.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Static description of a registered platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDescriptor {
    /// Canonical lowercase identifier
    pub key: String,
    pub aliases: Vec<String>,
    pub display_name: String,
    pub supports_title: bool,
    pub supports_custom_url: bool,
    pub is_file_host: bool,
    /// Client-side content ceiling in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_content_bytes: Option<usize>,
}

impl PlatformDescriptor {
    pub fn new(key: &str, display_name: &str) -> Self {
        Self {
            key: key.to_lowercase(),
            aliases: Vec::new(),
            display_name: display_name.to_string(),
            supports_title: false,
            supports_custom_url: false,
            is_file_host: false,
            max_content_bytes: None,
        }
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_lowercase()).collect();
        self
    }

    pub fn supports_title(mut self) -> Self {
        self.supports_title = true;
        self
    }

    pub fn supports_custom_url(mut self) -> Self {
        self.supports_custom_url = true;
        self
    }

    pub fn file_host(mut self) -> Self {
        self.is_file_host = true;
        self
    }

    pub fn max_content_bytes(mut self, limit: usize) -> Self {
        self.max_content_bytes = Some(limit);
        self
    }

    /// Canonical key followed by every alias
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Normalized result of one publish attempt on one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub platform: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl PublishOutcome {
    pub fn success(platform: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            success: true,
            url: Some(url.into()),
            error: None,
            latency_ms: None,
        }
    }

    pub fn failure(platform: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            success: false,
            url: None,
            error: Some(error.into()),
            latency_ms: None,
        }
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

/// Ordered aggregate of a bulk publish
///
/// Built only by [`crate::aggregate::aggregate`], so `successful` and `total`
/// always match `results`. Deserializing recounts them from `results`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SummaryRecord")]
pub struct PublishSummary {
    pub(crate) results: Vec<PublishOutcome>,
    pub(crate) successful: usize,
    pub(crate) total: usize,
}

#[derive(Deserialize)]
struct SummaryRecord {
    results: Vec<PublishOutcome>,
}

impl From<SummaryRecord> for PublishSummary {
    fn from(record: SummaryRecord) -> Self {
        crate::aggregate::aggregate(record.results)
    }
}

impl PublishSummary {
    /// Outcomes in selection order
    pub fn results(&self) -> &[PublishOutcome] {
        &self.results
    }

    pub fn into_results(self) -> Vec<PublishOutcome> {
        self.results
    }

    pub fn successful(&self) -> usize {
        self.successful
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Bulk publish counts as useful when any single platform worked
    pub fn is_success(&self) -> bool {
        self.successful > 0
    }

    /// Human-readable one-liner for the boundary layer
    pub fn message(&self) -> String {
        if self.total == 0 {
            "No platforms selected".to_string()
        } else if self.successful == self.total {
            format!("Published to {}", plural_platforms(self.total))
        } else if self.successful == 0 {
            format!("Failed to publish to {}", plural_platforms(self.total))
        } else {
            format!(
                "Published to {} of {} platforms",
                self.successful, self.total
            )
        }
    }

    /// Wrap into the response shape returned to callers of the bulk path
    pub fn into_response(self) -> BulkPublishResponse {
        BulkPublishResponse {
            success: self.is_success(),
            message: self.message(),
            summary: self,
        }
    }
}

fn plural_platforms(count: usize) -> String {
    if count == 1 {
        "1 platform".to_string()
    } else {
        format!("{} platforms", count)
    }
}

/// Bulk response: `{ success, message, results, successful, total }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkPublishResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub summary: PublishSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;

    #[test]
    fn test_validate_rejects_empty_content() {
        assert!(PublishRequest::new("").validate().is_err());
        assert!(PublishRequest::new("   \n\t").validate().is_err());
        assert!(PublishRequest::new("hello").validate().is_ok());
    }

    #[test]
    fn test_blank_optionals_are_ignored() {
        let request = PublishRequest::new("body")
            .with_title("  ")
            .with_author(" Ada ")
            .with_custom_url("");

        assert_eq!(request.title(), None);
        assert_eq!(request.author(), Some("Ada"));
        assert_eq!(request.custom_url(), None);
        assert_eq!(request.filename(), None);
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: PublishRequest = serde_json::from_str(
            r#"{"content":"hi","title":"t","customUrl":"my-page"}"#,
        )
        .unwrap();

        assert_eq!(request.content, "hi");
        assert_eq!(request.title(), Some("t"));
        assert_eq!(request.custom_url(), Some("my-page"));
        assert!(request.author.is_none());
    }

    #[test]
    fn test_descriptor_names_lowercased() {
        let descriptor = PlatformDescriptor::new("Paste-RS", "Paste.rs").aliases(&["PASTERS"]);
        let names: Vec<&str> = descriptor.names().collect();
        assert_eq!(names, vec!["paste-rs", "pasters"]);
    }

    #[test]
    fn test_outcome_serialization_skips_empty_fields() {
        let outcome = PublishOutcome::failure("dpaste", "timeout");
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["platform"], "dpaste");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "timeout");
        assert!(json.get("url").is_none());
        assert!(json.get("latencyMs").is_none());

        let outcome = PublishOutcome::success("rentry", "https://rentry.co/abc").with_latency(42);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["url"], "https://rentry.co/abc");
        assert_eq!(json["latencyMs"], 42);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_summary_messages() {
        let summary = aggregate(vec![]);
        assert_eq!(summary.message(), "No platforms selected");
        assert!(!summary.is_success());

        let summary = aggregate(vec![
            PublishOutcome::success("a", "https://a/1"),
            PublishOutcome::failure("b", "timeout"),
            PublishOutcome::success("c", "https://c/1"),
        ]);
        assert_eq!(summary.message(), "Published to 2 of 3 platforms");
        assert!(summary.is_success());

        let summary = aggregate(vec![
            PublishOutcome::failure("a", "timeout"),
            PublishOutcome::failure("b", "timeout"),
            PublishOutcome::failure("c", "timeout"),
        ]);
        assert_eq!(summary.message(), "Failed to publish to 3 platforms");
    }

    #[test]
    fn test_deserialized_summary_recounts_results() {
        let json = serde_json::json!({
            "results": [
                { "platform": "a", "success": true, "url": "https://a/1" },
                { "platform": "b", "success": false, "error": "timeout" }
            ],
            "successful": 7,
            "total": 9
        });

        let summary: PublishSummary = serde_json::from_value(json).unwrap();
        assert_eq!(summary.successful(), 1);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.results()[1].platform, "b");
    }

    #[test]
    fn test_bulk_response_is_flat() {
        let summary = aggregate(vec![PublishOutcome::success("a", "https://a/1")]);

        let json = serde_json::to_value(summary.into_response()).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["successful"], 1);
        assert_eq!(json["total"], 1);
        assert_eq!(json["results"][0]["url"], "https://a/1");
        assert_eq!(json["message"], "Published to 1 platform");
    }
}

//! Mock platform implementation for testing
//!
//! A configurable in-memory platform that can simulate successes, failures,
//! latency and adapter panics. It is compiled into every build so the
//! integration tests and the CLI tests can drive the coordinator without any
//! network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{PlatformError, PlatformResult};
use crate::platforms::Platform;
use crate::types::{PlatformDescriptor, PublishRequest};

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Canonical key (e.g. "mock-a")
    pub name: String,

    /// Extra names the registry should resolve to this platform
    pub aliases: Vec<String>,

    /// Fixed URL to return; a unique one is generated when `None`
    pub url: Option<String>,

    /// Error returned by every submit
    pub error: Option<PlatformError>,

    /// Number of leading submits that fail with `error` before succeeding
    ///
    /// `None` means every submit fails when `error` is set.
    pub fail_times: Option<usize>,

    /// Delay before completing (simulates network latency)
    pub delay: Duration,

    /// Panic inside submit with this message
    pub panic_message: Option<String>,

    /// Content size ceiling enforced by validation
    pub max_content_bytes: Option<usize>,

    /// Number of times submit has been called
    pub submit_call_count: Arc<Mutex<usize>>,

    /// Requests that reached submit (for verification)
    pub received: Arc<Mutex<Vec<PublishRequest>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            aliases: Vec::new(),
            url: None,
            error: None,
            fail_times: None,
            delay: Duration::from_millis(0),
            panic_message: None,
            max_content_bytes: None,
            submit_call_count: Arc::new(Mutex::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,
    descriptor: PlatformDescriptor,
}

impl MockPlatform {
    /// Create a new mock platform with the given configuration
    pub fn new(config: MockConfig) -> Self {
        let aliases: Vec<&str> = config.aliases.iter().map(String::as_str).collect();
        let mut descriptor = PlatformDescriptor::new(&config.name, &format!("Mock {}", config.name))
            .aliases(&aliases);
        if let Some(limit) = config.max_content_bytes {
            descriptor = descriptor.max_content_bytes(limit);
        }

        Self { config, descriptor }
    }

    /// A platform that always succeeds with a generated URL
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// A platform that always succeeds with `url`
    pub fn with_url(name: &str, url: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            url: Some(url.to_string()),
            ..Default::default()
        })
    }

    /// A platform whose every submit fails with `error`
    pub fn failure(name: &str, error: PlatformError) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            error: Some(error),
            ..Default::default()
        })
    }

    /// A platform that fails `times` submits with `error`, then succeeds
    pub fn flaky(name: &str, times: usize, error: PlatformError) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            error: Some(error),
            fail_times: Some(times),
            ..Default::default()
        })
    }

    /// A platform that succeeds after `delay`
    pub fn with_delay(name: &str, delay: Duration) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            delay,
            ..Default::default()
        })
    }

    /// A platform that never answers within any reasonable deadline
    pub fn hanging(name: &str) -> Self {
        Self::with_delay(name, Duration::from_secs(3600))
    }

    /// A platform whose submit panics
    pub fn panicking(name: &str, message: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            panic_message: Some(message.to_string()),
            ..Default::default()
        })
    }

    /// A platform with a content size ceiling
    pub fn with_limit(name: &str, limit: usize) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            max_content_bytes: Some(limit),
            ..Default::default()
        })
    }

    /// Add resolvable aliases
    pub fn aliased(mut self, aliases: &[&str]) -> Self {
        self.config.aliases = aliases.iter().map(|a| a.to_string()).collect();
        Self::new(self.config)
    }

    /// Number of times submit was called
    pub fn submit_call_count(&self) -> usize {
        *self
            .config
            .submit_call_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Every request that reached submit
    pub fn received(&self) -> Vec<PublishRequest> {
        self.config
            .received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, request: &PublishRequest) -> usize {
        let mut count = self
            .config
            .submit_call_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *count += 1;

        self.config
            .received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        *count
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn descriptor(&self) -> &PlatformDescriptor {
        &self.descriptor
    }

    async fn submit(&self, request: &PublishRequest) -> PlatformResult<String> {
        let attempt = self.record(request);

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        if let Some(message) = &self.config.panic_message {
            panic!("{}", message);
        }

        if let Some(error) = &self.config.error {
            let still_failing = self.config.fail_times.map_or(true, |n| attempt <= n);
            if still_failing {
                return Err(error.clone());
            }
        }

        Ok(self.config.url.clone().unwrap_or_else(|| {
            format!("https://{}.mock/{}", self.config.name, uuid::Uuid::new_v4())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_success() {
        let platform = MockPlatform::success("test");

        assert_eq!(platform.name(), "test");
        assert_eq!(platform.descriptor().max_content_bytes, None);

        let url = platform.publish(&PublishRequest::new("Test content")).await.unwrap();
        assert!(url.starts_with("https://test.mock/"));
        assert_eq!(platform.submit_call_count(), 1);

        let received = platform.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].content, "Test content");
    }

    #[tokio::test]
    async fn test_mock_fixed_url() {
        let platform = MockPlatform::with_url("a", "https://a.example/1");
        let url = platform.publish(&PublishRequest::new("x")).await.unwrap();
        assert_eq!(url, "https://a.example/1");
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let platform = MockPlatform::failure("test", PlatformError::Network("boom".to_string()));

        let err = platform.publish(&PublishRequest::new("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "Network error: boom");
        assert_eq!(platform.submit_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_flaky_recovers() {
        let platform = MockPlatform::flaky("test", 2, PlatformError::Network("blip".to_string()));
        let request = PublishRequest::new("x");

        assert!(platform.publish(&request).await.is_err());
        assert!(platform.publish(&request).await.is_err());
        assert!(platform.publish(&request).await.is_ok());
        assert_eq!(platform.submit_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_with_delay() {
        let platform = MockPlatform::with_delay("test", Duration::from_millis(50));

        let start = std::time::Instant::now();
        platform.publish(&PublishRequest::new("x")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_mock_with_limit_validates_before_submit() {
        let platform = MockPlatform::with_limit("test", 4);

        let err = platform.publish(&PublishRequest::new("too long")).await.unwrap_err();
        assert!(matches!(err, PlatformError::Validation(_)));
        assert_eq!(platform.submit_call_count(), 0);
    }

    #[test]
    fn test_mock_aliases() {
        let platform = MockPlatform::success("Mock-A").aliased(&["MA", "alpha"]);
        let names: Vec<&str> = platform.descriptor().names().collect();
        assert_eq!(names, vec!["mock-a", "ma", "alpha"]);
    }
}

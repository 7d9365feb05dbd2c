//! Error types for Pastecast

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PastecastError>;

/// Result of a single adapter call
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

#[derive(Error, Debug)]
pub enum PastecastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{}", .0.error)]
    UnknownPlatform(UnknownPlatform),
}

impl PastecastError {
    /// Returns the appropriate exit code for this error
    ///
    /// Request-level failures (the 400 class at an HTTP boundary) map to 3.
    pub fn exit_code(&self) -> i32 {
        match self {
            PastecastError::InvalidInput(_) => 3,
            PastecastError::UnknownPlatform(_) => 3,
            PastecastError::Platform(_) => 1,
            PastecastError::Config(_) => 1,
            PastecastError::Registry(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("platform name '{name}' is already registered by '{owner}'")]
    DuplicateName { name: String, owner: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Failure of a single publish attempt on one platform
///
/// The `Display` form is what ends up in `PublishOutcome::error`, so a timeout
/// renders as the bare string `timeout`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Adapter fault: {0}")]
    Panicked(String),
}

impl PlatformError {
    /// Whether the coordinator may retry the call
    ///
    /// Connection failures, 429 and 5xx are transient. Everything else is
    /// permanent for the given request.
    pub fn is_transient(&self) -> bool {
        match self {
            PlatformError::Network(_) | PlatformError::RateLimit(_) => true,
            PlatformError::Http { status, .. } => *status >= 500,
            PlatformError::Timeout
            | PlatformError::MalformedResponse(_)
            | PlatformError::Validation(_)
            | PlatformError::Panicked(_) => false,
        }
    }
}

/// Payload reported when a platform name does not resolve
///
/// Serializes as `{ "error": "Unknown platform: <name>", "available": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownPlatform {
    pub error: String,
    pub available: Vec<String>,
}

impl UnknownPlatform {
    pub fn new(name: &str, available: Vec<String>) -> Self {
        Self {
            error: format!("Unknown platform: {}", name),
            available,
        }
    }
}

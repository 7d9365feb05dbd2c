//! Pastecast - publish one piece of text to many no-login paste hosts at once
//!
//! The library is organized leaves first:
//!
//! - [`platforms`]: one adapter per host behind the [`platforms::Platform`] trait
//! - [`registry`]: case-insensitive, alias-aware name lookup
//! - [`publisher`]: concurrent fan-out with per-adapter timeout and panic isolation
//! - [`aggregate`]: reduction of outcomes into a [`PublishSummary`]
//! - [`router`]: single-platform dispatch with unknown-name reporting
//! - [`service`]: facade tying them together, plus progress events

pub mod aggregate;
pub mod config;
pub mod error;
pub mod logging;
pub mod platforms;
pub mod publisher;
pub mod registry;
pub mod router;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{PastecastError, PlatformError, Result};
pub use publisher::{DispatchPolicy, FanOutCoordinator};
pub use registry::PlatformRegistry;
pub use service::PublishService;
pub use types::{
    BulkPublishResponse, PlatformDescriptor, PublishOutcome, PublishRequest, PublishSummary,
};

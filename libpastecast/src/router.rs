//! Single-platform dispatch
//!
//! Resolves one platform name through the registry and runs it through the
//! coordinator, so a single publish gets the same timeout, panic isolation and
//! events as a bulk one. An unresolvable name is a request-level error that
//! lists the canonical keys.

use crate::error::{PastecastError, Result, UnknownPlatform};
use crate::publisher::FanOutCoordinator;
use crate::types::{PublishOutcome, PublishRequest};

#[derive(Clone)]
pub struct DispatchRouter {
    coordinator: FanOutCoordinator,
}

impl DispatchRouter {
    pub fn new(coordinator: FanOutCoordinator) -> Self {
        Self { coordinator }
    }

    /// Publish `request` to the platform called `name`
    ///
    /// Empty content is rejected before the name is looked at. The adapter's
    /// outcome is returned unchanged, failures included.
    pub async fn publish(&self, name: &str, request: &PublishRequest) -> Result<PublishOutcome> {
        request.validate()?;

        let registry = self.coordinator.registry();
        let platform = registry.resolve(name).ok_or_else(|| {
            PastecastError::UnknownPlatform(UnknownPlatform::new(name, registry.keys()))
        })?;

        Ok(self.coordinator.publish_one(platform, request).await)
    }
}

//! Service layer for Pastecast
//!
//! `PublishService` is the single entry point a boundary (CLI, HTTP routes)
//! needs. It owns the shared registry, the coordinator, the router and the
//! event bus, and applies configured defaults such as the bulk selection.
//!
//! # Example
//!
//! ```no_run
//! use libpastecast::service::PublishService;
//! use libpastecast::types::PublishRequest;
//!
//! # async fn example() -> libpastecast::Result<()> {
//! let service = PublishService::new()?;
//! let _events = service.subscribe();
//!
//! let summary = service
//!     .publish_all(&PublishRequest::new("Hello, world!"), None)
//!     .await?;
//! println!("{}", summary.message());
//! # Ok(())
//! # }
//! ```

pub mod events;

use std::sync::Arc;

use self::events::{EventBus, EventReceiver};
use crate::config::Config;
use crate::publisher::{DispatchPolicy, FanOutCoordinator};
use crate::registry::PlatformRegistry;
use crate::router::DispatchRouter;
use crate::types::{PlatformDescriptor, PublishOutcome, PublishRequest, PublishSummary};
use crate::Result;

pub struct PublishService {
    registry: Arc<PlatformRegistry>,
    coordinator: FanOutCoordinator,
    router: DispatchRouter,
    event_bus: EventBus,
    default_selection: Option<Vec<String>>,
}

impl PublishService {
    /// Service over the built-in platforms, configured from the default location
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = PlatformRegistry::with_builtins(config)?;
        let policy = DispatchPolicy::from_config(&config.publish)?;
        Ok(Self::with_registry(registry, policy)
            .with_default_selection(config.defaults.platforms.clone()))
    }

    /// Service over an explicit registry, for custom platforms and tests
    pub fn with_registry(registry: PlatformRegistry, policy: DispatchPolicy) -> Self {
        let registry = Arc::new(registry);
        let event_bus = EventBus::default();
        let coordinator =
            FanOutCoordinator::new(Arc::clone(&registry), policy).with_events(event_bus.clone());
        let router = DispatchRouter::new(coordinator.clone());

        Self {
            registry,
            coordinator,
            router,
            event_bus,
            default_selection: None,
        }
    }

    /// Bulk selection used when `publish_all` receives no platform list
    pub fn with_default_selection(mut self, platforms: Option<Vec<String>>) -> Self {
        self.default_selection = platforms;
        self
    }

    /// Publish to one platform by name or alias
    pub async fn publish(&self, name: &str, request: &PublishRequest) -> Result<PublishOutcome> {
        self.router.publish(name, request).await
    }

    /// Publish to `platforms`, else the configured defaults, else everything
    pub async fn publish_all(
        &self,
        request: &PublishRequest,
        platforms: Option<&[String]>,
    ) -> Result<PublishSummary> {
        let selection = platforms.or(self.default_selection.as_deref());
        self.coordinator.publish_all(request, selection).await
    }

    /// Descriptors of the available platforms, in bulk order
    pub fn platforms(&self) -> Vec<PlatformDescriptor> {
        self.registry.list()
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.event_bus.subscribe()
    }
}

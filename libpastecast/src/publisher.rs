//! Fan-out coordinator
//!
//! Runs one or many platform adapters concurrently and turns every possible
//! ending of an adapter call into exactly one [`PublishOutcome`]:
//!
//! - each selected adapter runs in its own tokio task, so a panic is caught
//!   at the join point and becomes a failure outcome;
//! - each task is wrapped in its own deadline, and a timeout never cancels
//!   siblings;
//! - results are reassembled in selection order regardless of which adapter
//!   finishes first.
//!
//! Transient failures may be retried when the policy allows more than one
//! attempt. The deadline covers the whole retry loop, so the wall-clock bound
//! of a bulk publish stays `timeout` whatever the retry settings.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::config::PublishConfig;
use crate::error::{PlatformError, PlatformResult, Result, UnknownPlatform};
use crate::platforms::Platform;
use crate::registry::PlatformRegistry;
use crate::service::events::{Event, EventBus};
use crate::types::{PublishOutcome, PublishRequest, PublishSummary};

/// Per-adapter timeout and retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Deadline for one adapter, retries included
    pub timeout: Duration,
    /// Attempts per adapter, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each further one
    pub retry_backoff: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_attempts: 1,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

impl DispatchPolicy {
    pub fn from_config(config: &PublishConfig) -> Result<Self> {
        Ok(Self {
            timeout: config.timeout()?,
            max_attempts: config.max_attempts.max(1),
            retry_backoff: config.retry_backoff()?,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_attempts: u32, retry_backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_backoff = retry_backoff;
        self
    }

    /// Delay after failed attempt number `attempt` (1-based)
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_backoff.saturating_mul(factor)
    }
}

/// Call `platform` up to `max_attempts` times, retrying transient errors
async fn publish_with_retry(
    platform: &dyn Platform,
    request: &PublishRequest,
    policy: &DispatchPolicy,
) -> PlatformResult<String> {
    let name = platform.name();
    let mut attempt = 1;

    loop {
        match platform.publish(request).await {
            Ok(url) => {
                if attempt > 1 {
                    info!("Published to {} on attempt {}", name, attempt);
                }
                return Ok(url);
            }
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.backoff(attempt);
                warn!(
                    "Transient error publishing to {} (attempt {}/{}): {}. Retrying in {:?}...",
                    name, attempt, policy.max_attempts, e, delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if attempt > 1 {
                    warn!("Failed to publish to {} after {} attempts: {}", name, attempt, e);
                }
                return Err(e);
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "adapter panicked".to_string()
}

/// Run one adapter in its own task and normalize however it ends
///
/// Never fails: errors, timeouts and panics all come back as a failure
/// outcome carrying the platform's canonical key.
pub async fn dispatch(
    platform: Arc<dyn Platform>,
    request: Arc<PublishRequest>,
    policy: DispatchPolicy,
) -> PublishOutcome {
    let name = platform.name().to_string();
    let started = Instant::now();
    debug!("Dispatching to {}", name);

    let task = tokio::spawn(async move {
        timeout(
            policy.timeout,
            publish_with_retry(platform.as_ref(), &request, &policy),
        )
        .await
    });

    let result = match task.await {
        Ok(Ok(result)) => result,
        Ok(Err(_elapsed)) => Err(PlatformError::Timeout),
        Err(join_error) if join_error.is_panic() => {
            Err(PlatformError::Panicked(panic_message(join_error.into_panic())))
        }
        Err(join_error) => Err(PlatformError::Panicked(join_error.to_string())),
    };

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(url) => {
            info!("Published to {} in {}ms: {}", name, latency_ms, url);
            PublishOutcome::success(name, url).with_latency(latency_ms)
        }
        Err(e) => {
            warn!("Failed to publish to {}: {}", name, e);
            PublishOutcome::failure(name, e.to_string()).with_latency(latency_ms)
        }
    }
}

/// A selected name, resolved or not
enum Target {
    Platform(Arc<dyn Platform>),
    Unknown(String),
}

impl Target {
    fn label(&self) -> String {
        match self {
            Target::Platform(platform) => platform.name().to_string(),
            Target::Unknown(name) => name.clone(),
        }
    }
}

/// Concurrent publisher over a shared registry
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use libpastecast::config::Config;
/// use libpastecast::publisher::{DispatchPolicy, FanOutCoordinator};
/// use libpastecast::registry::PlatformRegistry;
/// use libpastecast::types::PublishRequest;
///
/// # async fn example() -> libpastecast::Result<()> {
/// let config = Config::load()?;
/// let registry = Arc::new(PlatformRegistry::with_builtins(&config)?);
/// let policy = DispatchPolicy::from_config(&config.publish)?;
/// let coordinator = FanOutCoordinator::new(registry, policy);
///
/// let summary = coordinator
///     .publish_all(&PublishRequest::new("Hello, world!"), None)
///     .await?;
/// for outcome in summary.results() {
///     match (&outcome.url, &outcome.error) {
///         (Some(url), _) => println!("{}: {}", outcome.platform, url),
///         (_, Some(error)) => eprintln!("{}: {}", outcome.platform, error),
///         _ => {}
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FanOutCoordinator {
    registry: Arc<PlatformRegistry>,
    policy: DispatchPolicy,
    events: Option<EventBus>,
}

impl FanOutCoordinator {
    pub fn new(registry: Arc<PlatformRegistry>, policy: DispatchPolicy) -> Self {
        Self {
            registry,
            policy,
            events: None,
        }
    }

    /// Report progress of every operation on `events`
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn registry(&self) -> &Arc<PlatformRegistry> {
        &self.registry
    }

    /// Publish to `platforms`, or to every registered platform when `None`
    ///
    /// Content is validated once before any adapter runs. Names that do not
    /// resolve become failure outcomes at their position; they are not an
    /// error for the bulk path.
    pub async fn publish_all(
        &self,
        request: &PublishRequest,
        platforms: Option<&[String]>,
    ) -> Result<PublishSummary> {
        request.validate()?;

        let targets: Vec<Target> = match platforms {
            None => self
                .registry
                .iter()
                .map(|p| Target::Platform(Arc::clone(p)))
                .collect(),
            Some(names) => names
                .iter()
                .map(|name| match self.registry.resolve(name) {
                    Some(platform) => Target::Platform(platform),
                    None => Target::Unknown(name.clone()),
                })
                .collect(),
        };

        Ok(self.run(targets, Arc::new(request.clone())).await)
    }

    /// Publish to a single, already resolved platform
    pub async fn publish_one(
        &self,
        platform: Arc<dyn Platform>,
        request: &PublishRequest,
    ) -> PublishOutcome {
        let summary = self
            .run(vec![Target::Platform(platform)], Arc::new(request.clone()))
            .await;
        summary
            .results
            .into_iter()
            .next()
            .unwrap_or_else(|| PublishOutcome::failure("unknown", "no outcome produced"))
    }

    async fn run(&self, targets: Vec<Target>, request: Arc<PublishRequest>) -> PublishSummary {
        let operation_id = uuid::Uuid::new_v4().to_string();
        let labels: Vec<String> = targets.iter().map(Target::label).collect();
        info!("Publishing to {} platform(s): {:?}", labels.len(), labels);

        self.emit(Event::PublishStarted {
            operation_id: operation_id.clone(),
            platforms: labels,
        });

        let tasks = targets.into_iter().map(|target| {
            let request = Arc::clone(&request);
            let operation_id = operation_id.clone();
            async move {
                let outcome = match target {
                    Target::Platform(platform) => dispatch(platform, request, self.policy).await,
                    Target::Unknown(name) => {
                        let unknown = UnknownPlatform::new(&name, self.registry.keys());
                        PublishOutcome::failure(name.as_str(), unknown.error)
                    }
                };
                self.emit(Event::PlatformFinished {
                    operation_id,
                    outcome: outcome.clone(),
                });
                outcome
            }
        });

        let summary = aggregate(join_all(tasks).await);
        info!("{}", summary.message());

        self.emit(Event::PublishCompleted {
            operation_id,
            successful: summary.successful,
            total: summary.total,
        });

        summary
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}

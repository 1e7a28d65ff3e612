//! Common test utilities.
//!
//! - [`RecordingService`] - Service that records every call
//! - [`CountingResolver`] - Resolver that counts lookups
//! - [`ErrorCounter`] - Tracing layer counting error events

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use helios_profiles::registry::{ResourceDescriptor, ResourceRegistry, ResourceResolver};
use helios_profiles::service::{
    ResourceService, ServiceError, ServiceResult, WriteArgs, WriteOutcome,
};
use helios_profiles::{FhirBase, SanitizedArgs};
use serde_json::{Value, json};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// A call received by [`RecordingService`].
#[derive(Debug, Clone)]
pub enum Call {
    /// A read-style call with its arguments.
    Args(&'static str, SanitizedArgs),
    /// A create or update.
    Write(&'static str, WriteArgs),
}

impl Call {
    /// Returns the interaction name.
    pub fn name(&self) -> &'static str {
        match self {
            Call::Args(name, _) | Call::Write(name, _) => *name,
        }
    }
}

/// Service that records calls and either succeeds with canned results or
/// fails every call with one error.
pub struct RecordingService {
    resource_type: &'static str,
    failure: Option<ServiceError>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingService {
    /// Creates a service that succeeds.
    pub fn new(resource_type: &'static str) -> Self {
        Self {
            resource_type,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a service that fails every call with `error`.
    pub fn failing(resource_type: &'static str, error: ServiceError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(resource_type)
        }
    }

    /// Returns the recorded calls.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the recorded creates and updates.
    pub fn writes(&self) -> Vec<(&'static str, WriteArgs)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Write(name, args) => Some((name, args)),
                Call::Args(..) => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> ServiceResult<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn resource(&self, id: &str) -> Value {
        json!({"resourceType": self.resource_type, "id": id})
    }
}

#[async_trait]
impl ResourceService for RecordingService {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn search(&self, args: &SanitizedArgs) -> ServiceResult<Vec<Value>> {
        self.record(Call::Args("search", args.clone()))?;
        Ok(vec![self.resource("r1"), self.resource("r2")])
    }

    async fn search_by_id(&self, args: &SanitizedArgs) -> ServiceResult<Option<Value>> {
        self.record(Call::Args("search_by_id", args.clone()))?;
        Ok(args.id.as_deref().map(|id| self.resource(id)))
    }

    async fn search_by_version_id(&self, args: &SanitizedArgs) -> ServiceResult<Option<Value>> {
        self.record(Call::Args("search_by_version_id", args.clone()))?;
        Ok(args.id.as_deref().map(|id| self.resource(id)))
    }

    async fn create(&self, args: WriteArgs) -> ServiceResult<WriteOutcome> {
        let id = args.id.clone().unwrap_or_else(|| "generated".to_string());
        self.record(Call::Write("create", args))?;
        Ok(WriteOutcome {
            id,
            version_id: Some("1".to_string()),
            created: true,
        })
    }

    async fn update(&self, args: WriteArgs) -> ServiceResult<WriteOutcome> {
        let id = args.id.clone().unwrap_or_default();
        self.record(Call::Write("update", args))?;
        Ok(WriteOutcome {
            id,
            version_id: Some("2".to_string()),
            created: false,
        })
    }

    async fn remove(&self, args: &SanitizedArgs) -> ServiceResult<()> {
        self.record(Call::Args("remove", args.clone()))
    }

    async fn history(&self, args: &SanitizedArgs) -> ServiceResult<Vec<Value>> {
        self.record(Call::Args("history", args.clone()))?;
        Ok(vec![self.resource("r1")])
    }

    async fn history_by_id(&self, args: &SanitizedArgs) -> ServiceResult<Vec<Value>> {
        self.record(Call::Args("history_by_id", args.clone()))?;
        Ok(vec![self.resource("r1")])
    }
}

/// Resolver backed by the standard registry that counts lookups.
pub struct CountingResolver {
    registry: ResourceRegistry,
    lookups: AtomicUsize,
}

impl CountingResolver {
    /// Creates a resolver over the standard registry.
    pub fn new() -> Self {
        Self {
            registry: ResourceRegistry::standard(),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Returns the number of lookups so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ResourceResolver for CountingResolver {
    fn resolve(&self, base: FhirBase, resource_type: &str) -> Option<ResourceDescriptor> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.registry.resolve(base, resource_type)
    }
}

/// Tracing layer counting events at ERROR level.
#[derive(Clone, Default)]
pub struct ErrorCounter {
    count: Arc<AtomicUsize>,
}

impl ErrorCounter {
    /// Installs the counter as the thread's default subscriber.
    ///
    /// The returned guard must be held for the duration of the test.
    pub fn install() -> (Self, DefaultGuard) {
        let counter = Self::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (counter, guard)
    }

    /// Returns the number of error events seen.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl<S> Layer<S> for ErrorCounter
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

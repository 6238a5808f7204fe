//! Metrics registry.
//!
//! Owns the registered collectors, the description catalog, the storages and
//! the global label overlay, and drives the periodic "gather and send" loop.
//! All maps are `DashMap`s: registration is rare, reads from running gather
//! passes are frequent, and neither side blocks the other.

mod channel;
mod gather;
mod scheduler;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use dashmap::DashMap;
use futures_util::FutureExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use uuid::Uuid;

use telemeter_core::{Collector, Description, Labels, Result, TelemeterError};

use crate::storage::{GatherFn, Storage};

use channel::DescriptionChannel;

/// Capacity of the per-collector describe channel.
pub const SIZE_OF_DESCRIBE_CHANNEL: usize = 10_000;
/// Capacity of the shared collect channel of one gather pass.
pub const SIZE_OF_COLLECT_CHANNEL: usize = 10_000;

/// Cheap-to-clone registry handle.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

pub(crate) struct RegistryInner {
    collectors: DashMap<Uuid, Arc<dyn Collector>>,
    descriptions: DashMap<Uuid, Arc<Description>>,
    storages: DashMap<String, Arc<dyn Storage>>,
    labels: RwLock<Labels>,
    scheduler: Mutex<SchedulerState>,
}

struct SchedulerState {
    interval: Duration,
    control: Option<mpsc::UnboundedSender<Duration>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry with the periodic sender stopped.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                collectors: DashMap::new(),
                descriptions: DashMap::new(),
                storages: DashMap::new(),
                labels: RwLock::new(Labels::new()),
                scheduler: Mutex::new(SchedulerState {
                    interval: Duration::ZERO,
                    control: None,
                }),
            }),
        }
    }

    /// Registry already sending every `interval` (zero keeps it stopped).
    pub fn with_send_interval(interval: Duration) -> Result<Self> {
        let registry = Self::new();
        registry.set_send_interval(interval)?;
        Ok(registry)
    }

    /// Describe each collector into the catalog, then keep it for gathering.
    pub async fn register<I>(&self, collectors: I) -> Result<()>
    where
        I: IntoIterator<Item = Arc<dyn Collector>>,
    {
        for collector in collectors {
            let (tx, mut rx) = mpsc::channel(SIZE_OF_DESCRIBE_CHANNEL);
            let describer = Arc::clone(&collector);
            let task = tokio::task::spawn_blocking(move || {
                let mut sink = DescriptionChannel::new(tx);
                describer.describe(&mut sink);
            });

            let mut described = Vec::new();
            while let Some(description) = rx.recv().await {
                described.push(description);
            }

            // A panicking describe leaves the catalog untouched.
            task.await
                .map_err(|e| TelemeterError::Internal(format!("collector describe failed: {e}")))?;

            for description in described {
                self.inner
                    .descriptions
                    .insert(description.id(), description);
            }
            self.inner.collectors.insert(Uuid::new_v4(), collector);
        }
        Ok(())
    }

    /// Shorthand for registering a single collector by value.
    pub async fn register_collector<C: Collector + 'static>(&self, collector: C) -> Result<()> {
        self.register([Arc::new(collector) as Arc<dyn Collector>]).await
    }

    /// Visit every catalogued description.
    pub fn walk<F: FnMut(&Description)>(&self, mut f: F) {
        for entry in self.inner.descriptions.iter() {
            f(entry.value());
        }
    }

    pub fn descriptions(&self) -> Vec<Arc<Description>> {
        self.inner
            .descriptions
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect()
    }

    pub fn collector_count(&self) -> usize {
        self.inner.collectors.len()
    }

    /// Register storages. Pull-capable storages get a callback that runs a
    /// fresh gather on their read path.
    pub fn add_storages<I>(&self, storages: I)
    where
        I: IntoIterator<Item = Arc<dyn Storage>>,
    {
        let labels = self.labels();
        for storage in storages {
            if let Some(pull) = storage.as_pull() {
                pull.set_callback(self.gather_callback());
            }
            storage.set_labels(labels.clone());

            tracing::info!(storage = %storage.id(), pull = storage.as_pull().is_some(), "storage registered");
            self.inner
                .storages
                .insert(storage.id().to_string(), storage);
        }
    }

    pub fn storage(&self, id: &str) -> Result<Arc<dyn Storage>> {
        self.inner
            .storages
            .get(id)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| TelemeterError::StorageNotFound(id.to_string()))
    }

    pub fn storage_ids(&self) -> Vec<String> {
        self.inner.storages.iter().map(|e| e.key().clone()).collect()
    }

    /// Replace the global overlay and push it to every storage right away.
    pub fn set_labels(&self, labels: Labels) {
        *self.inner.labels.write() = labels.clone();
        for entry in self.inner.storages.iter() {
            entry.value().set_labels(labels.clone());
        }
    }

    pub fn labels(&self) -> Labels {
        self.inner.labels.read().clone()
    }

    /// Reconfigure the periodic sender. Zero stops it.
    ///
    /// The loop is spawned on the current tokio runtime on the first
    /// positive interval; outside a runtime that returns `NoRuntime`.
    pub fn set_send_interval(&self, interval: Duration) -> Result<()> {
        let mut state = self.inner.scheduler.lock();
        state.interval = interval;

        if let Some(control) = &state.control {
            if control.send(interval).is_ok() {
                return Ok(());
            }
            state.control = None;
        }
        if interval.is_zero() {
            return Ok(());
        }

        let handle =
            tokio::runtime::Handle::try_current().map_err(|_| TelemeterError::NoRuntime)?;
        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(scheduler::run(Arc::downgrade(&self.inner), rx, interval));
        state.control = Some(tx);
        Ok(())
    }

    pub fn send_interval(&self) -> Duration {
        self.inner.scheduler.lock().interval
    }

    pub fn is_running(&self) -> bool {
        let state = self.inner.scheduler.lock();
        !state.interval.is_zero() && state.control.is_some()
    }

    fn gather_callback(&self) -> GatherFn {
        let weak = Arc::downgrade(&self.inner);
        Arc::new(move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => Registry { inner }.gather().await,
                    None => Err(TelemeterError::Internal("registry dropped".into())),
                }
            }
            .boxed()
        })
    }
}

static DEFAULT_REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Process-wide registry, built on first use and never torn down.
///
/// Tests should build private registries instead.
pub fn default_registry() -> &'static Registry {
    DEFAULT_REGISTRY.get_or_init(Registry::new)
}

//! Shared application state for the telemeter agent.
//!
//! Wiring order: registry, collectors, storages, global labels, then the
//! send interval, so the first scheduled pass already sees everything.

use std::sync::Arc;

use telemeter_core::{Collector, Result};

use crate::collector::{BuildInfoCollector, ProcessCollector};
use crate::config::{AgentConfig, StorageKind};
use crate::registry::Registry;
use crate::storage::{ExpvarStorage, InfluxStorage, Storage};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    registry: Registry,
    expvars: Vec<Arc<ExpvarStorage>>,
}

impl AppState {
    /// Build the registry from config. Needs a tokio runtime when the
    /// configured send interval is positive.
    pub async fn new(cfg: &AgentConfig) -> Result<Self> {
        let registry = Registry::new();
        Self::with_registry(registry, cfg).await
    }

    pub async fn with_registry(registry: Registry, cfg: &AgentConfig) -> Result<Self> {
        let mut collectors: Vec<Arc<dyn Collector>> = Vec::new();
        if cfg.collectors.process {
            collectors.push(Arc::new(ProcessCollector::new()));
        }
        if cfg.collectors.build_info {
            collectors.push(Arc::new(BuildInfoCollector::agent()));
        }
        registry.register(collectors).await?;

        let mut storages: Vec<Arc<dyn Storage>> = Vec::with_capacity(cfg.storages.len());
        let mut expvars = Vec::new();
        for s in &cfg.storages {
            match s.kind {
                StorageKind::Expvar => {
                    let storage = Arc::new(ExpvarStorage::with_id(s.id.clone()));
                    expvars.push(Arc::clone(&storage));
                    storages.push(storage);
                }
                StorageKind::Influx => {
                    storages.push(Arc::new(InfluxStorage::with_id(
                        s.id.clone(),
                        s.influx_settings(),
                    )?));
                }
            }
        }
        registry.add_storages(storages);
        registry.set_labels(cfg.registry.labels());
        registry.set_send_interval(cfg.registry.send_interval())?;

        tracing::info!(
            collectors = registry.collector_count(),
            storages = registry.storage_ids().len(),
            interval_ms = cfg.registry.send_interval_ms,
            "registry ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { registry, expvars }),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn expvars(&self) -> &[Arc<ExpvarStorage>] {
        &self.inner.expvars
    }
}

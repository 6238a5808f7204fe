//! Storage sink boundary.
//!
//! A storage receives every gathered batch of one send pass. Storages that
//! are read on demand (pull) additionally accept a gather callback so their
//! read path can refresh from the registry instead of serving the last
//! scheduled push.

pub mod expvar;
pub mod influx;

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use telemeter_core::{Labels, Measures, Result};

pub use expvar::ExpvarStorage;
pub use influx::{InfluxSettings, InfluxStorage, Precision};

/// Fresh gather pass, handed to pull storages.
pub type GatherFn = Arc<dyn Fn() -> BoxFuture<'static, Result<Measures>> + Send + Sync>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Unique and stable for the storage's lifetime.
    fn id(&self) -> &str;

    /// Persist or publish one batch. An error fails the whole batch.
    async fn write(&self, measures: Arc<Measures>) -> Result<()>;

    /// Global overlay merged into every future write.
    fn set_labels(&self, labels: Labels);

    /// Pull capability, if any.
    fn as_pull(&self) -> Option<&dyn PullStorage> {
        None
    }
}

pub trait PullStorage: Send + Sync {
    fn set_callback(&self, callback: GatherFn);
}

//! Collector and metric contracts.
//!
//! Collectors push into sinks instead of returning collections so the
//! registry can stream their output through bounded channels while other
//! collectors are still running.

use std::sync::Arc;

use crate::description::Description;
use crate::error::Result;
use crate::measure::MeasureValue;

/// Anything that can be snapshotted.
pub trait Metric: Send + Sync {
    fn description(&self) -> &Arc<Description>;
    fn measure(&self) -> Result<MeasureValue>;
}

/// Receives descriptions during registration.
pub trait DescriptionSink {
    fn send(&mut self, description: Arc<Description>);
}

/// Receives metrics during a gather pass.
pub trait MetricSink {
    fn send(&mut self, metric: Arc<dyn Metric>);
}

impl DescriptionSink for Vec<Arc<Description>> {
    fn send(&mut self, description: Arc<Description>) {
        self.push(description);
    }
}

impl MetricSink for Vec<Arc<dyn Metric>> {
    fn send(&mut self, metric: Arc<dyn Metric>) {
        self.push(metric);
    }
}

/// Source of metrics registered with a registry.
///
/// `describe` must emit each owned definition exactly once and be idempotent
/// across calls. `collect` emits a fresh metric per definition (or per label
/// combination) on every call.
pub trait Collector: Send + Sync {
    fn describe(&self, sink: &mut dyn DescriptionSink);
    fn collect(&self, sink: &mut dyn MetricSink);
}

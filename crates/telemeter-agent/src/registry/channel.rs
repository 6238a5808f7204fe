//! Channel-backed sinks handed to collectors on blocking tasks.
//!
//! A send only fails once the receiving pass has given up (e.g. a gather
//! aborted on a measure error); the item is dropped in that case.

use std::sync::Arc;

use tokio::sync::mpsc;

use telemeter_core::{Description, DescriptionSink, Metric, MetricSink};

pub(crate) struct DescriptionChannel {
    tx: mpsc::Sender<Arc<Description>>,
}

impl DescriptionChannel {
    pub(crate) fn new(tx: mpsc::Sender<Arc<Description>>) -> Self {
        Self { tx }
    }
}

impl DescriptionSink for DescriptionChannel {
    fn send(&mut self, description: Arc<Description>) {
        let _ = self.tx.blocking_send(description);
    }
}

pub(crate) struct MetricChannel {
    tx: mpsc::Sender<Arc<dyn Metric>>,
}

impl MetricChannel {
    pub(crate) fn new(tx: mpsc::Sender<Arc<dyn Metric>>) -> Self {
        Self { tx }
    }
}

impl MetricSink for MetricChannel {
    fn send(&mut self, metric: Arc<dyn Metric>) {
        let _ = self.tx.blocking_send(metric);
    }
}

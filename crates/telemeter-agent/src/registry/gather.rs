//! Gather pass and sink fan-out.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::mpsc;

use telemeter_core::{Measure, Measures, Metric, Result, TelemeterError};

use super::channel::MetricChannel;
use super::{Registry, SIZE_OF_COLLECT_CHANNEL};

impl Registry {
    /// Snapshot every metric of every registered collector.
    ///
    /// Output order is unspecified; use `sort_measures` when it matters.
    /// The first measure failure aborts the pass.
    pub async fn gather(&self) -> Result<Measures> {
        let (tx, mut rx) = mpsc::channel::<Arc<dyn Metric>>(SIZE_OF_COLLECT_CHANNEL);

        let handles: Vec<_> = self
            .inner
            .collectors
            .iter()
            .map(|entry| {
                let collector = Arc::clone(entry.value());
                let tx = tx.clone();
                tokio::task::spawn_blocking(move || {
                    let mut sink = MetricChannel::new(tx);
                    collector.collect(&mut sink);
                })
            })
            .collect();
        drop(tx);

        // Closes the channel once every collector is done, panicked ones included.
        tokio::spawn(async move {
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "collector panicked during collect; skipped");
                }
            }
        });

        let mut measures = Measures::new();
        while let Some(metric) = rx.recv().await {
            measures.push(Measure::from_metric(metric.as_ref())?);
        }
        Ok(measures)
    }

    /// Gather once and hand the batch to every storage concurrently.
    ///
    /// Every storage is attempted; failures come back together as
    /// `TelemeterError::Storages`.
    pub async fn gather_and_send(&self) -> Result<()> {
        let measures = Arc::new(self.gather().await?);

        let storages: Vec<_> = self
            .inner
            .storages
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect();
        if storages.is_empty() {
            return Ok(());
        }

        let labels = self.labels();
        let writes = storages.into_iter().map(|storage| {
            let id = storage.id().to_string();
            let labels = labels.clone();
            let batch = Arc::clone(&measures);
            let handle = tokio::spawn(async move {
                storage.set_labels(labels);
                storage.write(batch).await
            });
            async move { (id, handle.await) }
        });

        let mut failures = Vec::new();
        for (id, joined) in join_all(writes).await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => failures.push(e),
                Err(e) => failures.push(TelemeterError::storage(&id, format!("write task failed: {e}"))),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(TelemeterError::Storages(failures))
        }
    }
}

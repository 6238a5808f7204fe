//! In-process JSON snapshot storage, served from `/debug/vars`.
//!
//! Every record is keyed by the metric name, plus a `{canonical labels}`
//! suffix when the metric carries labels, so label-vector children stay
//! distinct.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Number, Value};

use telemeter_core::{Labels, Measure, MeasureValue, Measures, Result};

use super::{GatherFn, PullStorage, Storage};

pub struct ExpvarStorage {
    id: String,
    labels: RwLock<Labels>,
    callback: RwLock<Option<GatherFn>>,
    records: RwLock<BTreeMap<String, Value>>,
}

impl ExpvarStorage {
    /// Storage with a generated id.
    pub fn new() -> Self {
        Self::with_id("")
    }

    /// Storage published under `id`; an empty id gets a generated uuid.
    pub fn with_id(id: impl Into<String>) -> Self {
        let mut id = id.into();
        if id.is_empty() {
            id = uuid::Uuid::new_v4().to_string();
        }
        Self {
            id,
            labels: RwLock::new(Labels::new()),
            callback: RwLock::new(None),
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Replace the published records with `measures`.
    pub fn record(&self, measures: &[Measure]) {
        let overlay = self.labels.read().clone();
        let fresh: BTreeMap<String, Value> = measures
            .iter()
            .map(|m| (record_key(m), record_value(m, &overlay)))
            .collect();
        *self.records.write() = fresh;
    }

    /// Run the gather callback, if wired, and record its output.
    pub async fn refresh(&self) -> Result<()> {
        let callback = self.callback.read().clone();
        if let Some(gather) = callback {
            let measures = gather().await?;
            self.record(&measures);
        }
        Ok(())
    }

    /// Last recorded state as a JSON object.
    pub fn snapshot(&self) -> Value {
        let records = self.records.read();
        Value::Object(records.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// Refresh, then snapshot. A failed refresh serves the previous state.
    pub async fn render(&self) -> Value {
        if let Err(e) = self.refresh().await {
            tracing::warn!(storage = %self.id, error = %e, "expvar refresh failed; serving last snapshot");
        }
        self.snapshot()
    }
}

impl Default for ExpvarStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for ExpvarStorage {
    fn id(&self) -> &str {
        &self.id
    }

    async fn write(&self, measures: Arc<Measures>) -> Result<()> {
        self.record(&measures);
        Ok(())
    }

    fn set_labels(&self, labels: Labels) {
        *self.labels.write() = labels;
    }

    fn as_pull(&self) -> Option<&dyn PullStorage> {
        Some(self)
    }
}

impl PullStorage for ExpvarStorage {
    fn set_callback(&self, callback: GatherFn) {
        *self.callback.write() = Some(callback);
    }
}

fn record_key(measure: &Measure) -> String {
    let labels = measure.description.labels();
    if labels.is_empty() {
        measure.description.name().to_string()
    } else {
        format!("{}{{{}}}", measure.description.name(), labels.canonical())
    }
}

fn record_value(measure: &Measure, overlay: &Labels) -> Value {
    let mut record = Map::new();
    record.insert("help".into(), Value::String(measure.description.help().to_string()));

    match &measure.value {
        MeasureValue::Scalar { value, sample_count } => {
            if let Some(n) = Number::from_f64(*value) {
                record.insert("value".into(), Value::Number(n));
            }
            record.insert("sample_count".into(), Value::from(*sample_count));
        }
        MeasureValue::Summary(summary) => {
            record.insert("sample_count".into(), Value::from(summary.sample_count));
            for (name, v) in summary.finite_fields() {
                if let Some(n) = Number::from_f64(v) {
                    record.insert(name, Value::Number(n));
                }
            }
        }
    }

    let merged = Labels::merged_map(overlay, measure.description.labels());
    if !merged.is_empty() {
        let labels: Map<String, Value> = merged
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        record.insert("labels".into(), Value::Object(labels));
    }

    Value::Object(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemeter_core::{Description, MetricType};

    #[test]
    fn key_carries_canonical_labels() {
        let d = Description::new("req", "", MetricType::Counter, &["b", "2", "a", "1"]);
        let m = Measure {
            description: d,
            created_at: chrono::Utc::now(),
            value: MeasureValue::Scalar { value: 1.0, sample_count: 1 },
        };
        assert_eq!(record_key(&m), "req{a=1,b=2}");
    }
}

//! Immutable metric identity.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::label::Labels;

/// Kind of a metric definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    Untyped,
    Counter,
    Gauge,
    Histogram,
    Timer,
}

impl MetricType {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Untyped => "untyped",
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Histogram => "histogram",
            MetricType::Timer => "timer",
        }
    }

    /// Scalar kinds report a value plus sample count; the rest a summary.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            MetricType::Untyped | MetricType::Counter | MetricType::Gauge
        )
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one metric definition.
///
/// Built once per constructor call and shared by `Arc` between every clone
/// of the metric handle. Label vector children get their own description
/// carrying the merged label set.
#[derive(Debug)]
pub struct Description {
    id: Uuid,
    name: String,
    help: String,
    kind: MetricType,
    labels: Labels,
}

impl Description {
    /// `labels` are flat `key, value…` tokens.
    pub fn new<S: AsRef<str>>(name: &str, help: &str, kind: MetricType, labels: &[S]) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            help: help.to_string(),
            kind,
            labels: Labels::new().with(labels.iter().map(|s| s.as_ref().to_string())),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn kind(&self) -> MetricType {
        self.kind
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }
}

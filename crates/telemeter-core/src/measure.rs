//! Point-in-time snapshots produced by a gather pass.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::collector::Metric;
use crate::description::Description;
use crate::error::Result;

/// One gather pass worth of snapshots, unordered.
pub type Measures = Vec<Measure>;

/// Immutable read-out of one metric.
#[derive(Debug, Clone)]
pub struct Measure {
    pub description: Arc<Description>,
    pub created_at: DateTime<Utc>,
    pub value: MeasureValue,
}

impl Measure {
    /// Snapshot `metric` now.
    pub fn from_metric(metric: &dyn Metric) -> Result<Self> {
        let value = metric.measure()?;
        Ok(Self {
            description: Arc::clone(metric.description()),
            created_at: Utc::now(),
            value,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeasureValue {
    /// Untyped, counter and gauge.
    Scalar { value: f64, sample_count: u64 },
    /// Histogram and timer.
    Summary(HistogramSummary),
}

impl MeasureValue {
    pub fn sample_count(&self) -> u64 {
        match self {
            MeasureValue::Scalar { sample_count, .. } => *sample_count,
            MeasureValue::Summary(s) => s.sample_count,
        }
    }

    pub fn scalar(&self) -> Option<f64> {
        match self {
            MeasureValue::Scalar { value, .. } => Some(*value),
            MeasureValue::Summary(_) => None,
        }
    }

    pub fn summary(&self) -> Option<&HistogramSummary> {
        match self {
            MeasureValue::Summary(s) => Some(s),
            MeasureValue::Scalar { .. } => None,
        }
    }
}

/// Histogram aggregates. Fields are `NaN` when nothing was observed.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSummary {
    pub sample_count: u64,
    pub sample_sum: f64,
    pub sample_min: f64,
    pub sample_max: f64,
    pub sample_variance: f64,
    /// `(q, estimate)` in the metric's configured order.
    pub quantiles: Vec<(f64, f64)>,
}

impl HistogramSummary {
    /// Named aggregate fields with `NaN` entries dropped; excludes the count.
    pub fn finite_fields(&self) -> Vec<(String, f64)> {
        let mut out = Vec::with_capacity(4 + self.quantiles.len());
        for (name, v) in [
            ("sample_sum", self.sample_sum),
            ("sample_min", self.sample_min),
            ("sample_max", self.sample_max),
            ("sample_variance", self.sample_variance),
        ] {
            if !v.is_nan() {
                out.push((name.to_string(), v));
            }
        }
        for &(q, v) in &self.quantiles {
            if !v.is_nan() {
                out.push((percentile_field(q), v));
            }
        }
        out
    }
}

/// Field name for a quantile: `0.5 -> p50`, `0.999 -> p99_9`.
pub fn percentile_field(q: f64) -> String {
    let pct = (q * 100.0 * 1e6).round() / 1e6;
    if pct.fract() == 0.0 {
        format!("p{}", pct as i64)
    } else {
        format!("p{}", pct.to_string().replace('.', "_"))
    }
}

/// Deterministic order: metric name, then canonical label string.
pub fn sort_measures(measures: &mut [Measure]) {
    measures.sort_by(|a, b| {
        a.description
            .name()
            .cmp(b.description.name())
            .then_with(|| {
                a.description
                    .labels()
                    .canonical()
                    .cmp(&b.description.labels().canonical())
            })
    });
}

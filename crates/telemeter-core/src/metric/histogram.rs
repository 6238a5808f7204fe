use std::sync::Arc;

use crate::collector::{Collector, DescriptionSink, Metric, MetricSink};
use crate::description::{Description, MetricType};
use crate::error::Result;
use crate::measure::{HistogramSummary, MeasureValue};
use crate::vector::Vector;

use super::distribution::Distribution;
use super::DEFAULT_QUANTILES;

/// Distribution of observed values.
///
/// Label vector children start with an empty engine; they never inherit the
/// parent's observations.
#[derive(Clone)]
pub struct Histogram {
    description: Arc<Description>,
    dist: Arc<Distribution>,
    vector: Arc<Vector<Histogram>>,
}

impl Histogram {
    /// Reports [`DEFAULT_QUANTILES`].
    pub fn new<S: AsRef<str>>(name: &str, help: &str, labels: &[S]) -> Self {
        Self::with_quantiles(name, help, &DEFAULT_QUANTILES, labels)
    }

    pub fn with_quantiles<S: AsRef<str>>(
        name: &str,
        help: &str,
        quantiles: &[f64],
        labels: &[S],
    ) -> Self {
        let description = Description::new(name, help, MetricType::Histogram, labels);
        let dist = Arc::new(Distribution::new(quantiles));
        let (n, h, q) = (name.to_string(), help.to_string(), dist.quantiles().to_vec());
        let vector = Vector::new(description.labels().clone(), move |tokens| {
            Histogram::with_quantiles(&n, &h, &q, tokens)
        });

        Self {
            description,
            dist,
            vector: Arc::new(vector),
        }
    }

    pub fn with<S: AsRef<str>>(&self, labels: &[S]) -> Histogram {
        self.vector.with(labels)
    }

    pub fn add(&self, value: f64) {
        self.dist.engine().add(value);
    }

    pub fn quantile(&self, q: f64) -> f64 {
        self.dist.engine().quantile(q)
    }

    pub fn count(&self) -> u64 {
        self.dist.engine().count()
    }

    pub fn quantiles(&self) -> &[f64] {
        self.dist.quantiles()
    }

    pub fn summary(&self) -> HistogramSummary {
        self.dist.engine().summary(self.dist.quantiles())
    }

    /// Whether both handles point at the same engine.
    pub fn ptr_eq(&self, other: &Histogram) -> bool {
        Arc::ptr_eq(&self.dist, &other.dist)
    }
}

impl Metric for Histogram {
    fn description(&self) -> &Arc<Description> {
        &self.description
    }

    fn measure(&self) -> Result<MeasureValue> {
        Ok(self.dist.measure())
    }
}

impl Collector for Histogram {
    fn describe(&self, sink: &mut dyn DescriptionSink) {
        self.vector.describe_root(self, sink);
    }

    fn collect(&self, sink: &mut dyn MetricSink) {
        self.vector.collect_with_root(self, sink);
    }
}

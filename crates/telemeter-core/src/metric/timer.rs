use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use crate::collector::{Collector, DescriptionSink, Metric, MetricSink};
use crate::description::{Description, MetricType};
use crate::error::Result;
use crate::measure::{HistogramSummary, MeasureValue};
use crate::vector::Vector;

use super::distribution::Distribution;
use super::DEFAULT_QUANTILES;

/// Histogram of durations, recorded in seconds.
#[derive(Clone)]
pub struct Timer {
    description: Arc<Description>,
    dist: Arc<Distribution>,
    begin: Instant,
    vector: Arc<Vector<Timer>>,
}

impl Timer {
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
        let description = Description::new(name, help, MetricType::Timer, labels);
        let dist = Arc::new(Distribution::new(quantiles));
        let (n, h, q) = (name.to_string(), help.to_string(), dist.quantiles().to_vec());
        let vector = Vector::new(description.labels().clone(), move |tokens| {
            Timer::with_quantiles(&n, &h, &q, tokens)
        });

        Self {
            description,
            dist,
            begin: Instant::now(),
            vector: Arc::new(vector),
        }
    }

    pub fn with<S: AsRef<str>>(&self, labels: &[S]) -> Timer {
        self.vector.with(labels)
    }

    pub fn update(&self, d: Duration) {
        self.dist.engine().add(d.as_secs_f64());
    }

    /// Record time elapsed since `start`; a future `start` records zero.
    pub fn update_since(&self, start: Instant) {
        self.update(Instant::now().saturating_duration_since(start));
    }

    /// Wall-clock variant; clock skew into the future records zero.
    pub fn update_since_system(&self, start: SystemTime) {
        self.update(SystemTime::now().duration_since(start).unwrap_or(Duration::ZERO));
    }

    /// Record time elapsed since this timer was built.
    pub fn time(&self) {
        self.update_since(self.begin);
    }

    pub fn begin(&self) -> Instant {
        self.begin
    }

    pub fn quantile(&self, q: f64) -> f64 {
        self.dist.engine().quantile(q)
    }

    pub fn count(&self) -> u64 {
        self.dist.engine().count()
    }

    pub fn summary(&self) -> HistogramSummary {
        self.dist.engine().summary(self.dist.quantiles())
    }

    /// Whether both handles point at the same engine.
    pub fn ptr_eq(&self, other: &Timer) -> bool {
        Arc::ptr_eq(&self.dist, &other.dist)
    }
}

impl Metric for Timer {
    fn description(&self) -> &Arc<Description> {
        &self.description
    }

    fn measure(&self) -> Result<MeasureValue> {
        Ok(self.dist.measure())
    }
}

impl Collector for Timer {
    fn describe(&self, sink: &mut dyn DescriptionSink) {
        self.vector.describe_root(self, sink);
    }

    fn collect(&self, sink: &mut dyn MetricSink) {
        self.vector.collect_with_root(self, sink);
    }
}

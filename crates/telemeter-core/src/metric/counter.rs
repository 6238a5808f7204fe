use std::sync::Arc;

use crate::collector::{Collector, DescriptionSink, Metric, MetricSink};
use crate::description::{Description, MetricType};
use crate::error::{Result, TelemeterError};
use crate::measure::MeasureValue;
use crate::vector::Vector;

use super::scalar::ScalarCell;

/// Monotonically non-decreasing accumulator.
#[derive(Clone)]
pub struct Counter {
    description: Arc<Description>,
    cell: Arc<ScalarCell>,
    vector: Arc<Vector<Counter>>,
}

impl Counter {
    /// `labels` are flat `key, value…` tokens.
    pub fn new<S: AsRef<str>>(name: &str, help: &str, labels: &[S]) -> Self {
        let description = Description::new(name, help, MetricType::Counter, labels);
        let (n, h) = (name.to_string(), help.to_string());
        let vector = Vector::new(description.labels().clone(), move |tokens| {
            Counter::new(&n, &h, tokens)
        });

        Self {
            description,
            cell: Arc::new(ScalarCell::default()),
            vector: Arc::new(vector),
        }
    }

    pub fn with<S: AsRef<str>>(&self, labels: &[S]) -> Counter {
        self.vector.with(labels)
    }

    /// Add a non-negative delta.
    ///
    /// # Panics
    /// On a negative or `NaN` delta. The value is left untouched.
    #[allow(clippy::panic)]
    pub fn add(&self, delta: f64) {
        if let Err(e) = self.try_add(delta) {
            panic!("{e}");
        }
    }

    /// Like [`add`](Self::add) but reports misuse instead of panicking.
    pub fn try_add(&self, delta: f64) -> Result<()> {
        if delta.is_nan() || delta < 0.0 {
            return Err(TelemeterError::InvalidArgument(format!(
                "counter {} can't be decreased (delta {delta})",
                self.description.name()
            )));
        }
        self.cell.add(delta);
        Ok(())
    }

    pub fn inc(&self) {
        self.cell.add(1.0);
    }

    pub fn count(&self) -> f64 {
        self.cell.value()
    }

    pub fn sample_count(&self) -> u64 {
        self.cell.sample_count()
    }

    /// Whether both handles point at the same value cell.
    pub fn ptr_eq(&self, other: &Counter) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl Metric for Counter {
    fn description(&self) -> &Arc<Description> {
        &self.description
    }

    fn measure(&self) -> Result<MeasureValue> {
        Ok(self.cell.measure())
    }
}

impl Collector for Counter {
    fn describe(&self, sink: &mut dyn DescriptionSink) {
        self.vector.describe_root(self, sink);
    }

    fn collect(&self, sink: &mut dyn MetricSink) {
        self.vector.collect_with_root(self, sink);
    }
}

use std::sync::Arc;

use crate::collector::{Collector, DescriptionSink, Metric, MetricSink};
use crate::description::{Description, MetricType};
use crate::error::Result;
use crate::measure::MeasureValue;
use crate::vector::Vector;

use super::scalar::ScalarCell;

/// Raw value with no monotonicity rules.
#[derive(Clone)]
pub struct Untyped {
    description: Arc<Description>,
    cell: Arc<ScalarCell>,
    vector: Arc<Vector<Untyped>>,
}

impl Untyped {
    /// `labels` are flat `key, value…` tokens.
    pub fn new<S: AsRef<str>>(name: &str, help: &str, labels: &[S]) -> Self {
        let description = Description::new(name, help, MetricType::Untyped, labels);
        let (n, h) = (name.to_string(), help.to_string());
        let vector = Vector::new(description.labels().clone(), move |tokens| {
            Untyped::new(&n, &h, tokens)
        });

        Self {
            description,
            cell: Arc::new(ScalarCell::default()),
            vector: Arc::new(vector),
        }
    }

    pub fn with<S: AsRef<str>>(&self, labels: &[S]) -> Untyped {
        self.vector.with(labels)
    }

    pub fn set(&self, value: f64) {
        self.cell.set(value);
    }

    pub fn add(&self, delta: f64) {
        self.cell.add(delta);
    }

    pub fn sub(&self, delta: f64) {
        self.cell.add(-delta);
    }

    pub fn inc(&self) {
        self.add(1.0);
    }

    pub fn dec(&self) {
        self.add(-1.0);
    }

    pub fn value(&self) -> f64 {
        self.cell.value()
    }

    pub fn sample_count(&self) -> u64 {
        self.cell.sample_count()
    }

    /// Whether both handles point at the same value cell.
    pub fn ptr_eq(&self, other: &Untyped) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl Metric for Untyped {
    fn description(&self) -> &Arc<Description> {
        &self.description
    }

    fn measure(&self) -> Result<MeasureValue> {
        Ok(self.cell.measure())
    }
}

impl Collector for Untyped {
    fn describe(&self, sink: &mut dyn DescriptionSink) {
        self.vector.describe_root(self, sink);
    }

    fn collect(&self, sink: &mut dyn MetricSink) {
        self.vector.collect_with_root(self, sink);
    }
}

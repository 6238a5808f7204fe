use crate::histogram::{SharedHistogram, DEFAULT_BINS};
use crate::measure::MeasureValue;

use super::DEFAULT_QUANTILES;

/// Engine plus the quantiles a histogram/timer reports.
#[derive(Debug)]
pub(crate) struct Distribution {
    engine: SharedHistogram,
    quantiles: Vec<f64>,
}

impl Distribution {
    /// Empty `quantiles` falls back to [`DEFAULT_QUANTILES`].
    pub(crate) fn new(quantiles: &[f64]) -> Self {
        let quantiles = if quantiles.is_empty() {
            DEFAULT_QUANTILES.to_vec()
        } else {
            quantiles.to_vec()
        };
        Self {
            engine: SharedHistogram::new(DEFAULT_BINS),
            quantiles,
        }
    }

    pub(crate) fn engine(&self) -> &SharedHistogram {
        &self.engine
    }

    pub(crate) fn quantiles(&self) -> &[f64] {
        &self.quantiles
    }

    pub(crate) fn measure(&self) -> MeasureValue {
        MeasureValue::Summary(self.engine.summary(&self.quantiles))
    }
}

//! Streaming histogram engine.
//!
//! Bounded-memory approximation of a value distribution using adaptive
//! centroid bins (Ben-Haim & Tom-Tov). Each observation lands in its own bin;
//! once the bin budget is exceeded the two closest neighbours are merged into
//! their weighted centroid. Count, sum, min, max and variance are tracked
//! exactly alongside the bins, so only `quantile` is an estimate.
//!
//! Empty-engine contract: `sum`, `min`, `max`, `variance` and every
//! `quantile` return `NaN`. Consumers must check before exporting.

use parking_lot::RwLock;

use crate::measure::HistogramSummary;

/// Default bin budget per engine.
pub const DEFAULT_BINS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bin {
    value: f64,
    weight: f64,
}

/// Single-owner engine. Wrap in [`SharedHistogram`] for concurrent use.
#[derive(Debug, Clone)]
pub struct StreamingHistogram {
    max_bins: usize,
    bins: Vec<Bin>,
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    mean: f64,
    m2: f64,
}

impl Default for StreamingHistogram {
    fn default() -> Self {
        Self::new(DEFAULT_BINS)
    }
}

impl StreamingHistogram {
    /// `max_bins` below 2 is raised to 2.
    pub fn new(max_bins: usize) -> Self {
        let max_bins = max_bins.max(2);
        Self {
            max_bins,
            bins: Vec::with_capacity(max_bins + 1),
            count: 0,
            sum: 0.0,
            min: f64::NAN,
            max: f64::NAN,
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Record one observation. `NaN` is ignored.
    pub fn add(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }

        self.count += 1;
        self.sum += value;
        if self.count == 1 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }

        // Welford
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);

        let idx = self.bins.partition_point(|b| b.value < value);
        match self.bins.get_mut(idx) {
            Some(bin) if bin.value == value => bin.weight += 1.0,
            _ => self.bins.insert(idx, Bin { value, weight: 1.0 }),
        }

        if self.bins.len() > self.max_bins {
            self.merge_closest();
        }
    }

    fn merge_closest(&mut self) {
        let Some(i) = self
            .bins
            .windows(2)
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = a[1].value - a[0].value;
                let db = b[1].value - b[0].value;
                da.total_cmp(&db)
            })
            .map(|(i, _)| i)
        else {
            return;
        };

        let right = self.bins.remove(i + 1);
        let left = &mut self.bins[i];
        let weight = left.weight + right.weight;
        left.value = (left.value * left.weight + right.value * right.weight) / weight;
        left.weight = weight;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }

    /// Sample variance (`n - 1` denominator); 0 for a single observation.
    pub fn variance(&self) -> f64 {
        match self.count {
            0 => f64::NAN,
            1 => 0.0,
            n => self.m2 / (n - 1) as f64,
        }
    }

    /// Estimated `q`-quantile, `q` in `[0, 1]`.
    ///
    /// Interpolates linearly between bin centroids, anchored at `min` for
    /// rank 0 and `max` for rank `count`. Out-of-range `q` yields `NaN`.
    pub fn quantile(&self, q: f64) -> f64 {
        if self.count == 0 || q.is_nan() || !(0.0..=1.0).contains(&q) {
            return f64::NAN;
        }
        if q == 0.0 {
            return self.min;
        }
        if q == 1.0 {
            return self.max;
        }

        let target = q * self.count as f64;
        let mut prev = (0.0_f64, self.min);
        let mut seen = 0.0_f64;

        let centres = self.bins.iter().map(|b| {
            let rank = seen + b.weight / 2.0;
            seen += b.weight;
            (rank, b.value)
        });

        for next in centres.chain(std::iter::once((self.count as f64, self.max))) {
            if target <= next.0 {
                let span = next.0 - prev.0;
                if span <= 0.0 {
                    return next.1;
                }
                return prev.1 + (next.1 - prev.1) * (target - prev.0) / span;
            }
            prev = next;
        }

        self.max
    }

    /// `(q, estimate)` pairs in the order requested.
    pub fn quantiles(&self, qs: &[f64]) -> Vec<(f64, f64)> {
        qs.iter().map(|&q| (q, self.quantile(q))).collect()
    }

    /// Number of bins currently held (never above the budget).
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub fn max_bins(&self) -> usize {
        self.max_bins
    }

    pub fn summary(&self, quantiles: &[f64]) -> HistogramSummary {
        HistogramSummary {
            sample_count: self.count,
            sample_sum: self.sum(),
            sample_min: self.min(),
            sample_max: self.max(),
            sample_variance: self.variance(),
            quantiles: self.quantiles(quantiles),
        }
    }
}

/// Engine guarded by a per-instance read/write lock.
///
/// `add` takes the lock exclusively; every read takes it shared, so a reader
/// never observes aggregates mid-update.
#[derive(Debug, Default)]
pub struct SharedHistogram {
    inner: RwLock<StreamingHistogram>,
}

impl SharedHistogram {
    pub fn new(max_bins: usize) -> Self {
        Self {
            inner: RwLock::new(StreamingHistogram::new(max_bins)),
        }
    }

    pub fn add(&self, value: f64) {
        self.inner.write().add(value);
    }

    pub fn count(&self) -> u64 {
        self.inner.read().count()
    }

    pub fn sum(&self) -> f64 {
        self.inner.read().sum()
    }

    pub fn min(&self) -> f64 {
        self.inner.read().min()
    }

    pub fn max(&self) -> f64 {
        self.inner.read().max()
    }

    pub fn variance(&self) -> f64 {
        self.inner.read().variance()
    }

    pub fn quantile(&self, q: f64) -> f64 {
        self.inner.read().quantile(q)
    }

    pub fn quantiles(&self, qs: &[f64]) -> Vec<(f64, f64)> {
        self.inner.read().quantiles(qs)
    }

    /// Every aggregate read under one shared lock.
    pub fn summary(&self, quantiles: &[f64]) -> HistogramSummary {
        self.inner.read().summary(quantiles)
    }

    /// Independent engine frozen from the current state.
    pub fn copy(&self) -> SharedHistogram {
        SharedHistogram {
            inner: RwLock::new(self.inner.read().clone()),
        }
    }
}

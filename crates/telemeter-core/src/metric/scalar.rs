use std::sync::atomic::{AtomicU64, Ordering};

use crate::measure::MeasureValue;

/// `f64` stored as its bit pattern in an `AtomicU64`.
#[derive(Debug, Default)]
pub(crate) struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub(crate) fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    /// CAS retry loop; every concurrent add is applied exactly once.
    pub(crate) fn add(&self, delta: f64) {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self
                .bits
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Value plus mutation count, shared by untyped, counter and gauge.
#[derive(Debug, Default)]
pub(crate) struct ScalarCell {
    value: AtomicF64,
    samples: AtomicU64,
}

impl ScalarCell {
    pub(crate) fn set(&self, value: f64) {
        self.value.store(value);
        self.samples.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(&self, delta: f64) {
        self.value.add(delta);
        self.samples.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn value(&self) -> f64 {
        self.value.load()
    }

    pub(crate) fn sample_count(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    pub(crate) fn measure(&self) -> MeasureValue {
        MeasureValue::Scalar {
            value: self.value(),
            sample_count: self.sample_count(),
        }
    }
}

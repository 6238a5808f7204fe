//! Metric primitives.
//!
//! Every primitive is a cheap-to-clone handle: clones share the same value
//! cell, description and label vector. Each one is also its own
//! [`Collector`](crate::Collector).

mod counter;
mod distribution;
mod gauge;
mod histogram;
mod scalar;
mod timer;
mod untyped;

pub use counter::Counter;
pub use gauge::Gauge;
pub use histogram::Histogram;
pub use timer::Timer;
pub use untyped::Untyped;

/// Quantiles reported when a histogram or timer is built without its own.
pub const DEFAULT_QUANTILES: [f64; 3] = [0.5, 0.9, 0.99];

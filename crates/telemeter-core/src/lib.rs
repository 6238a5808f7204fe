//! telemeter core: metric primitives, label vectors, the streaming histogram
//! engine, and the collector/snapshot contracts.
//!
//! This crate carries no async runtime. Collection scheduling and storage
//! fan-out live in `telemeter-agent`; everything here is safe to mutate from
//! any thread without caller-side locking.
//!
//! # Defensive guarantees
//! `unwrap`, `expect` and `panic!` are compile-denied here. The single
//! intentional exception is [`Counter::add`](metric::Counter::add), which
//! panics on a negative delta because a decreasing counter is a caller bug.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod collector;
pub mod description;
pub mod error;
pub mod histogram;
pub mod label;
pub mod measure;
pub mod metric;
pub mod vector;

pub use collector::{Collector, DescriptionSink, Metric, MetricSink};
pub use description::{Description, MetricType};
pub use error::{Result, TelemeterError};
pub use label::{Label, Labels, NO_LABELS};
pub use measure::{sort_measures, HistogramSummary, Measure, MeasureValue, Measures};
pub use metric::{Counter, Gauge, Histogram, Timer, Untyped, DEFAULT_QUANTILES};

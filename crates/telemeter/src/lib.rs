//! Top-level facade crate for telemeter.
//!
//! Re-exports the metric primitives and the agent library so users can depend on a single crate.

pub mod core {
    pub use telemeter_core::*;
}

pub mod agent {
    pub use telemeter_agent::*;
}

pub use telemeter_agent::{default_registry, Registry};
pub use telemeter_core::{Counter, Gauge, Histogram, Labels, Timer, Untyped};

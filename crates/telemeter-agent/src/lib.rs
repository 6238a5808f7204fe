//! telemeter agent library entry.
//!
//! Wires the registry (describe/collect/send protocol and periodic
//! scheduler), the storage sinks, the runtime collectors and the
//! operational HTTP surface. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod collector;
pub mod config;
pub mod ops;
pub mod registry;
pub mod router;
pub mod storage;

pub use registry::{default_registry, Registry};
pub use storage::{GatherFn, PullStorage, Storage};

//! Built-in runtime collectors.

mod build_info;
mod process;

pub use build_info::BuildInfoCollector;
pub use process::ProcessCollector;

//! Shared error type across telemeter crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, TelemeterError>;

/// Unified error type used by core and agent.
#[derive(Debug, Error)]
pub enum TelemeterError {
    /// Caller misuse, e.g. a negative counter delta.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A metric could not produce a snapshot.
    #[error("measure failed for {name}: {reason}")]
    Measure { name: String, reason: String },
    /// A single storage rejected a batch.
    #[error("storage {id} write failed: {reason}")]
    Storage { id: String, reason: String },
    /// Every storage failure of one send pass.
    #[error("{} storage write(s) failed: {}", .0.len(), join_errors(.0))]
    Storages(Vec<TelemeterError>),
    #[error("storage {0} not exists")]
    StorageNotFound(String),
    /// The scheduler needs a tokio runtime to spawn on.
    #[error("no async runtime available")]
    NoRuntime,
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

fn join_errors(errors: &[TelemeterError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl TelemeterError {
    /// Build a storage failure for the sink with the given id.
    pub fn storage(id: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        TelemeterError::Storage {
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    /// Number of individual failures carried (1 unless aggregated).
    pub fn failure_count(&self) -> usize {
        match self {
            TelemeterError::Storages(errors) => errors.len(),
            _ => 1,
        }
    }
}

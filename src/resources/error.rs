//! Errors raised by the allocation core.

use crate::process::ProcessId;

/// Errors that can occur while mutating the resource pool or the process set.
///
/// `IndexOutOfRange` is a caller bug (the action policy picked a resource type
/// that does not exist). `InvariantViolation` means the shared vectors no
/// longer add up and the simulation must stop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("Resource index {index} out of range (system has {len} resource types)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Unknown process: {id}")]
    UnknownProcess { id: ProcessId },

    #[error("Invalid system parameters: {0}")]
    InvalidSystem(String),

    #[error("Resource manager lock poisoned")]
    LockPoisoned,
}

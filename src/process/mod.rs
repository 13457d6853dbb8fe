//! Process module.
//!
//! This module holds the per-process allocation state and the action
//! vocabulary (request/release) processes use against the shared pool.

pub mod state;
pub mod types;

// Re-export commonly used types for convenience
pub use state::Process;
pub use types::{Action, ActionOutcome, ActionRecord, Choice, ProcessId};

//! Process-level type definitions.
//!
//! This file contains the action vocabulary shared by processes, the
//! action policy and the resource manager.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a process: its index in creation order.
pub type ProcessId = usize;

/// What a process does with its chosen resource type during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Ask for one unit
    Request,
    /// Hand back one unit
    Release,
}

impl Action {
    /// Get the string representation of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Request => "request",
            Action::Release => "release",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action aimed at a specific resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub action: Action,
    pub resource: usize,
}

impl Choice {
    pub fn request(resource: usize) -> Self {
        Self {
            action: Action::Request,
            resource,
        }
    }

    pub fn release(resource: usize) -> Self {
        Self {
            action: Action::Release,
            resource,
        }
    }
}

/// Result of dispatching a single choice against the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// A unit was allocated to the process
    Granted,
    /// Nothing free; the process is now pending on the resource type
    Waiting,
    /// A held unit went back to the pool
    Released,
    /// Release of a type the process does not hold; nothing changed
    NotHeld,
}

impl ActionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionOutcome::Granted => "granted",
            ActionOutcome::Waiting => "waiting",
            ActionOutcome::Released => "released",
            ActionOutcome::NotHeld => "not held",
        }
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One process's action during a step, as reported to sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub process: ProcessId,
    pub choice: Choice,
    pub outcome: ActionOutcome,
}

//! Deadlock detection and resolution.
//!
//! Both halves are stateless over the resource manager's data: they take
//! the process set and the pool by reference and decide, respectively,
//! whether the system is stuck and which process pays to unstick it.

pub mod detector;
pub mod graph;
pub mod resolver;

pub use detector::{DeadlockDetector, DetectorKind, LegacyDetector, WaitForGraphDetector};
pub use graph::WaitForGraph;
pub use resolver::{DeadlockResolver, EliminationMode, Resolution};

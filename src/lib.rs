//! # DeadlockSim - Resource allocation simulator with deadlock handling
//!
//! This library models a finite set of processes competing for a finite set
//! of reusable resource types through single-unit requests, detects when the
//! system is stuck, and reclaims resources from a victim to restore progress.
//!
//! ## Overview
//!
//! Each simulation step, every process (in creation order) asks the action
//! policy what to do and either requests or releases one unit of a resource
//! type. Once all processes have acted, the configured detector inspects the
//! system once, and if it reports a deadlock the resolver reclaims everything
//! held by the first process that holds anything.
//!
//! ## Architecture
//!
//! - `resources`: the shared available-resource pool and core errors
//! - `process`: per-process allocation and pending-request state
//! - `deadlock`: detectors (legacy blocked check, wait-for graph) and resolver
//! - `policy`: action selection (seeded random, scripted)
//! - `manager`: step orchestration, invariant checks, snapshots
//! - `report`: step reports, snapshots and reporting sinks
//! - `config` / `config_loader`: YAML configuration and CLI overrides
//! - `orchestrator`: runs a configured simulation end to end
//!
//! ## Example Usage
//!
//! ```rust
//! use deadlocksim::manager::ResourceManager;
//! use deadlocksim::policy::ScriptedPolicy;
//! use deadlocksim::process::Choice;
//!
//! let policy = ScriptedPolicy::new([
//!     Some(Choice::request(0)),
//!     Some(Choice::request(0)),
//!     None,
//! ]);
//! let mut manager = ResourceManager::new(vec![1, 0], 3, Box::new(policy))?;
//!
//! let report = manager.step()?;
//! assert!(report.deadlock_detected);
//! assert_eq!(report.resolution.map(|r| r.victim), Some(0));
//! assert_eq!(manager.snapshot().available, vec![1, 0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Known Limitations
//!
//! The default (legacy) detector is a local per-process check, not a proof
//! of circular wait. A process with no pending requests counts as blocked,
//! so it reports deadlock far more often than one exists. The wait-for graph
//! detector is available when only genuine cycles should trigger resolution.
//!
//! ## Error Handling
//!
//! Core operations return `ResourceError` (via `thiserror`). The orchestrator
//! and binary use `color_eyre` for reporting with context.

pub mod config;
pub mod config_loader;
pub mod deadlock;
pub mod manager;
pub mod orchestrator;
pub mod policy;
pub mod process;
pub mod report;
pub mod resources;

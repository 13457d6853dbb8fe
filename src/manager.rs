//! Resource manager.
//!
//! Owns the shared pool and the process set, and runs the simulation one
//! step at a time: every process acts once in creation order, then
//! detection runs once and, if it fires, resolution runs once.
//!
//! Conservation (`available[r] + Σ allocated[p][r] == total[r]`) is checked
//! after every mutation. A violation is fatal and propagated to the caller.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};

use crate::deadlock::{
    DeadlockDetector, DeadlockResolver, EliminationMode, LegacyDetector, Resolution,
};
use crate::policy::ActionPolicy;
use crate::process::{Action, ActionOutcome, ActionRecord, Choice, Process, ProcessId};
use crate::report::{ProcessSnapshot, Snapshot, StepReport};
use crate::resources::{ResourceError, ResourcePool};

/// Owns the pool and the processes competing for it.
pub struct ResourceManager {
    pool: ResourcePool,
    processes: Vec<Process>,
    policy: Box<dyn ActionPolicy>,
    detector: Box<dyn DeadlockDetector>,
    resolver: DeadlockResolver,
    step: u64,
}

impl ResourceManager {
    /// Create `num_processes` idle processes over a pool seeded with
    /// `available`. Uses the legacy detector and soft-reset resolution until
    /// told otherwise.
    pub fn new(
        available: Vec<u32>,
        num_processes: usize,
        policy: Box<dyn ActionPolicy>,
    ) -> Result<Self, ResourceError> {
        if num_processes == 0 {
            return Err(ResourceError::InvalidSystem(
                "at least one process is required".to_string(),
            ));
        }
        if available.is_empty() {
            return Err(ResourceError::InvalidSystem(
                "at least one resource type is required".to_string(),
            ));
        }

        let num_resources = available.len();
        let processes = (0..num_processes)
            .map(|id| Process::new(id, num_resources))
            .collect();

        info!(
            "Initialized {} processes over {} resource types, available {:?}",
            num_processes, num_resources, available
        );

        Ok(Self {
            pool: ResourcePool::new(available),
            processes,
            policy,
            detector: Box::new(LegacyDetector),
            resolver: DeadlockResolver::default(),
            step: 0,
        })
    }

    pub fn with_detector(mut self, detector: Box<dyn DeadlockDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_elimination(mut self, mode: EliminationMode) -> Self {
        self.resolver = DeadlockResolver::new(mode);
        self
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Active processes in creation order.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn num_resources(&self) -> usize {
        self.pool.len()
    }

    /// Steps completed so far.
    pub fn steps_run(&self) -> u64 {
        self.step
    }

    pub fn detector_name(&self) -> &'static str {
        self.detector.name()
    }

    /// Run one simulation step.
    pub fn step(&mut self) -> Result<StepReport, ResourceError> {
        self.step += 1;
        debug!("Step {} begins", self.step);

        let num_resources = self.pool.len();
        let ids: Vec<ProcessId> = self.processes.iter().map(Process::id).collect();
        let mut actions = Vec::with_capacity(ids.len());

        for id in ids {
            let Some(choice) = self.policy.choose(id, num_resources) else {
                continue;
            };
            let outcome = self.act(id, choice)?;
            actions.push(ActionRecord {
                process: id,
                choice,
                outcome,
            });
        }

        let (deadlock_detected, resolution) = self.detect_and_resolve()?;

        Ok(StepReport {
            step: self.step,
            actions,
            deadlock_detected,
            resolution,
        })
    }

    /// Apply one process's choice to the pool.
    pub fn act(&mut self, id: ProcessId, choice: Choice) -> Result<ActionOutcome, ResourceError> {
        let process = self
            .processes
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(ResourceError::UnknownProcess { id })?;

        let outcome = match choice.action {
            Action::Request => process.request(choice.resource, &mut self.pool)?,
            Action::Release => process.release(choice.resource, &mut self.pool)?,
        };

        self.check_invariants()?;
        Ok(outcome)
    }

    /// Whether the configured detector currently reports a deadlock.
    pub fn is_deadlocked(&self) -> bool {
        self.detector.detect(&self.processes, &self.pool)
    }

    /// Run detection once and, if it fires, resolution once.
    pub fn detect_and_resolve(&mut self) -> Result<(bool, Option<Resolution>), ResourceError> {
        if !self.is_deadlocked() {
            return Ok((false, None));
        }

        info!(
            "Deadlock detected by {} detector at step {}. Resolving...",
            self.detector.name(),
            self.step
        );
        let resolution = self.resolver.resolve(&mut self.processes, &mut self.pool)?;
        self.check_invariants()?;
        Ok((true, resolution))
    }

    /// Immutable view of the available vector and every process's allocation.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step,
            available: self.pool.available().to_vec(),
            processes: self
                .processes
                .iter()
                .map(|p| ProcessSnapshot {
                    id: p.id(),
                    allocated: p.allocated().to_vec(),
                    pending: p.pending_resources(),
                })
                .collect(),
        }
    }

    /// Verify conservation for every resource type.
    pub fn check_invariants(&self) -> Result<(), ResourceError> {
        for (r, &total) in self.pool.totals().iter().enumerate() {
            let held: u64 = self
                .processes
                .iter()
                .map(|p| u64::from(p.allocated()[r]))
                .sum();
            let available = u64::from(self.pool.available()[r]);
            if available + held != u64::from(total) {
                return Err(ResourceError::InvariantViolation(format!(
                    "R{}: {} available + {} allocated != {} total",
                    r, available, held, total
                )));
            }
        }
        Ok(())
    }
}

/// A `ResourceManager` behind a single lock, for drivers that act from
/// several threads.
///
/// Each method holds the lock for its whole duration, so one process's
/// action is atomic and detection never observes a half-applied step.
#[derive(Clone)]
pub struct SharedResourceManager {
    inner: Arc<Mutex<ResourceManager>>,
}

impl SharedResourceManager {
    pub fn new(manager: ResourceManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ResourceManager>, ResourceError> {
        self.inner.lock().map_err(|_| ResourceError::LockPoisoned)
    }

    pub fn step(&self) -> Result<StepReport, ResourceError> {
        self.lock()?.step()
    }

    pub fn act(&self, id: ProcessId, choice: Choice) -> Result<ActionOutcome, ResourceError> {
        self.lock()?.act(id, choice)
    }

    pub fn detect_and_resolve(&self) -> Result<(bool, Option<Resolution>), ResourceError> {
        self.lock()?.detect_and_resolve()
    }

    pub fn snapshot(&self) -> Result<Snapshot, ResourceError> {
        Ok(self.lock()?.snapshot())
    }
}

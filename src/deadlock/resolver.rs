//! Deadlock resolution by forced reclaim.
//!
//! The victim is always the first process in creation order that holds
//! anything. Its whole allocation goes back to the pool. Its pending flags are
//! left alone and its outstanding request is not retried; it gets another
//! chance on the next step like every other waiter.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::process::{Process, ProcessId};
use crate::resources::{ResourceError, ResourcePool};

/// What happens to the victim once its resources are reclaimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationMode {
    /// Zero the allocation and keep the process in the simulation
    #[default]
    SoftReset,
    /// Zero the allocation and drop the process from the active set
    HardRemoval,
}

/// Record of one resolution pass that picked a victim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub victim: ProcessId,
    /// Units returned to the pool, per resource type
    pub reclaimed: Vec<u32>,
    pub mode: EliminationMode,
}

/// Reclaims resources from a single victim per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadlockResolver {
    mode: EliminationMode,
}

impl DeadlockResolver {
    pub fn new(mode: EliminationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> EliminationMode {
        self.mode
    }

    /// Reclaim everything from the first process holding any resource.
    ///
    /// Returns `None` when no process holds anything, in which case nothing
    /// is modified.
    pub fn resolve(
        &self,
        processes: &mut Vec<Process>,
        pool: &mut ResourcePool,
    ) -> Result<Option<Resolution>, ResourceError> {
        let Some(index) = processes.iter().position(Process::holds_any) else {
            warn!("Deadlock reported but no process holds resources to reclaim");
            return Ok(None);
        };

        let reclaimed = processes[index].reclaim_all(pool)?;
        let victim = processes[index].id();

        match self.mode {
            EliminationMode::SoftReset => {
                info!("Process {} eliminated to free resources {:?}", victim, reclaimed);
            }
            EliminationMode::HardRemoval => {
                processes.remove(index);
                warn!(
                    "Process {} removed from the simulation after freeing {:?}",
                    victim, reclaimed
                );
            }
        }

        Ok(Some(Resolution {
            victim,
            reclaimed,
            mode: self.mode,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> (Vec<Process>, ResourcePool) {
        // P0 idle, P1 holds R0 and R1, P2 holds R1 and waits on R0.
        let mut pool = ResourcePool::new(vec![1, 2]);
        let mut processes: Vec<Process> = (0..3).map(|id| Process::new(id, 2)).collect();

        processes[1].request(0, &mut pool).unwrap();
        processes[1].request(1, &mut pool).unwrap();
        processes[2].request(1, &mut pool).unwrap();
        processes[2].request(0, &mut pool).unwrap();

        (processes, pool)
    }

    #[test]
    fn test_soft_reset_picks_first_holder() {
        let (mut processes, mut pool) = scenario();
        let resolver = DeadlockResolver::default();

        let resolution = resolver.resolve(&mut processes, &mut pool).unwrap().unwrap();

        assert_eq!(resolution.victim, 1);
        assert_eq!(resolution.reclaimed, vec![1, 1]);
        assert_eq!(resolution.mode, EliminationMode::SoftReset);
        assert_eq!(processes.len(), 3);
        assert_eq!(processes[1].allocated(), &[0, 0]);
        // Only one victim per call.
        assert_eq!(processes[2].allocated(), &[0, 1]);
        assert_eq!(pool.available(), &[1, 1]);
    }

    #[test]
    fn test_victim_request_is_not_retried() {
        let (mut processes, mut pool) = scenario();
        DeadlockResolver::default()
            .resolve(&mut processes, &mut pool)
            .unwrap();

        // R0 is free again but P2 stays pending until it asks on a later step.
        assert_eq!(processes[2].pending(), &[true, false]);
        assert_eq!(processes[2].allocated(), &[0, 1]);
    }

    #[test]
    fn test_hard_removal_drops_victim() {
        let (mut processes, mut pool) = scenario();
        let resolver = DeadlockResolver::new(EliminationMode::HardRemoval);

        let resolution = resolver.resolve(&mut processes, &mut pool).unwrap().unwrap();

        assert_eq!(resolution.victim, 1);
        let ids: Vec<ProcessId> = processes.iter().map(Process::id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(pool.available(), &[1, 1]);
    }

    #[test]
    fn test_nothing_to_reclaim() {
        let mut pool = ResourcePool::new(vec![2]);
        let mut processes = vec![Process::new(0, 1), Process::new(1, 1)];

        let resolution = DeadlockResolver::default()
            .resolve(&mut processes, &mut pool)
            .unwrap();

        assert!(resolution.is_none());
        assert_eq!(pool.available(), &[2]);
    }
}

//! Wait-for graph over the process set.
//!
//! Process `P` has an edge to `Q` when `P` is pending on a resource type that
//! has nothing free and `Q` holds at least one unit of that type. A cycle in
//! this graph is a circular wait.
//!
//! Self-edges are never added. A process that holds every unit of a type and
//! asks for one more is waiting on itself, but it can still release what it
//! holds, so this detector does not treat that as deadlock. The legacy
//! detector does flag it, since the process is blocked in the local sense.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::process::{Process, ProcessId};
use crate::resources::ResourcePool;

/// Directed wait-for graph, keyed by process id in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitForGraph {
    edges: BTreeMap<ProcessId, BTreeSet<ProcessId>>,
}

impl WaitForGraph {
    /// Build the graph from the current process and pool state.
    pub fn build(processes: &[Process], pool: &ResourcePool) -> Self {
        let mut graph = Self::default();

        for waiter in processes {
            graph.edges.entry(waiter.id()).or_default();
            for resource in waiter.pending_resources() {
                if pool.has_free(resource) {
                    continue;
                }
                for holder in processes {
                    if holder.id() != waiter.id()
                        && holder.allocated().get(resource).is_some_and(|&units| units > 0)
                    {
                        graph.add_edge(waiter.id(), holder.id());
                    }
                }
            }
        }

        graph
    }

    /// Add an edge `from -> to`
    pub fn add_edge(&mut self, from: ProcessId, to: ProcessId) {
        self.edges.entry(to).or_default();
        self.edges.entry(from).or_default().insert(to);
    }

    /// Processes `id` is waiting on.
    pub fn waits_on(&self, id: ProcessId) -> Vec<ProcessId> {
        self.edges
            .get(&id)
            .map(|targets| targets.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Detect cycles using DFS, returning the processes on the first cycle
    /// found in creation order.
    pub fn find_cycle(&self) -> Option<Vec<ProcessId>> {
        let mut visited = HashSet::new();
        let mut stack = HashSet::new();
        let mut path = Vec::new();

        for &node in self.edges.keys() {
            if !visited.contains(&node) {
                let found = self.dfs_cycle_detect(node, &mut visited, &mut stack, &mut path);
                if let Some(cycle) = found {
                    return Some(cycle);
                }
            }
        }

        None
    }

    pub fn has_cycle(&self) -> bool {
        self.find_cycle().is_some()
    }

    fn dfs_cycle_detect(
        &self,
        node: ProcessId,
        visited: &mut HashSet<ProcessId>,
        stack: &mut HashSet<ProcessId>,
        path: &mut Vec<ProcessId>,
    ) -> Option<Vec<ProcessId>> {
        visited.insert(node);
        stack.insert(node);
        path.push(node);

        if let Some(neighbors) = self.edges.get(&node) {
            for &neighbor in neighbors {
                if !visited.contains(&neighbor) {
                    if let Some(cycle) = self.dfs_cycle_detect(neighbor, visited, stack, path) {
                        return Some(cycle);
                    }
                } else if stack.contains(&neighbor) {
                    if let Some(start) = path.iter().position(|&n| n == neighbor) {
                        return Some(path[start..].to_vec());
                    }
                }
            }
        }

        stack.remove(&node);
        path.pop();
        None
    }
}

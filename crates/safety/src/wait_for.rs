//! Wait-for graph construction and cycle search.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use schedsim_core::{Pid, ResourceId, Task};
use serde::{Deserialize, Serialize};

/// `from` is blocked on `resource`, which `to` currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitEdge {
    /// Waiting task
    pub from: Pid,
    /// Holding task
    pub to: Pid,
    /// Resource in contention
    pub resource: ResourceId,
}

/// Directed graph with an edge `u → v` whenever task `u` waits on a resource
/// held by task `v`.
///
/// Every task is a node, including tasks with no claims. Successors are kept
/// sorted so traversals are reproducible.
#[derive(Debug, Clone, Default)]
pub struct WaitForGraph {
    adjacency: BTreeMap<Pid, BTreeSet<Pid>>,
    edges: Vec<WaitEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    OnPath,
    Done,
}

impl WaitForGraph {
    /// Build the graph from the `holding`/`waiting` fields of `tasks`.
    ///
    /// A resource may have several holders; a waiter gets an edge to each of
    /// them except itself.
    pub fn build(tasks: &[Task]) -> Self {
        let mut holders: HashMap<&str, Vec<Pid>> = HashMap::new();
        for task in tasks {
            if let Some(resource) = task.holding.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
                holders.entry(resource).or_default().push(task.pid);
            }
        }

        let mut graph = Self {
            adjacency: tasks.iter().map(|t| (t.pid, BTreeSet::new())).collect(),
            edges: Vec::new(),
        };

        for task in tasks {
            let Some(resource) = task.waiting.as_deref().map(str::trim).filter(|r| !r.is_empty()) else {
                continue;
            };
            let Some(owners) = holders.get(resource) else {
                continue;
            };
            for &owner in owners.iter().filter(|&&o| o != task.pid) {
                if graph.adjacency.entry(task.pid).or_default().insert(owner) {
                    graph.edges.push(WaitEdge {
                        from: task.pid,
                        to: owner,
                        resource: resource.to_string(),
                    });
                }
            }
        }

        graph
    }

    /// Nodes in ascending pid order.
    pub fn nodes(&self) -> impl Iterator<Item = Pid> + '_ {
        self.adjacency.keys().copied()
    }

    /// Tasks that `pid` waits on, in ascending pid order.
    pub fn successors(&self, pid: Pid) -> impl Iterator<Item = Pid> + '_ {
        self.adjacency.get(&pid).into_iter().flatten().copied()
    }

    /// Edges in construction order.
    pub fn edges(&self) -> &[WaitEdge] {
        &self.edges
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// First cycle found by a depth-first search from each unvisited node in
    /// ascending pid order.
    ///
    /// The cycle is returned in traversal order, starting at the node the
    /// search closed the loop on.
    pub fn find_cycle(&self) -> Option<Vec<Pid>> {
        let mut state: BTreeMap<Pid, VisitState> = self
            .adjacency
            .keys()
            .map(|&pid| (pid, VisitState::Unvisited))
            .collect();

        for &root in self.adjacency.keys() {
            if state.get(&root) != Some(&VisitState::Unvisited) {
                continue;
            }
            let (found, next_state) = self.walk_from(root, state);
            state = next_state;
            if found.is_some() {
                return found;
            }
        }

        None
    }

    /// Iterative DFS from `root`. Takes the visit-state map by value and
    /// hands it back updated, together with the cycle if one was closed.
    fn walk_from(
        &self,
        root: Pid,
        mut state: BTreeMap<Pid, VisitState>,
    ) -> (Option<Vec<Pid>>, BTreeMap<Pid, VisitState>) {
        let mut path: Vec<Pid> = vec![root];
        let mut frames = vec![self.successors(root)];
        state.insert(root, VisitState::OnPath);

        while let Some(frame) = frames.last_mut() {
            let Some(next) = frame.next() else {
                frames.pop();
                if let Some(done) = path.pop() {
                    state.insert(done, VisitState::Done);
                }
                continue;
            };

            match state.get(&next).copied().unwrap_or(VisitState::Unvisited) {
                VisitState::OnPath => {
                    let cycle = path
                        .iter()
                        .position(|&p| p == next)
                        .map(|start| path[start..].to_vec());
                    return (cycle, state);
                }
                VisitState::Unvisited => {
                    state.insert(next, VisitState::OnPath);
                    path.push(next);
                    frames.push(self.successors(next));
                }
                VisitState::Done => {}
            }
        }

        (None, state)
    }
}

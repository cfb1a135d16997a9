use std::collections::VecDeque;

use log::trace;

use crate::error::{Result, TrellisError};
use crate::structs::{NodeId, Trellis};

/// A visitation order of every trellis node in which each node comes after
/// all of its predecessors.
///
/// This is computed once per call and shared by every algorithm that runs
/// over the same trellis.
#[derive(Clone, Debug)]
pub struct TopologicalOrder {
    nodes: Vec<NodeId>,
}

impl TopologicalOrder {
    /// Kahn's algorithm. The trellis is never mutated: the remaining
    /// in-degree of each node is tracked in a separate counter vector.
    ///
    /// Candidates are consumed first-in first-out and successors are
    /// enumerated in ascending state-label order, so ties are broken by
    /// label and then by position.
    pub fn new(trellis: &Trellis) -> Result<Self> {
        let mut in_degree: Vec<usize> = trellis.nodes().iter().map(|n| n.in_degree).collect();

        let mut sources: Vec<NodeId> = (0..trellis.num_nodes())
            .map(NodeId)
            .filter(|id| in_degree[id.0] == 0)
            .collect();
        sources.sort_by_key(|&id| trellis.sort_key(id));

        let mut candidates: VecDeque<NodeId> = sources.into();
        let mut nodes: Vec<NodeId> = Vec::with_capacity(trellis.num_nodes());
        let mut consumed_edges: usize = 0;

        while let Some(node) = candidates.pop_front() {
            nodes.push(node);

            for &next in trellis.successors(node) {
                consumed_edges += 1;
                in_degree[next.0] -= 1;
                if in_degree[next.0] == 0 {
                    candidates.push_back(next);
                }
            }
        }

        if consumed_edges != trellis.num_edges() {
            return Err(TrellisError::NotADag {
                remaining_edges: trellis.num_edges() - consumed_edges,
            });
        }

        trace!("topological order covers {} nodes", nodes.len());

        Ok(Self { nodes })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

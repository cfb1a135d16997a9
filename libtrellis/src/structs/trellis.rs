use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrellisError};
use crate::structs::TopologicalOrder;

/// An index into the node arena of a [`Trellis`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Start,
    /// The hidden state at `state_idx` (into the sorted state list)
    /// paired with the observation at `position`.
    Emitting { state_idx: usize, position: usize },
    End,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    /// The hidden state label; `None` for the sentinels.
    pub state: Option<char>,
    /// The observed symbol at this node's position; `None` for the sentinels.
    pub symbol: Option<char>,
    /// The number of edges that end at this node.
    pub in_degree: usize,
}

impl Node {
    fn sentinel(kind: NodeKind) -> Self {
        Node {
            kind,
            state: None,
            symbol: None,
            in_degree: 0,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self.kind, NodeKind::Emitting { .. })
    }

    pub fn position(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Emitting { position, .. } => Some(position),
            _ => None,
        }
    }

    pub fn state_idx(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Emitting { state_idx, .. } => Some(state_idx),
            _ => None,
        }
    }
}

/// The layered DAG of every hidden-state assignment to an observation sequence.
///
/// Node 0 is the start sentinel, the last node is the end sentinel, and the
/// emitting nodes in between are laid out layer by layer: the node for state
/// `s` at position `t` lives at `1 + t * |states| + s`. Adjacent layers are
/// fully connected. Both adjacency lists of every node are ordered by
/// ascending state label.
///
/// The trellis itself is immutable once built. Per-call scores live in a
/// separate [`ScoreTable`](crate::structs::ScoreTable).
#[derive(Clone, Debug)]
pub struct Trellis {
    states: Vec<char>,
    sequence: Vec<char>,
    nodes: Vec<Node>,
    successors: Vec<Vec<NodeId>>,
    predecessors: Vec<Vec<NodeId>>,
    num_edges: usize,
}

impl Trellis {
    /// Build the trellis for `sequence` over the hidden `states`.
    ///
    /// The states are deduplicated and sorted; the trellis does not look at
    /// any probabilities.
    pub fn new(sequence: &[char], states: &[char]) -> Result<Self> {
        if states.is_empty() {
            return Err(TrellisError::EmptyInput { what: "state set" });
        }
        if sequence.is_empty() {
            return Err(TrellisError::EmptyInput {
                what: "observation sequence",
            });
        }

        let states: Vec<char> = states
            .iter()
            .copied()
            .collect::<BTreeSet<char>>()
            .into_iter()
            .collect();

        let num_states = states.len();
        let length = sequence.len();
        let num_nodes = num_states * length + 2;

        let mut nodes = Vec::with_capacity(num_nodes);
        nodes.push(Node::sentinel(NodeKind::Start));
        for (position, &symbol) in sequence.iter().enumerate() {
            for (state_idx, &state) in states.iter().enumerate() {
                nodes.push(Node {
                    kind: NodeKind::Emitting {
                        state_idx,
                        position,
                    },
                    state: Some(state),
                    symbol: Some(symbol),
                    in_degree: 0,
                });
            }
        }
        nodes.push(Node::sentinel(NodeKind::End));

        let mut trellis = Trellis {
            states,
            sequence: sequence.to_vec(),
            nodes,
            successors: vec![vec![]; num_nodes],
            predecessors: vec![vec![]; num_nodes],
            num_edges: 0,
        };

        for state_idx in 0..num_states {
            trellis.add_edge(trellis.start(), trellis.node_at(state_idx, 0));
        }

        // the inner loop runs over the source state so that
        // every predecessor list ends up in ascending label order
        for position in 1..length {
            for to_idx in 0..num_states {
                for from_idx in 0..num_states {
                    trellis.add_edge(
                        trellis.node_at(from_idx, position - 1),
                        trellis.node_at(to_idx, position),
                    );
                }
            }
        }

        for state_idx in 0..num_states {
            trellis.add_edge(trellis.node_at(state_idx, length - 1), trellis.end());
        }

        debug!(
            "built trellis: {} states x {} positions, {} nodes, {} edges",
            num_states,
            length,
            trellis.num_nodes(),
            trellis.num_edges()
        );

        Ok(trellis)
    }

    fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.successors[from.0].push(to);
        self.predecessors[to.0].push(from);
        self.nodes[to.0].in_degree += 1;
        self.num_edges += 1;
    }

    /// Run Kahn's algorithm over the trellis.
    pub fn topological_order(&self) -> Result<TopologicalOrder> {
        TopologicalOrder::new(self)
    }

    pub fn start(&self) -> NodeId {
        NodeId(0)
    }

    pub fn end(&self) -> NodeId {
        NodeId(self.nodes.len() - 1)
    }

    #[inline(always)]
    pub fn node_at(&self, state_idx: usize, position: usize) -> NodeId {
        debug_assert!(state_idx < self.states.len());
        debug_assert!(position < self.sequence.len());
        NodeId(1 + position * self.states.len() + state_idx)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The emitting nodes of one position, in ascending state order.
    pub fn layer(&self, position: usize) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.states.len()).map(move |state_idx| self.node_at(state_idx, position))
    }

    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        &self.successors[id.0]
    }

    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        &self.predecessors[id.0]
    }

    /// The sorted, deduplicated hidden states.
    pub fn states(&self) -> &[char] {
        &self.states
    }

    pub fn sequence(&self) -> &[char] {
        &self.sequence
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn length(&self) -> usize {
        self.sequence.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Orders sentinels around the emitting nodes, then emitting
    /// nodes by state label and position.
    pub(crate) fn sort_key(&self, id: NodeId) -> (u8, Option<char>, usize) {
        let node = self.node(id);
        match node.kind {
            NodeKind::Start => (0, None, 0),
            NodeKind::Emitting { position, .. } => (1, node.state, position),
            NodeKind::End => (2, None, 0),
        }
    }
}

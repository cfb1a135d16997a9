use serde::Serialize;

use crate::decode::{backward, forward, EdgeWeights};
use crate::error::{Result, TrellisError};
use crate::structs::{NodeId, NodeKind, ScoreTable, TopologicalOrder, Trellis};

/// Posterior state and transition probabilities for every position of a
/// sequence.
///
/// States are stored in ascending label order, the same order the trellis
/// lays out its layers in.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Posteriors {
    /// The forward probability of the whole sequence.
    pub sink: f64,
    states: Vec<char>,
    length: usize,
    /// γ, indexed `[position * |states| + state_idx]`
    nodes: Vec<f64>,
    /// ξ, indexed `[(position * |states| + from_idx) * |states| + to_idx]`,
    /// for the edge from layer `position` into layer `position + 1`
    edges: Vec<f64>,
}

impl Posteriors {
    pub fn states(&self) -> &[char] {
        &self.states
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// The length of the sequence.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    fn state_idx(&self, state: char) -> Option<usize> {
        self.states.binary_search(&state).ok()
    }

    /// γ for every state at `position`, in ascending label order.
    pub fn row(&self, position: usize) -> &[f64] {
        let num_states = self.states.len();
        &self.nodes[position * num_states..(position + 1) * num_states]
    }

    #[inline(always)]
    pub fn state_posterior_at(&self, position: usize, state_idx: usize) -> f64 {
        self.nodes[position * self.states.len() + state_idx]
    }

    #[inline(always)]
    pub fn edge_posterior_at(&self, position: usize, from_idx: usize, to_idx: usize) -> f64 {
        let num_states = self.states.len();
        self.edges[(position * num_states + from_idx) * num_states + to_idx]
    }

    /// The probability that the hidden state at `position` was `state`.
    pub fn state_posterior(&self, position: usize, state: char) -> Option<f64> {
        if position >= self.length {
            return None;
        }
        let state_idx = self.state_idx(state)?;
        Some(self.state_posterior_at(position, state_idx))
    }

    /// The probability that the hidden state moved from `from` at `position`
    /// to `to` at `position + 1`.
    pub fn edge_posterior(&self, position: usize, from: char, to: char) -> Option<f64> {
        if position + 1 >= self.length {
            return None;
        }
        let from_idx = self.state_idx(from)?;
        let to_idx = self.state_idx(to)?;
        Some(self.edge_posterior_at(position, from_idx, to_idx))
    }

    /// γ of an emitting trellis node; `None` for the sentinels.
    pub fn node_posterior(&self, trellis: &Trellis, id: NodeId) -> Option<f64> {
        match trellis.node(id).kind {
            NodeKind::Emitting {
                state_idx,
                position,
            } => Some(self.state_posterior_at(position, state_idx)),
            _ => None,
        }
    }

    /// ξ of a trellis edge between two consecutive emitting layers; `None`
    /// for any other node pair.
    pub fn edge_posterior_between(
        &self,
        trellis: &Trellis,
        from: NodeId,
        to: NodeId,
    ) -> Option<f64> {
        match (trellis.node(from).kind, trellis.node(to).kind) {
            (
                NodeKind::Emitting {
                    state_idx: from_idx,
                    position,
                },
                NodeKind::Emitting {
                    state_idx: to_idx,
                    position: to_position,
                },
            ) if to_position == position + 1 => {
                Some(self.edge_posterior_at(position, from_idx, to_idx))
            }
            _ => None,
        }
    }
}

/// Run forward and then backward over the trellis and derive:
///
///   γ(v)     = score(v) * rev_score(v) / sink
///   ξ(u -> v) = score(u) * rev_score(v) * weight(u -> v) / sink
///
/// for every emitting node `v` and every edge `u -> v` between consecutive
/// emitting layers.
pub fn posterior(
    trellis: &Trellis,
    order: &TopologicalOrder,
    weights: &EdgeWeights,
    scores: &mut ScoreTable,
) -> Result<Posteriors> {
    let sink = forward(trellis, order, weights, scores);
    if sink == 0.0 {
        return Err(TrellisError::ImpossibleObservation);
    }
    backward(trellis, order, weights, scores);

    let num_states = trellis.num_states();
    let length = trellis.length();

    let mut nodes = Vec::with_capacity(length * num_states);
    for position in 0..length {
        for id in trellis.layer(position) {
            nodes.push(scores.score(id) * scores.rev_score(id) / sink);
        }
    }

    let mut edges = Vec::with_capacity((length - 1) * num_states * num_states);
    for position in 0..length - 1 {
        for from in trellis.layer(position) {
            for to in trellis.layer(position + 1) {
                let weight = weights.weight(trellis, from, to);
                edges.push(scores.score(from) * scores.rev_score(to) * weight / sink);
            }
        }
    }

    Ok(Posteriors {
        sink,
        states: trellis.states().to_vec(),
        length,
        nodes,
        edges,
    })
}

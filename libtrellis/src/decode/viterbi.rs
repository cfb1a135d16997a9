use serde::{Deserialize, Serialize};

use crate::decode::EdgeWeights;
use crate::structs::{ScoreTable, TopologicalOrder, Trellis};

/// The most probable hidden-state path and its probability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViterbiResult {
    pub probability: f64,
    pub path: Vec<char>,
}

impl ViterbiResult {
    pub fn path_string(&self) -> String {
        self.path.iter().collect()
    }
}

/// Max-product dynamic program over the trellis.
///
/// When several predecessors reach a node with the same score, the first one
/// in predecessor order wins. Predecessors are ordered by ascending state
/// label, so ties resolve toward the smallest label.
pub fn viterbi(
    trellis: &Trellis,
    order: &TopologicalOrder,
    weights: &EdgeWeights,
    scores: &mut ScoreTable,
) -> ViterbiResult {
    scores.reset_scores();
    scores.set_score(trellis.start(), 1.0);

    for &node in order.iter() {
        // sources keep their initial score and an empty path
        let Some((&first, rest)) = trellis.predecessors(node).split_first() else {
            continue;
        };

        let mut best_predecessor = first;
        let mut best_score = scores.score(first) * weights.weight(trellis, first, node);

        for &candidate in rest {
            let score = scores.score(candidate) * weights.weight(trellis, candidate, node);
            if score > best_score {
                best_predecessor = candidate;
                best_score = score;
            }
        }

        scores.set_score(node, best_score);
        scores.set_best_predecessor(node, best_predecessor);
    }

    let end = trellis.end();
    ViterbiResult {
        probability: scores.score(end),
        path: scores.path_to(trellis, end),
    }
}

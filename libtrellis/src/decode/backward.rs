use crate::decode::EdgeWeights;
use crate::structs::{ScoreTable, TopologicalOrder, Trellis};

/// The mirror image of [`forward`](crate::decode::forward): visits nodes in
/// reverse topological order and sets each node's `rev_score` to the total
/// probability of all partial paths from it to the end node.
///
/// Nodes without successors other than the end node keep a `rev_score` of 0.
/// Returns the `rev_score` of the start node, which equals the forward
/// probability of the sequence.
pub fn backward(
    trellis: &Trellis,
    order: &TopologicalOrder,
    weights: &EdgeWeights,
    scores: &mut ScoreTable,
) -> f64 {
    scores.reset_rev_scores();
    scores.set_rev_score(trellis.end(), 1.0);

    for &node in order.iter().rev() {
        let successors = trellis.successors(node);
        if successors.is_empty() {
            continue;
        }

        let rev_score: f64 = successors
            .iter()
            .map(|&w| scores.rev_score(w) * weights.weight(trellis, node, w))
            .sum();

        scores.set_rev_score(node, rev_score);
    }

    scores.rev_score(trellis.start())
}

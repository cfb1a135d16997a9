use crate::decode::EdgeWeights;
use crate::structs::{ScoreTable, TopologicalOrder, Trellis};

/// Sum-product dynamic program over the trellis. Each node's `score` becomes
/// the total probability of all partial paths that reach it; the returned
/// value is the score of the end node, i.e. the probability of the sequence.
pub fn forward(
    trellis: &Trellis,
    order: &TopologicalOrder,
    weights: &EdgeWeights,
    scores: &mut ScoreTable,
) -> f64 {
    scores.reset_scores();
    scores.set_score(trellis.start(), 1.0);

    for &node in order.iter() {
        let predecessors = trellis.predecessors(node);
        if predecessors.is_empty() {
            continue;
        }

        let score: f64 = predecessors
            .iter()
            .map(|&p| scores.score(p) * weights.weight(trellis, p, node))
            .sum();

        scores.set_score(node, score);
    }

    scores.score(trellis.end())
}

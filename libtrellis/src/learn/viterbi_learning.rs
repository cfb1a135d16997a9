use log::trace;

use crate::decode::{viterbi, EdgeWeights};
use crate::error::Result;
use crate::learn::{CountTables, Learner};
use crate::structs::{ProbabilityTables, ScoreTable, TopologicalOrder, Trellis};

/// Hard EM: each iteration decodes the single best hidden path under the
/// current tables and re-estimates the tables from that path alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct ViterbiLearner;

impl Learner for ViterbiLearner {
    fn name(&self) -> &'static str {
        "viterbi learning"
    }

    fn step(
        &self,
        trellis: &Trellis,
        order: &TopologicalOrder,
        weights: &EdgeWeights,
        scores: &mut ScoreTable,
    ) -> Result<ProbabilityTables> {
        let best = viterbi(trellis, order, weights, scores);
        trace!(
            "decoded {} with probability {:e}",
            best.path_string(),
            best.probability
        );

        let mut counts = CountTables::like(weights.tables());
        counts.add_path(trellis.sequence(), &best.path)?;
        counts.normalize()
    }
}

use log::trace;

use crate::decode::{posterior, EdgeWeights};
use crate::error::Result;
use crate::learn::{CountTables, Learner};
use crate::structs::{ProbabilityTables, ScoreTable, TopologicalOrder, Trellis};

/// Soft EM: each iteration computes state and transition posteriors under
/// the current tables and re-estimates the tables from those expected counts.
#[derive(Clone, Copy, Debug, Default)]
pub struct BaumWelchLearner;

impl Learner for BaumWelchLearner {
    fn name(&self) -> &'static str {
        "baum-welch"
    }

    fn step(
        &self,
        trellis: &Trellis,
        order: &TopologicalOrder,
        weights: &EdgeWeights,
        scores: &mut ScoreTable,
    ) -> Result<ProbabilityTables> {
        let posteriors = posterior(trellis, order, weights, scores)?;
        trace!("sequence probability {:e}", posteriors.sink);
        let mut counts = CountTables::like(weights.tables());
        let num_states = trellis.num_states();

        for position in 0..trellis.length() {
            let symbol_idx = weights.column(position);
            for state_idx in 0..num_states {
                counts.add_emission(
                    weights.row(state_idx),
                    symbol_idx,
                    posteriors.state_posterior_at(position, state_idx),
                );
            }
        }

        for position in 0..trellis.length() - 1 {
            for from_idx in 0..num_states {
                for to_idx in 0..num_states {
                    counts.add_transition(
                        weights.row(from_idx),
                        weights.row(to_idx),
                        posteriors.edge_posterior_at(position, from_idx, to_idx),
                    );
                }
            }
        }

        counts.normalize()
    }
}

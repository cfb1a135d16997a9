pub mod baum_welch;
pub mod counts;
pub mod estimate;
pub mod viterbi_learning;

pub use baum_welch::BaumWelchLearner;
pub use counts::CountTables;
pub use estimate::estimate_parameters;
pub use viterbi_learning::ViterbiLearner;

use log::debug;

use crate::decode::{build_trellis, EdgeWeights};
use crate::error::Result;
use crate::structs::{ProbabilityTables, ScoreTable, TopologicalOrder, Trellis};

/// One expectation step followed by one maximization step.
pub trait Learner {
    fn name(&self) -> &'static str;

    /// Re-estimate the tables behind `weights` from a pass over the trellis.
    fn step(
        &self,
        trellis: &Trellis,
        order: &TopologicalOrder,
        weights: &EdgeWeights,
        scores: &mut ScoreTable,
    ) -> Result<ProbabilityTables>;
}

/// Run exactly `iterations` steps of `learner`, starting from `tables`.
///
/// There is no convergence check. With zero iterations the input tables are
/// returned unchanged.
pub fn learn<L: Learner>(
    learner: &L,
    sequence: &[char],
    tables: &ProbabilityTables,
    iterations: usize,
) -> Result<ProbabilityTables> {
    let (trellis, order) = build_trellis(sequence, tables)?;
    let mut scores = ScoreTable::new(&trellis);

    // every state and symbol resolves against the tables before the first step
    EdgeWeights::new(&trellis, tables)?;

    let mut current = tables.clone();
    for iteration in 1..=iterations {
        let weights = EdgeWeights::new(&trellis, &current)?;
        let next = learner.step(&trellis, &order, &weights, &mut scores)?;
        debug!("{} iteration {iteration}/{iterations}", learner.name());
        current = next;
    }

    Ok(current)
}

/// Hard-EM re-estimation of `tables` from `sequence`.
pub fn viterbi_learning(
    sequence: &[char],
    tables: &ProbabilityTables,
    iterations: usize,
) -> Result<ProbabilityTables> {
    learn(&ViterbiLearner, sequence, tables, iterations)
}

/// Soft-EM re-estimation of `tables` from `sequence`.
pub fn baum_welch(
    sequence: &[char],
    tables: &ProbabilityTables,
    iterations: usize,
) -> Result<ProbabilityTables> {
    learn(&BaumWelchLearner, sequence, tables, iterations)
}

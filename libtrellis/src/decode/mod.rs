pub mod backward;
pub mod forward;
pub mod path;
pub mod posterior;
pub mod viterbi;
pub mod weights;

pub use backward::backward;
pub use forward::forward;
pub use path::{hidden_path_probability, outcome_probability};
pub use posterior::{posterior, Posteriors};
pub use viterbi::{viterbi, ViterbiResult};
pub use weights::EdgeWeights;

use crate::error::Result;
use crate::structs::{ProbabilityTables, ScoreTable, TopologicalOrder, Trellis};

/// Build the trellis of `sequence` over the states of `tables`, along with
/// its topological order.
pub fn build_trellis(
    sequence: &[char],
    tables: &ProbabilityTables,
) -> Result<(Trellis, TopologicalOrder)> {
    let states: Vec<char> = tables.states().iter().copied().collect();
    let trellis = Trellis::new(sequence, &states)?;
    let order = trellis.topological_order()?;
    Ok((trellis, order))
}

/// The most probable hidden path of `sequence`.
pub fn decode(sequence: &[char], tables: &ProbabilityTables) -> Result<ViterbiResult> {
    let (trellis, order) = build_trellis(sequence, tables)?;
    let weights = EdgeWeights::new(&trellis, tables)?;
    let mut scores = ScoreTable::new(&trellis);
    Ok(viterbi(&trellis, &order, &weights, &mut scores))
}

/// The probability of `sequence`, summed over every hidden path.
pub fn likelihood(sequence: &[char], tables: &ProbabilityTables) -> Result<f64> {
    let (trellis, order) = build_trellis(sequence, tables)?;
    let weights = EdgeWeights::new(&trellis, tables)?;
    let mut scores = ScoreTable::new(&trellis);
    Ok(forward(&trellis, &order, &weights, &mut scores))
}

/// The posterior state and transition probabilities of every position of
/// `sequence`.
pub fn soft_decode(sequence: &[char], tables: &ProbabilityTables) -> Result<Posteriors> {
    let (trellis, order) = build_trellis(sequence, tables)?;
    let weights = EdgeWeights::new(&trellis, tables)?;
    let mut scores = ScoreTable::new(&trellis);
    posterior(&trellis, &order, &weights, &mut scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrellisError;
    use assert2::{check, let_assert};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn xyz_tables(
        transition: [[f64; 2]; 2],
        emission: [[f64; 3]; 2],
    ) -> anyhow::Result<ProbabilityTables> {
        Ok(ProbabilityTables::new(
            &['A', 'B'],
            &['x', 'y', 'z'],
            transition.iter().map(|r| r.to_vec()).collect(),
            emission.iter().map(|r| r.to_vec()).collect(),
        )?)
    }

    #[test]
    fn test_decode() -> anyhow::Result<()> {
        let tables = xyz_tables(
            [[0.641, 0.359], [0.729, 0.271]],
            [[0.117, 0.691, 0.192], [0.097, 0.42, 0.483]],
        )?;

        let result = decode(&chars("xyxzzxyxyy"), &tables)?;
        check!(result.path_string() == "AAABBAAAAA");
        check!((result.probability - 2.45165495217539e-8).abs() < 1e-20);
        Ok(())
    }

    #[test]
    fn test_likelihood() -> anyhow::Result<()> {
        let tables = xyz_tables(
            [[0.303, 0.697], [0.831, 0.169]],
            [[0.533, 0.065, 0.402], [0.342, 0.334, 0.324]],
        )?;

        let probability = likelihood(&chars("xzyyzzyzyy"), &tables)?;
        check!((probability - 1.1005510319694847e-6).abs() < 1e-18);
        Ok(())
    }

    #[test]
    fn test_soft_decode() -> anyhow::Result<()> {
        let tables = xyz_tables(
            [[0.911, 0.089], [0.228, 0.772]],
            [[0.356, 0.191, 0.453], [0.04, 0.467, 0.493]],
        )?;

        let expected_a = [
            0.5438, 0.6492, 0.9647, 0.9936, 0.9957, 0.9891, 0.9154, 0.964, 0.8737, 0.8167,
        ];

        let posteriors = soft_decode(&chars("zyxxxxyxzz"), &tables)?;
        check!(posteriors.len() == expected_a.len());
        check!(posteriors.states() == &['A', 'B']);

        for (position, &expected) in expected_a.iter().enumerate() {
            let_assert!(Some(a) = posteriors.state_posterior(position, 'A'));
            let_assert!(Some(b) = posteriors.state_posterior(position, 'B'));
            check!((a - expected).abs() < 1e-4);
            check!((b - (1.0 - expected)).abs() < 1e-4);
        }

        check!(posteriors.state_posterior(10, 'A') == None);
        check!(posteriors.state_posterior(0, 'C') == None);
        check!(posteriors.edge_posterior(9, 'A', 'A') == None);
        Ok(())
    }

    #[test]
    fn test_uniform_model_matches_brute_force() -> anyhow::Result<()> {
        let tables = ProbabilityTables::uniform(&['A', 'B'], &['x', 'y'])?;
        let sequence = chars("xy");

        // four hidden paths, each 1/2 * e * t * e = 1/16
        let mut brute_force = 0.0;
        for first in ['A', 'B'] {
            for second in ['A', 'B'] {
                brute_force += 0.5
                    * tables.emission(first, 'x')?
                    * tables.transition(first, second)?
                    * tables.emission(second, 'y')?;
            }
        }

        let total = likelihood(&sequence, &tables)?;
        check!((total - brute_force).abs() < 1e-15);

        // every path ties; the smallest label wins each arg-max
        let result = decode(&sequence, &tables)?;
        check!(result.path == vec!['A', 'A']);
        check!((result.probability - 1.0 / 16.0).abs() < 1e-15);
        Ok(())
    }

    #[test]
    fn test_tie_break_ignores_table_order() -> anyhow::Result<()> {
        let tables = ProbabilityTables::uniform(&['C', 'B', 'A'], &['x'])?;
        let result = decode(&chars("xxxx"), &tables)?;
        check!(result.path_string() == "AAAA");
        Ok(())
    }

    #[test]
    fn test_random_models() -> anyhow::Result<()> {
        let mut rng = Pcg64::seed_from_u64(42);
        let states = ['A', 'B', 'C'];
        let alphabet = ['x', 'y', 'z'];
        let sequence = chars("xzzyxyzxxyzyzzx");

        for _ in 0..20 {
            let tables = ProbabilityTables::random(&states, &alphabet, &mut rng)?;
            let (trellis, order) = build_trellis(&sequence, &tables)?;
            let weights = EdgeWeights::new(&trellis, &tables)?;
            let mut scores = ScoreTable::new(&trellis);

            let best = viterbi(&trellis, &order, &weights, &mut scores);
            let sink = forward(&trellis, &order, &weights, &mut scores);
            check!(best.probability <= sink);
            check!(best.path.len() == sequence.len());

            // forward * backward is the same for every layer
            let rev_sink = backward(&trellis, &order, &weights, &mut scores);
            check!((rev_sink - sink).abs() <= 1e-12 * sink);
            for position in 0..trellis.length() {
                let layer_total: f64 = trellis
                    .layer(position)
                    .map(|id| scores.score(id) * scores.rev_score(id))
                    .sum();
                check!((layer_total - sink).abs() <= 1e-9 * sink);
            }

            let posteriors = posterior(&trellis, &order, &weights, &mut scores)?;
            for position in 0..posteriors.len() {
                let total: f64 = posteriors.row(position).iter().sum();
                check!((total - 1.0).abs() < 1e-9);
            }
            for position in 0..posteriors.len() - 1 {
                let mut total = 0.0;
                for from_idx in 0..3 {
                    for to_idx in 0..3 {
                        total += posteriors.edge_posterior_at(position, from_idx, to_idx);
                    }
                }
                check!((total - 1.0).abs() < 1e-9);
            }
        }
        Ok(())
    }

    #[test]
    fn test_posterior_lookup_by_node() -> anyhow::Result<()> {
        let tables = ProbabilityTables::uniform(&['A', 'B'], &['x', 'y'])?;
        let (trellis, order) = build_trellis(&chars("xy"), &tables)?;
        let weights = EdgeWeights::new(&trellis, &tables)?;
        let mut scores = ScoreTable::new(&trellis);
        let posteriors = posterior(&trellis, &order, &weights, &mut scores)?;

        let a0 = trellis.node_at(0, 0);
        let b1 = trellis.node_at(1, 1);
        check!(posteriors.node_posterior(&trellis, a0) == Some(0.5));
        check!(posteriors.node_posterior(&trellis, trellis.end()) == None);
        let forward_edge = posteriors.edge_posterior_between(&trellis, a0, b1);
        let backward_edge = posteriors.edge_posterior_between(&trellis, b1, a0);
        check!(forward_edge == Some(0.25));
        check!(backward_edge == None);
        check!(posteriors.edge_posterior(0, 'A', 'B') == Some(0.25));
        Ok(())
    }

    #[test]
    fn test_impossible_observation() -> anyhow::Result<()> {
        let tables = ProbabilityTables::new(
            &['A', 'B'],
            &['x', 'y'],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
            vec![vec![1.0, 0.0], vec![1.0, 0.0]],
        )?;

        check!(likelihood(&chars("xyx"), &tables) == Ok(0.0));
        let posteriors = soft_decode(&chars("xyx"), &tables);
        let_assert!(Err(TrellisError::ImpossibleObservation) = posteriors);
        Ok(())
    }

    #[test]
    fn test_single_position() -> anyhow::Result<()> {
        let tables = xyz_tables(
            [[0.5, 0.5], [0.5, 0.5]],
            [[0.2, 0.35, 0.45], [0.6, 0.3, 0.1]],
        )?;

        let result = decode(&['x'], &tables)?;
        check!(result.path == vec!['B']);
        check!((result.probability - 0.3).abs() < 1e-15);

        let posteriors = soft_decode(&['x'], &tables)?;
        check!((posteriors.sink - 0.4).abs() < 1e-15);
        check!((posteriors.row(0)[0] - 0.25).abs() < 1e-12);
        Ok(())
    }
}

use crate::error::{Result, TrellisError};
use crate::structs::ProbabilityTables;

/// The probability of a hidden path on its own:
///
///   1/|states| * Π transition[π_i][π_i+1]
pub fn hidden_path_probability(path: &[char], tables: &ProbabilityTables) -> Result<f64> {
    let Some(&first) = path.first() else {
        return Err(TrellisError::EmptyInput {
            what: "hidden path",
        });
    };
    tables.state_index(first)?;

    path.windows(2)
        .try_fold(1.0 / tables.num_states() as f64, |probability, pair| {
            Ok(probability * tables.transition(pair[0], pair[1])?)
        })
}

/// The probability of emitting `sequence` given that the hidden states were
/// exactly `path`:
///
///   Π emission[π_i][x_i]
pub fn outcome_probability(
    sequence: &[char],
    path: &[char],
    tables: &ProbabilityTables,
) -> Result<f64> {
    if sequence.is_empty() {
        return Err(TrellisError::EmptyInput {
            what: "observation sequence",
        });
    }
    if path.len() != sequence.len() {
        return Err(TrellisError::PathLengthMismatch {
            path: path.len(),
            sequence: sequence.len(),
        });
    }

    sequence
        .iter()
        .zip(path)
        .try_fold(1.0, |probability, (&symbol, &state)| {
            Ok(probability * tables.emission(state, symbol)?)
        })
}

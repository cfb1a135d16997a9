use crate::error::{Result, TrellisError};
use crate::learn::CountTables;
use crate::structs::ProbabilityTables;

/// Estimate transition and emission tables from a sequence whose hidden path
/// is known, by counting and row-normalizing.
///
/// States that never transition anywhere along the path, or never emit,
/// get a uniform row.
pub fn estimate_parameters(
    sequence: &[char],
    path: &[char],
    states: &[char],
    alphabet: &[char],
) -> Result<ProbabilityTables> {
    if sequence.is_empty() {
        return Err(TrellisError::EmptyInput {
            what: "observation sequence",
        });
    }

    let mut counts = CountTables::new(states, alphabet)?;
    counts.add_path(sequence, path)?;
    counts.normalize()
}

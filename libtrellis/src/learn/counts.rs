use indexmap::IndexSet;
use log::debug;

use crate::error::{Result, TrellisError};
use crate::structs::tables::label_set;
use crate::structs::ProbabilityTables;
use crate::util::VecMath;

/// Accumulated (possibly fractional) transition and emission counts, laid
/// out like the [`ProbabilityTables`] they will be normalized into.
#[derive(Clone, Debug)]
pub struct CountTables {
    states: IndexSet<char>,
    alphabet: IndexSet<char>,
    transition: Vec<Vec<f64>>,
    emission: Vec<Vec<f64>>,
}

impl CountTables {
    pub fn new(states: &[char], alphabet: &[char]) -> Result<Self> {
        if states.is_empty() {
            return Err(TrellisError::EmptyInput { what: "state set" });
        }
        let states = label_set(states, "state set")?;
        let alphabet = label_set(alphabet, "emission alphabet")?;
        Ok(Self::zeroed(states, alphabet))
    }

    /// Empty counts with the same state and symbol order as `tables`.
    pub fn like(tables: &ProbabilityTables) -> Self {
        Self::zeroed(tables.states().clone(), tables.alphabet().clone())
    }

    fn zeroed(states: IndexSet<char>, alphabet: IndexSet<char>) -> Self {
        Self {
            transition: vec![vec![0.0; states.len()]; states.len()],
            emission: vec![vec![0.0; alphabet.len()]; states.len()],
            states,
            alphabet,
        }
    }

    #[inline(always)]
    pub fn add_transition(&mut self, from_idx: usize, to_idx: usize, weight: f64) {
        self.transition[from_idx][to_idx] += weight;
    }

    #[inline(always)]
    pub fn add_emission(&mut self, state_idx: usize, symbol_idx: usize, weight: f64) {
        self.emission[state_idx][symbol_idx] += weight;
    }

    pub fn transition_count(&self, from_idx: usize, to_idx: usize) -> f64 {
        self.transition[from_idx][to_idx]
    }

    pub fn emission_count(&self, state_idx: usize, symbol_idx: usize) -> f64 {
        self.emission[state_idx][symbol_idx]
    }

    /// Count every transition and emission along a known hidden path, each
    /// with weight 1.
    pub fn add_path(&mut self, sequence: &[char], path: &[char]) -> Result<()> {
        if path.len() != sequence.len() {
            return Err(TrellisError::PathLengthMismatch {
                path: path.len(),
                sequence: sequence.len(),
            });
        }

        let state_indices = path
            .iter()
            .map(|&state| {
                self.states
                    .get_index_of(&state)
                    .ok_or_else(|| TrellisError::unknown_state(state))
            })
            .collect::<Result<Vec<usize>>>()?;

        let symbol_indices = sequence
            .iter()
            .map(|&symbol| {
                self.alphabet
                    .get_index_of(&symbol)
                    .ok_or_else(|| TrellisError::unknown_symbol(symbol))
            })
            .collect::<Result<Vec<usize>>>()?;

        for pair in state_indices.windows(2) {
            self.add_transition(pair[0], pair[1], 1.0);
        }

        for (&state_idx, &symbol_idx) in state_indices.iter().zip(&symbol_indices) {
            self.add_emission(state_idx, symbol_idx, 1.0);
        }

        Ok(())
    }

    /// Row-normalize the counts into probability tables.
    ///
    /// A row whose counts sum to zero becomes the uniform distribution:
    /// `1/|states|` for transition rows and `1/|alphabet|` for emission rows.
    pub fn normalize(mut self) -> Result<ProbabilityTables> {
        let mut uniform_rows = 0;
        for row in self.transition.iter_mut().chain(self.emission.iter_mut()) {
            if row.normalize_or_uniform() {
                uniform_rows += 1;
            }
        }

        if uniform_rows > 0 {
            debug!("{uniform_rows} count rows were empty and reset to uniform");
        }

        let states: Vec<char> = self.states.into_iter().collect();
        let alphabet: Vec<char> = self.alphabet.into_iter().collect();
        ProbabilityTables::new(&states, &alphabet, self.transition, self.emission)
    }
}

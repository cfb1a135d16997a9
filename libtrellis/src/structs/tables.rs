use std::collections::BTreeMap;

use indexmap::IndexSet;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrellisError};
use crate::util::VecMath;

/// The transition and emission probabilities of a discrete hidden Markov model.
///
/// Rows are indexed by hidden state, in the order the states were supplied.
/// Transition columns follow the same state order; emission columns follow
/// the order of the emission alphabet. Rows are expected to sum to one, but
/// that is the caller's responsibility and is never enforced here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTables")]
pub struct ProbabilityTables {
    states: IndexSet<char>,
    alphabet: IndexSet<char>,
    transition: Vec<Vec<f64>>,
    emission: Vec<Vec<f64>>,
}

/// The serialized form of [`ProbabilityTables`], checked by
/// [`ProbabilityTables::new`] before it is accepted.
#[derive(Deserialize)]
struct RawTables {
    states: Vec<char>,
    alphabet: Vec<char>,
    transition: Vec<Vec<f64>>,
    emission: Vec<Vec<f64>>,
}

impl TryFrom<RawTables> for ProbabilityTables {
    type Error = TrellisError;

    fn try_from(raw: RawTables) -> Result<Self> {
        Self::new(&raw.states, &raw.alphabet, raw.transition, raw.emission)
    }
}

impl ProbabilityTables {
    /// Create tables from dense rows.
    ///
    /// `transition` must be `|states| x |states|` and `emission` must be
    /// `|states| x |alphabet|`. The alphabet may be empty when only the
    /// transitions are of interest; every emission lookup then fails.
    pub fn new(
        states: &[char],
        alphabet: &[char],
        transition: Vec<Vec<f64>>,
        emission: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if states.is_empty() {
            return Err(TrellisError::EmptyInput { what: "state set" });
        }
        let states = label_set(states, "state set")?;
        let alphabet = label_set(alphabet, "emission alphabet")?;

        check_shape(&transition, states.len(), states.len(), "transition")?;
        check_shape(&emission, states.len(), alphabet.len(), "emission")?;

        Ok(Self {
            states,
            alphabet,
            transition,
            emission,
        })
    }

    /// Create tables from label-keyed maps, as produced by a text parser.
    ///
    /// Every (state, state) transition pair and every (state, symbol)
    /// emission pair must be present, and the maps may not mention any
    /// other label.
    pub fn from_maps(
        states: &[char],
        alphabet: &[char],
        transition: &LabelMap,
        emission: &LabelMap,
    ) -> Result<Self> {
        check_map_labels(transition, states, states, "transition")?;
        check_map_labels(emission, states, alphabet, "emission")?;

        let transition_rows = states
            .iter()
            .map(|&from| {
                states
                    .iter()
                    .map(|&to| map_entry(transition, from, to, "transition"))
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let emission_rows = states
            .iter()
            .map(|&state| {
                alphabet
                    .iter()
                    .map(|&symbol| map_entry(emission, state, symbol, "emission"))
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(states, alphabet, transition_rows, emission_rows)
    }

    /// Tables where every row is the uniform distribution.
    pub fn uniform(states: &[char], alphabet: &[char]) -> Result<Self> {
        let num_states = states.len().max(1) as f64;
        let num_symbols = alphabet.len().max(1) as f64;

        Self::new(
            states,
            alphabet,
            vec![vec![1.0 / num_states; states.len()]; states.len()],
            vec![vec![1.0 / num_symbols; alphabet.len()]; states.len()],
        )
    }

    /// Tables where every row is drawn at random and normalized.
    pub fn random<R: Rng>(states: &[char], alphabet: &[char], rng: &mut R) -> Result<Self> {
        let transition = (0..states.len())
            .map(|_| random_row(states.len(), rng))
            .collect();
        let emission = (0..states.len())
            .map(|_| random_row(alphabet.len(), rng))
            .collect();

        Self::new(states, alphabet, transition, emission)
    }

    pub fn states(&self) -> &IndexSet<char> {
        &self.states
    }

    pub fn alphabet(&self) -> &IndexSet<char> {
        &self.alphabet
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_symbols(&self) -> usize {
        self.alphabet.len()
    }

    pub fn state_index(&self, state: char) -> Result<usize> {
        self.states
            .get_index_of(&state)
            .ok_or_else(|| TrellisError::unknown_state(state))
    }

    pub fn symbol_index(&self, symbol: char) -> Result<usize> {
        self.alphabet
            .get_index_of(&symbol)
            .ok_or_else(|| TrellisError::unknown_symbol(symbol))
    }

    /// The probability of moving from state `from` to state `to`.
    pub fn transition(&self, from: char, to: char) -> Result<f64> {
        Ok(self.transition[self.state_index(from)?][self.state_index(to)?])
    }

    /// The probability of state `state` emitting `symbol`.
    pub fn emission(&self, state: char, symbol: char) -> Result<f64> {
        Ok(self.emission[self.state_index(state)?][self.symbol_index(symbol)?])
    }

    #[inline(always)]
    pub fn transition_at(&self, from_idx: usize, to_idx: usize) -> f64 {
        self.transition[from_idx][to_idx]
    }

    #[inline(always)]
    pub fn emission_at(&self, state_idx: usize, symbol_idx: usize) -> f64 {
        self.emission[state_idx][symbol_idx]
    }

    pub fn transition_row(&self, state_idx: usize) -> &[f64] {
        &self.transition[state_idx]
    }

    pub fn emission_row(&self, state_idx: usize) -> &[f64] {
        &self.emission[state_idx]
    }
}

/// A probability matrix keyed by row label, then column label.
pub type LabelMap = BTreeMap<char, BTreeMap<char, f64>>;

fn map_entry(map: &LabelMap, row: char, col: char, table: &str) -> Result<f64> {
    map.get(&row)
        .and_then(|r| r.get(&col))
        .copied()
        .ok_or_else(|| TrellisError::MalformedModel {
            reason: format!("missing {table} entry {row} -> {col}"),
        })
}

fn check_map_labels(map: &LabelMap, rows: &[char], cols: &[char], table: &str) -> Result<()> {
    for (row, entries) in map {
        if !rows.contains(row) {
            return Err(TrellisError::MalformedModel {
                reason: format!("unexpected {table} row label '{row}'"),
            });
        }

        if let Some(col) = entries.keys().find(|col| !cols.contains(col)) {
            return Err(TrellisError::MalformedModel {
                reason: format!("unexpected {table} column label '{col}'"),
            });
        }
    }
    Ok(())
}

pub(crate) fn label_set(labels: &[char], what: &str) -> Result<IndexSet<char>> {
    let mut set = IndexSet::with_capacity(labels.len());
    for &label in labels {
        if !set.insert(label) {
            return Err(TrellisError::MalformedModel {
                reason: format!("duplicate label '{label}' in the {what}"),
            });
        }
    }
    Ok(set)
}

fn check_shape(rows: &[Vec<f64>], num_rows: usize, num_cols: usize, table: &str) -> Result<()> {
    if rows.len() != num_rows {
        return Err(TrellisError::MalformedModel {
            reason: format!("{table} table has {} rows, expected {num_rows}", rows.len()),
        });
    }

    match rows.iter().position(|row| row.len() != num_cols) {
        Some(row_idx) => Err(TrellisError::MalformedModel {
            reason: format!(
                "{table} row {row_idx} has {} entries, expected {num_cols}",
                rows[row_idx].len()
            ),
        }),
        None => Ok(()),
    }
}

fn random_row<R: Rng>(len: usize, rng: &mut R) -> Vec<f64> {
    let mut row: Vec<f64> = (0..len).map(|_| rng.gen::<f64>()).collect();
    row.normalize_or_uniform();
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn two_state_tables() -> anyhow::Result<ProbabilityTables> {
        Ok(ProbabilityTables::new(
            &['A', 'B'],
            &['x', 'y', 'z'],
            vec![vec![0.641, 0.359], vec![0.729, 0.271]],
            vec![vec![0.117, 0.691, 0.192], vec![0.097, 0.42, 0.483]],
        )?)
    }

    #[test]
    fn test_label_lookup() -> anyhow::Result<()> {
        let tables = two_state_tables()?;

        let b_to_a = tables.transition('B', 'A')?;
        let a_emits_z = tables.emission('A', 'z')?;
        check!(b_to_a == 0.729);
        check!(a_emits_z == 0.192);
        check!(tables.state_index('B') == Ok(1));
        check!(tables.symbol_index('y') == Ok(1));
        check!(tables.transition_row(0) == &[0.641, 0.359]);

        let transition = tables.transition('A', 'C');
        let_assert!(Err(TrellisError::MalformedModel { .. }) = transition);
        let emission = tables.emission('A', 'w');
        let_assert!(Err(TrellisError::MalformedModel { .. }) = emission);
        Ok(())
    }

    #[test]
    fn test_shape_errors() {
        let ragged = ProbabilityTables::new(
            &['A', 'B'],
            &['x'],
            vec![vec![1.0, 0.0], vec![1.0]],
            vec![vec![1.0], vec![1.0]],
        );
        let_assert!(Err(TrellisError::MalformedModel { reason }) = ragged);
        check!(reason.contains("transition row 1"));

        let duplicate = ProbabilityTables::new(
            &['A', 'A'],
            &['x'],
            vec![vec![1.0, 0.0], vec![1.0, 0.0]],
            vec![vec![1.0], vec![1.0]],
        );
        let_assert!(Err(TrellisError::MalformedModel { .. }) = duplicate);

        let empty = ProbabilityTables::new(&[], &['x'], vec![], vec![]);
        let_assert!(Err(TrellisError::EmptyInput { .. }) = empty);
    }

    #[test]
    fn test_transitions_only() -> anyhow::Result<()> {
        let tables = ProbabilityTables::new(
            &['A', 'B'],
            &[],
            vec![vec![0.9, 0.1], vec![0.2, 0.8]],
            vec![vec![], vec![]],
        )?;

        check!(tables.num_symbols() == 0);
        check!(tables.transition('B', 'A') == Ok(0.2));
        let emission = tables.emission('A', 'x');
        let_assert!(Err(TrellisError::MalformedModel { .. }) = emission);
        Ok(())
    }

    #[test]
    fn test_from_maps() -> anyhow::Result<()> {
        let mut transition = BTreeMap::new();
        transition.insert('A', BTreeMap::from([('A', 0.9), ('B', 0.1)]));
        transition.insert('B', BTreeMap::from([('A', 0.2), ('B', 0.8)]));

        let mut emission = BTreeMap::new();
        emission.insert('A', BTreeMap::from([('x', 1.0)]));
        emission.insert('B', BTreeMap::from([('x', 1.0)]));

        let tables = ProbabilityTables::from_maps(&['A', 'B'], &['x'], &transition, &emission)?;
        check!(tables.transition('A', 'B') == Ok(0.1));

        transition.get_mut(&'B').unwrap().remove(&'A');
        let missing = ProbabilityTables::from_maps(&['A', 'B'], &['x'], &transition, &emission);
        let_assert!(Err(TrellisError::MalformedModel { reason }) = missing);
        check!(reason == "missing transition entry B -> A");
        Ok(())
    }

    #[test]
    fn test_from_maps_rejects_extra_labels() -> anyhow::Result<()> {
        let transition = LabelMap::from([
            ('A', BTreeMap::from([('A', 0.9), ('B', 0.1)])),
            ('B', BTreeMap::from([('A', 0.2), ('B', 0.8)])),
        ]);
        let mut emission = LabelMap::from([
            ('A', BTreeMap::from([('x', 1.0)])),
            ('B', BTreeMap::from([('x', 1.0)])),
        ]);

        // a typo in a row label
        let mut typo = transition.clone();
        typo.insert('C', BTreeMap::from([('A', 0.5), ('B', 0.5)]));
        let extra_row = ProbabilityTables::from_maps(&['A', 'B'], &['x'], &typo, &emission);
        let_assert!(Err(TrellisError::MalformedModel { reason }) = extra_row);
        check!(reason == "unexpected transition row label 'C'");

        // a symbol missing from the alphabet
        emission.insert('B', BTreeMap::from([('x', 0.5), ('w', 0.5)]));
        let extra_col = ProbabilityTables::from_maps(&['A', 'B'], &['x'], &transition, &emission);
        let_assert!(Err(TrellisError::MalformedModel { reason }) = extra_col);
        check!(reason == "unexpected emission column label 'w'");
        Ok(())
    }

    #[test]
    fn test_random_rows_sum_to_one() -> anyhow::Result<()> {
        let mut rng = Pcg64::seed_from_u64(7);
        let tables = ProbabilityTables::random(&['A', 'B', 'C'], &['x', 'y'], &mut rng)?;

        for state_idx in 0..tables.num_states() {
            let t: f64 = tables.transition_row(state_idx).iter().sum();
            let e: f64 = tables.emission_row(state_idx).iter().sum();
            check!((t - 1.0).abs() < 1e-12);
            check!((e - 1.0).abs() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_serde_keeps_label_order() -> anyhow::Result<()> {
        let tables = two_state_tables()?;
        let json = serde_json::to_string(&tables)?;
        let back: ProbabilityTables = serde_json::from_str(&json)?;

        check!(back == tables);
        let states: Vec<char> = back.states().iter().copied().collect();
        check!(states == vec!['A', 'B']);
        Ok(())
    }

    #[test]
    fn test_deserialize_checks_shape() {
        let ragged = r#"{
            "states": ["A", "B"],
            "alphabet": ["x", "y"],
            "transition": [[0.5, 0.5], [0.5]],
            "emission": [[0.5, 0.5], [0.5, 0.5]]
        }"#;
        let parsed = serde_json::from_str::<ProbabilityTables>(ragged);
        let_assert!(Err(err) = parsed);
        let message = err.to_string();
        check!(message.contains("transition row 1 has 1 entries"));

        let duplicate = r#"{
            "states": ["A", "A"],
            "alphabet": ["x"],
            "transition": [[0.5, 0.5], [0.5, 0.5]],
            "emission": [[1.0], [1.0]]
        }"#;
        let parsed = serde_json::from_str::<ProbabilityTables>(duplicate);
        let_assert!(Err(err) = parsed);
        let message = err.to_string();
        check!(message.contains("duplicate label 'A'"));
    }
}

use crate::error::Result;
use crate::structs::{NodeId, NodeKind, ProbabilityTables, Trellis};

/// Edge weights of a trellis under one set of probability tables.
///
/// Building this resolves every trellis state and every observed symbol
/// against the tables up front, so a missing entry is reported before any
/// algorithm runs and weight lookups afterwards cannot fail.
#[derive(Debug)]
pub struct EdgeWeights<'a> {
    tables: &'a ProbabilityTables,
    /// trellis state index -> table row
    rows: Vec<usize>,
    /// sequence position -> table emission column
    columns: Vec<usize>,
    initial: f64,
}

impl<'a> EdgeWeights<'a> {
    pub fn new(trellis: &Trellis, tables: &'a ProbabilityTables) -> Result<Self> {
        let rows = trellis
            .states()
            .iter()
            .map(|&state| tables.state_index(state))
            .collect::<Result<Vec<usize>>>()?;

        let columns = trellis
            .sequence()
            .iter()
            .map(|&symbol| tables.symbol_index(symbol))
            .collect::<Result<Vec<usize>>>()?;

        Ok(Self {
            tables,
            rows,
            columns,
            initial: 1.0 / trellis.num_states() as f64,
        })
    }

    pub fn tables(&self) -> &ProbabilityTables {
        self.tables
    }

    /// The table row of the trellis state at `state_idx`.
    #[inline(always)]
    pub fn row(&self, state_idx: usize) -> usize {
        self.rows[state_idx]
    }

    /// The table emission column of the symbol observed at `position`.
    #[inline(always)]
    pub fn column(&self, position: usize) -> usize {
        self.columns[position]
    }

    /// The weight of the edge `from -> to`:
    ///
    ///   start -> (s, 0)      : 1/|states| * emission[s][x_0]
    ///   (s, t) -> (s', t+1)  : transition[s][s'] * emission[s'][x_t+1]
    ///   (s, L-1) -> end      : 1
    ///
    /// Node pairs that are not trellis edges weigh 0.
    #[inline(always)]
    pub fn weight(&self, trellis: &Trellis, from: NodeId, to: NodeId) -> f64 {
        match (trellis.node(from).kind, trellis.node(to).kind) {
            (
                NodeKind::Start,
                NodeKind::Emitting {
                    state_idx,
                    position: 0,
                },
            ) => self.initial * self.emission(state_idx, 0),
            (
                NodeKind::Emitting {
                    state_idx: from_idx,
                    position: from_position,
                },
                NodeKind::Emitting {
                    state_idx: to_idx,
                    position: to_position,
                },
            ) if to_position == from_position + 1 => {
                self.transition(from_idx, to_idx) * self.emission(to_idx, to_position)
            }
            (NodeKind::Emitting { position, .. }, NodeKind::End)
                if position + 1 == trellis.length() =>
            {
                1.0
            }
            _ => 0.0,
        }
    }

    #[inline(always)]
    fn transition(&self, from_idx: usize, to_idx: usize) -> f64 {
        let (from_row, to_row) = (self.rows[from_idx], self.rows[to_idx]);
        self.tables.transition_at(from_row, to_row)
    }

    #[inline(always)]
    fn emission(&self, state_idx: usize, position: usize) -> f64 {
        let row = self.rows[state_idx];
        self.tables.emission_at(row, self.columns[position])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrellisError;
    use assert2::{check, let_assert};

    #[test]
    fn test_edge_weights() -> anyhow::Result<()> {
        // table rows deliberately out of label order
        let tables = ProbabilityTables::new(
            &['B', 'A'],
            &['x', 'y'],
            vec![vec![0.6, 0.4], vec![0.3, 0.7]],
            vec![vec![0.2, 0.8], vec![0.9, 0.1]],
        )?;
        let trellis = Trellis::new(&['x', 'y'], &['A', 'B'])?;
        let weights = EdgeWeights::new(&trellis, &tables)?;

        let a0 = trellis.node_at(0, 0);
        let b1 = trellis.node_at(1, 1);

        // 1/2 * e[A][x]
        check!(weights.weight(&trellis, trellis.start(), a0) == 0.5 * 0.9);
        // t[A][B] * e[B][y]
        check!(weights.weight(&trellis, a0, b1) == 0.3 * 0.8);
        check!(weights.weight(&trellis, b1, trellis.end()) == 1.0);
        check!(weights.weight(&trellis, a0, trellis.end()) == 0.0);
        Ok(())
    }

    #[test]
    fn test_unknown_symbol() -> anyhow::Result<()> {
        let tables = ProbabilityTables::uniform(&['A', 'B'], &['x', 'y'])?;
        let trellis = Trellis::new(&['x', 'q'], &['A', 'B'])?;

        let weights = EdgeWeights::new(&trellis, &tables);
        let_assert!(Err(TrellisError::MalformedModel { reason }) = weights);
        check!(reason.contains("'q'"));

        let trellis = Trellis::new(&['x'], &['A', 'C'])?;
        let weights = EdgeWeights::new(&trellis, &tables);
        let_assert!(Err(TrellisError::MalformedModel { .. }) = weights);
        Ok(())
    }
}

use crate::structs::{NodeId, Trellis};

/// The scratch values one algorithm pass keeps for a single node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreRecord {
    /// Viterbi or forward score.
    pub score: f64,
    /// Backward score.
    pub rev_score: f64,
    /// The predecessor on the best path into this node (Viterbi only).
    pub best_predecessor: Option<NodeId>,
}

/// An arena of [`ScoreRecord`]s indexed by [`NodeId`].
///
/// The arena is owned by the caller of an algorithm, not by the trellis, and
/// is reset at the start of every pass that writes to it.
#[derive(Clone, Debug)]
pub struct ScoreTable {
    records: Vec<ScoreRecord>,
}

impl ScoreTable {
    pub fn new(trellis: &Trellis) -> Self {
        Self {
            records: vec![ScoreRecord::default(); trellis.num_nodes()],
        }
    }

    pub fn reset_scores(&mut self) {
        self.records.iter_mut().for_each(|r| {
            r.score = 0.0;
            r.best_predecessor = None;
        });
    }

    pub fn reset_rev_scores(&mut self) {
        self.records.iter_mut().for_each(|r| r.rev_score = 0.0);
    }

    pub fn record(&self, id: NodeId) -> &ScoreRecord {
        &self.records[id.0]
    }

    #[inline(always)]
    pub fn score(&self, id: NodeId) -> f64 {
        self.records[id.0].score
    }

    #[inline(always)]
    pub fn set_score(&mut self, id: NodeId, value: f64) {
        self.records[id.0].score = value;
    }

    #[inline(always)]
    pub fn rev_score(&self, id: NodeId) -> f64 {
        self.records[id.0].rev_score
    }

    #[inline(always)]
    pub fn set_rev_score(&mut self, id: NodeId, value: f64) {
        self.records[id.0].rev_score = value;
    }

    pub fn best_predecessor(&self, id: NodeId) -> Option<NodeId> {
        self.records[id.0].best_predecessor
    }

    pub fn set_best_predecessor(&mut self, id: NodeId, predecessor: NodeId) {
        self.records[id.0].best_predecessor = Some(predecessor);
    }

    /// The hidden-state labels along the best path into `id`, following
    /// best-predecessor pointers back to a node that has none.
    ///
    /// Sentinels contribute no label.
    pub fn path_to(&self, trellis: &Trellis, id: NodeId) -> Vec<char> {
        let mut path = vec![];
        let mut current = Some(id);

        while let Some(node) = current {
            if let Some(state) = trellis.node(node).state {
                path.push(state);
            }
            current = self.best_predecessor(node);
        }

        path.reverse();
        path
    }
}

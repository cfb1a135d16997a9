use thiserror::Error;

/// The failures that can be reported by any trellis operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrellisError {
    /// A transition or emission entry that an edge weight needs is missing,
    /// or the tables themselves are mis-shaped.
    #[error("malformed model: {reason}")]
    MalformedModel { reason: String },

    /// A zero-length sequence or hidden path, or an empty state set.
    #[error("empty input: {what}")]
    EmptyInput { what: &'static str },

    /// The topological sort left edges unconsumed. The trellis is acyclic by
    /// construction, so this always points at a construction bug.
    #[error("trellis is not a DAG: {remaining_edges} edges were never consumed")]
    NotADag { remaining_edges: usize },

    /// The forward probability of the sequence is exactly zero, so posteriors
    /// are undefined.
    #[error("the observed sequence has zero probability under the model")]
    ImpossibleObservation,

    #[error("hidden path has length {path}, but the sequence has length {sequence}")]
    PathLengthMismatch { path: usize, sequence: usize },
}

impl TrellisError {
    pub(crate) fn unknown_state(state: char) -> Self {
        TrellisError::MalformedModel {
            reason: format!("no probabilities for state '{state}'"),
        }
    }

    pub(crate) fn unknown_symbol(symbol: char) -> Self {
        TrellisError::MalformedModel {
            reason: format!("symbol '{symbol}' is not in the emission alphabet"),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrellisError>;

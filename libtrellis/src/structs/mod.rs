pub mod order;
pub use order::TopologicalOrder;

pub mod score_table;
pub use score_table::{ScoreRecord, ScoreTable};

pub mod tables;
pub use tables::{LabelMap, ProbabilityTables};

pub mod trellis;
pub use trellis::{Node, NodeId, NodeKind, Trellis};

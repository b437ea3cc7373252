pub mod aggregate;
pub mod consistency;
pub mod models;
pub mod risk;
pub mod session;

pub use aggregate::{
    aggregate, aggregate_details, collect_stats, load_details, BatchStats, StatsSource,
};
pub use consistency::{evaluate, evaluate_batch, ConsistencyResult, Field, FieldConsistency};
pub use models::{DocumentDetail, DocumentSummary, FileKind, Indicator, NOT_FOUND};
pub use risk::{classify, title_case, Classification, Tier};
pub use session::{Completion, DetailState, ListState, Phase, ReviewSession, SessionSnapshot};

mod builder;
#[cfg(test)]
mod tests;
mod types;

pub use builder::{SummaryContext, SummaryIter};
pub use types::{LeafDetails, QueueSummary, SummaryKind};

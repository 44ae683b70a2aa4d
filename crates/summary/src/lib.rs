pub mod error;
pub mod report;
pub mod summary;

pub use error::SummaryError;
pub use report::SummaryReport;
pub use summary::{LeafDetails, QueueSummary, SummaryContext, SummaryIter, SummaryKind};

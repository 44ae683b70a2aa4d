use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::summary::QueueSummary;

/// A summary tree stamped for delivery to an API or CLI consumer.
///
/// The timestamp lives here rather than on [`QueueSummary`] so repeated
/// builds over an unchanged tree still compare equal.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub generated_at: DateTime<Utc>,
    pub queue_count: usize,
    pub leaf_count: usize,
    pub root: QueueSummary,
}

impl SummaryReport {
    pub fn new(root: QueueSummary) -> Self {
        let queue_count = root.iter().count();
        let leaf_count = root.iter().filter(|s| s.is_leaf()).count();
        Self {
            generated_at: Utc::now(),
            queue_count,
            leaf_count,
            root,
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

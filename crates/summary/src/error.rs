use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("cluster has no memory, cannot compute fractions for queue {queue}")]
    ZeroClusterCapacity { queue: String },

    #[error("queue not found: {0}")]
    QueueNotFound(String),
}

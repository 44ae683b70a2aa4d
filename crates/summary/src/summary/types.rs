use fairview_core::Resource;
use serde::Serialize;

/// Point-in-time resource-share view of one queue and, for parent queues,
/// its subtree.
///
/// Built fresh per request and owned by the caller; nothing in the live
/// scheduler holds a reference to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueSummary {
    pub queue_name: String,
    pub scheduling_policy: String,
    pub max_apps: u32,

    pub cluster_resources: Resource,
    pub used_resources: Resource,
    pub steady_fair_resources: Resource,
    pub fair_resources: Resource,
    pub min_resources: Resource,
    /// Configured max share clamped to the cluster total.
    pub max_resources: Resource,

    /// Memory-dimension fractions of `cluster_resources`.
    pub used_memory_fraction: f32,
    pub steady_fair_share_memory_fraction: f32,
    pub fair_share_memory_fraction: f32,
    pub min_share_memory_fraction: f32,
    pub max_share_memory_fraction: f32,

    pub pending_containers: u64,
    pub allocated_containers: u64,
    pub reserved_containers: u64,

    #[serde(flatten)]
    pub kind: SummaryKind,
}

/// Variant-specific part of a summary, matching the kind of the source queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SummaryKind {
    Parent {
        /// `None` when the queue is reservable and its reservations are
        /// hidden; `Some(vec![])` when the queue simply has no children.
        #[serde(skip_serializing_if = "Option::is_none")]
        child_queues: Option<Vec<QueueSummary>>,
    },
    Leaf(LeafDetails),
}

/// Fields only a leaf queue reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafDetails {
    pub num_active_apps: u32,
    pub num_pending_apps: u32,
    pub demand_resources: Resource,
    pub am_used_resources: Resource,
    /// AM ceiling clamped to the cluster total.
    pub am_max_resources: Resource,
    pub preemptable: bool,
}

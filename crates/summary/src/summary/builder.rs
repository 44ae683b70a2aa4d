use fairview_core::{
    AllocationConfiguration, ClusterContext, LeafQueue, ParentQueue, QueueBase, QueueNode,
    Resource, ZeroCapacityPolicy,
};
use tracing::{debug, info, warn};

use super::types::{LeafDetails, QueueSummary, SummaryKind};
use crate::error::SummaryError;

/// Inputs shared by every queue visited in one build.
///
/// The cluster total is copied once when the context is created, so every
/// fraction in the resulting tree uses the same denominator.
#[derive(Debug, Clone, Copy)]
pub struct SummaryContext<'a> {
    cluster_resource: Resource,
    allocation: &'a AllocationConfiguration,
    zero_capacity: ZeroCapacityPolicy,
}

impl<'a> SummaryContext<'a> {
    /// Snapshot the current cluster total from the scheduler.
    pub fn new(cluster: &ClusterContext, allocation: &'a AllocationConfiguration) -> Self {
        Self::with_cluster_resource(cluster.cluster_resource(), allocation)
    }

    pub fn with_cluster_resource(
        cluster_resource: Resource,
        allocation: &'a AllocationConfiguration,
    ) -> Self {
        Self {
            cluster_resource,
            allocation,
            zero_capacity: ZeroCapacityPolicy::default(),
        }
    }

    pub fn zero_capacity(mut self, policy: ZeroCapacityPolicy) -> Self {
        self.zero_capacity = policy;
        self
    }

    pub fn cluster_resource(&self) -> Resource {
        self.cluster_resource
    }

    pub fn allocation(&self) -> &'a AllocationConfiguration {
        self.allocation
    }

    fn memory_fraction(&self, part: Resource) -> f32 {
        part.memory_fraction_of(&self.cluster_resource).unwrap_or(0.0)
    }
}

impl QueueSummary {
    /// Summarise `queue` and, unless suppressed, its subtree.
    ///
    /// Read consistency is per field: each accessor on the live queue takes
    /// its own short read, and no lock is held across the walk. Values from
    /// different queues (or different fields of one queue) may come from
    /// different instants if the scheduler mutates state meanwhile. Only the
    /// cluster total is shared, through `ctx`.
    ///
    /// Fails only when the cluster has no memory and `ctx` is configured
    /// with [`ZeroCapacityPolicy::Reject`].
    pub fn build(queue: &QueueNode, ctx: &SummaryContext<'_>) -> Result<Self, SummaryError> {
        if ctx.cluster_resource.memory_mb == 0 {
            match ctx.zero_capacity {
                ZeroCapacityPolicy::Reject => {
                    return Err(SummaryError::ZeroClusterCapacity {
                        queue: queue.name().to_string(),
                    });
                }
                ZeroCapacityPolicy::Zero => {
                    warn!(
                        queue = queue.name(),
                        "cluster has no memory, reporting all memory fractions as 0"
                    );
                }
            }
        }

        let summary = Self::from_node(queue, ctx);

        info!(
            "Queue summary built for '{}': {} queues (cluster {})",
            summary.queue_name,
            summary.iter().count(),
            ctx.cluster_resource
        );

        Ok(summary)
    }

    /// Locate `name` below `root` in the live tree and summarise that subtree.
    pub fn build_subtree(
        root: &QueueNode,
        name: &str,
        ctx: &SummaryContext<'_>,
    ) -> Result<Self, SummaryError> {
        let queue = root
            .find(name)
            .ok_or_else(|| SummaryError::QueueNotFound(name.to_string()))?;
        Self::build(&queue, ctx)
    }

    /// Dispatch on the discovered kind of the node.
    fn from_node(queue: &QueueNode, ctx: &SummaryContext<'_>) -> Self {
        match queue {
            QueueNode::Leaf(leaf) => Self::from_leaf(leaf, ctx),
            QueueNode::Parent(parent) => Self::from_parent(parent, ctx),
        }
    }

    fn from_parent(queue: &ParentQueue, ctx: &SummaryContext<'_>) -> Self {
        let mut summary =
            Self::from_base(queue.base(), ctx, SummaryKind::Parent { child_queues: None });

        let name = queue.base().name();
        if ctx.allocation.is_reservable(name) && !ctx.allocation.show_reservation_as_queues(name) {
            debug!(queue = name, "reservable queue, hiding reservation children");
            return summary;
        }

        let children = queue
            .child_queues()
            .iter()
            .map(|child| Self::from_node(child, ctx))
            .collect();
        summary.kind = SummaryKind::Parent {
            child_queues: Some(children),
        };
        summary
    }

    fn from_leaf(queue: &LeafQueue, ctx: &SummaryContext<'_>) -> Self {
        let apps = queue.app_state();
        let details = LeafDetails {
            num_active_apps: apps.runnable_apps,
            num_pending_apps: apps.non_runnable_apps,
            demand_resources: apps.demand,
            am_used_resources: apps.am_resource_usage,
            am_max_resources: apps.max_am_resource.componentwise_min(ctx.cluster_resource),
            preemptable: apps.preemptable,
        };
        Self::from_base(queue.base(), ctx, SummaryKind::Leaf(details))
    }

    /// Fields common to both variants.
    fn from_base(base: &QueueBase, ctx: &SummaryContext<'_>, kind: SummaryKind) -> Self {
        let cluster_resources = ctx.cluster_resource;
        let used_resources = base.resource_usage();
        let steady_fair_resources = base.steady_fair_share();
        let fair_resources = base.fair_share();
        let min_resources = base.min_share();
        let max_resources = base.max_share().componentwise_min(cluster_resources);
        let metrics = base.metrics();

        debug!(
            queue = base.name(),
            used = %used_resources,
            max = %max_resources,
            "summarised queue"
        );

        QueueSummary {
            queue_name: base.name().to_string(),
            scheduling_policy: base.policy().name().to_string(),
            max_apps: ctx.allocation.queue_max_apps(base.name()),
            cluster_resources,
            used_resources,
            steady_fair_resources,
            fair_resources,
            min_resources,
            max_resources,
            used_memory_fraction: ctx.memory_fraction(used_resources),
            steady_fair_share_memory_fraction: ctx.memory_fraction(steady_fair_resources),
            fair_share_memory_fraction: ctx.memory_fraction(fair_resources),
            min_share_memory_fraction: ctx.memory_fraction(min_resources),
            max_share_memory_fraction: ctx.memory_fraction(max_resources),
            pending_containers: metrics.pending_containers(),
            allocated_containers: metrics.allocated_containers(),
            reserved_containers: metrics.reserved_containers(),
            kind,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, SummaryKind::Leaf(_))
    }

    pub fn leaf_details(&self) -> Option<&LeafDetails> {
        match &self.kind {
            SummaryKind::Leaf(details) => Some(details),
            SummaryKind::Parent { .. } => None,
        }
    }

    /// Child summaries; `None` for leaves and for suppressed reservations.
    pub fn child_queues(&self) -> Option<&[QueueSummary]> {
        match &self.kind {
            SummaryKind::Parent { child_queues } => child_queues.as_deref(),
            SummaryKind::Leaf(_) => None,
        }
    }

    /// Pre-order traversal of this summary and every included descendant.
    pub fn iter(&self) -> SummaryIter<'_> {
        SummaryIter { stack: vec![self] }
    }

    pub fn find(&self, name: &str) -> Option<&QueueSummary> {
        self.iter().find(|s| s.queue_name == name)
    }
}

/// Iterator returned by [`QueueSummary::iter`].
pub struct SummaryIter<'a> {
    stack: Vec<&'a QueueSummary>,
}

impl<'a> Iterator for SummaryIter<'a> {
    type Item = &'a QueueSummary;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        if let Some(children) = next.child_queues() {
            self.stack.extend(children.iter().rev());
        }
        Some(next)
    }
}

//! Live fair-scheduler queue hierarchy.
//!
//! Every mutable field group sits behind its own lock (or atomic) so the
//! scheduler loop can update usage and shares while readers take short,
//! independent point-in-time reads. No accessor ever holds a lock after
//! it returns, and no two locks are taken together.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::policy::SchedulingPolicy;
use crate::resource::Resource;

/// Copy a value out of a lock. Poisoning is ignored: the guarded data is
/// plain values that cannot be left half-written.
fn read_copy<T: Copy>(lock: &RwLock<T>) -> T {
    *lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_value<T>(lock: &RwLock<T>, value: T) {
    *lock.write().unwrap_or_else(PoisonError::into_inner) = value;
}

// ── Metrics ──────────────────────────────────────────────────────

/// Container counters maintained by the scheduler for one queue.
#[derive(Debug, Default)]
pub struct QueueMetrics {
    pending_containers: AtomicU64,
    allocated_containers: AtomicU64,
    reserved_containers: AtomicU64,
}

impl QueueMetrics {
    pub fn pending_containers(&self) -> u64 {
        self.pending_containers.load(Ordering::Relaxed)
    }

    pub fn allocated_containers(&self) -> u64 {
        self.allocated_containers.load(Ordering::Relaxed)
    }

    pub fn reserved_containers(&self) -> u64 {
        self.reserved_containers.load(Ordering::Relaxed)
    }

    pub fn set_pending_containers(&self, n: u64) {
        self.pending_containers.store(n, Ordering::Relaxed);
    }

    pub fn set_allocated_containers(&self, n: u64) {
        self.allocated_containers.store(n, Ordering::Relaxed);
    }

    pub fn set_reserved_containers(&self, n: u64) {
        self.reserved_containers.store(n, Ordering::Relaxed);
    }

    /// Move one pending container to allocated.
    pub fn allocate_pending(&self) {
        let taken = self
            .pending_containers
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if taken {
            self.allocated_containers.fetch_add(1, Ordering::Relaxed);
        }
    }
}

// ── Shared base ──────────────────────────────────────────────────

/// Configured and computed shares of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueShares {
    pub min_share: Resource,
    pub max_share: Resource,
    pub fair_share: Resource,
    pub steady_fair_share: Resource,
}

impl Default for QueueShares {
    fn default() -> Self {
        Self {
            min_share: Resource::none(),
            max_share: Resource::unbounded(),
            fair_share: Resource::none(),
            steady_fair_share: Resource::none(),
        }
    }
}

/// State common to leaf and parent queues.
#[derive(Debug)]
pub struct QueueBase {
    name: String,
    policy: RwLock<SchedulingPolicy>,
    usage: RwLock<Resource>,
    shares: RwLock<QueueShares>,
    metrics: QueueMetrics,
}

impl QueueBase {
    pub fn new(name: impl Into<String>, policy: SchedulingPolicy) -> Self {
        Self {
            name: name.into(),
            policy: RwLock::new(policy),
            usage: RwLock::new(Resource::none()),
            shares: RwLock::new(QueueShares::default()),
            metrics: QueueMetrics::default(),
        }
    }

    /// Fully-qualified queue name, e.g. `root.analytics.adhoc`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> SchedulingPolicy {
        read_copy(&self.policy)
    }

    pub fn resource_usage(&self) -> Resource {
        read_copy(&self.usage)
    }

    pub fn min_share(&self) -> Resource {
        read_copy(&self.shares).min_share
    }

    pub fn max_share(&self) -> Resource {
        read_copy(&self.shares).max_share
    }

    pub fn fair_share(&self) -> Resource {
        read_copy(&self.shares).fair_share
    }

    pub fn steady_fair_share(&self) -> Resource {
        read_copy(&self.shares).steady_fair_share
    }

    pub fn shares(&self) -> QueueShares {
        read_copy(&self.shares)
    }

    pub fn metrics(&self) -> &QueueMetrics {
        &self.metrics
    }

    pub fn set_policy(&self, policy: SchedulingPolicy) {
        write_value(&self.policy, policy);
    }

    pub fn set_resource_usage(&self, usage: Resource) {
        write_value(&self.usage, usage);
    }

    pub fn set_shares(&self, shares: QueueShares) {
        write_value(&self.shares, shares);
    }

    pub fn set_fair_share(&self, fair_share: Resource) {
        self.shares
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fair_share = fair_share;
    }

    pub fn set_steady_fair_share(&self, steady_fair_share: Resource) {
        self.shares
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .steady_fair_share = steady_fair_share;
    }
}

// ── Leaf ─────────────────────────────────────────────────────────

/// Per-application state tracked only by leaf queues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeafAppState {
    /// Applications allowed to run.
    pub runnable_apps: u32,
    /// Applications held back by max-running-apps limits.
    pub non_runnable_apps: u32,
    /// Outstanding demand of all applications in the queue.
    pub demand: Resource,
    /// Resources used by application masters.
    pub am_resource_usage: Resource,
    /// Ceiling for application-master usage.
    pub max_am_resource: Resource,
    pub preemptable: bool,
}

#[derive(Debug)]
pub struct LeafQueue {
    base: QueueBase,
    apps: RwLock<LeafAppState>,
}

impl LeafQueue {
    pub fn new(name: impl Into<String>, policy: SchedulingPolicy) -> Self {
        Self {
            base: QueueBase::new(name, policy),
            apps: RwLock::new(LeafAppState {
                max_am_resource: Resource::unbounded(),
                preemptable: true,
                ..LeafAppState::default()
            }),
        }
    }

    pub fn base(&self) -> &QueueBase {
        &self.base
    }

    pub fn app_state(&self) -> LeafAppState {
        read_copy(&self.apps)
    }

    pub fn set_app_state(&self, state: LeafAppState) {
        write_value(&self.apps, state);
    }
}

// ── Parent ───────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ParentQueue {
    base: QueueBase,
    children: RwLock<Vec<QueueNode>>,
}

impl ParentQueue {
    pub fn new(name: impl Into<String>, policy: SchedulingPolicy) -> Self {
        Self {
            base: QueueBase::new(name, policy),
            children: RwLock::new(Vec::new()),
        }
    }

    pub fn base(&self) -> &QueueBase {
        &self.base
    }

    pub fn add_child(&self, child: QueueNode) {
        self.children
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(child);
    }

    /// Remove a direct child by name, returning it if present.
    pub fn remove_child(&self, name: &str) -> Option<QueueNode> {
        let mut children = self.children.write().unwrap_or_else(PoisonError::into_inner);
        let idx = children.iter().position(|c| c.name() == name)?;
        Some(children.remove(idx))
    }

    /// Current children in insertion order. The returned handles stay valid
    /// even if the scheduler detaches them afterwards.
    pub fn child_queues(&self) -> Vec<QueueNode> {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ── Node ─────────────────────────────────────────────────────────

/// Handle to a queue in the live tree.
#[derive(Debug, Clone)]
pub enum QueueNode {
    Leaf(Arc<LeafQueue>),
    Parent(Arc<ParentQueue>),
}

impl QueueNode {
    pub fn leaf(name: impl Into<String>, policy: SchedulingPolicy) -> Self {
        QueueNode::Leaf(Arc::new(LeafQueue::new(name, policy)))
    }

    pub fn parent(name: impl Into<String>, policy: SchedulingPolicy) -> Self {
        QueueNode::Parent(Arc::new(ParentQueue::new(name, policy)))
    }

    pub fn base(&self) -> &QueueBase {
        match self {
            QueueNode::Leaf(q) => q.base(),
            QueueNode::Parent(q) => q.base(),
        }
    }

    pub fn name(&self) -> &str {
        self.base().name()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, QueueNode::Leaf(_))
    }

    pub fn as_parent(&self) -> Option<&Arc<ParentQueue>> {
        match self {
            QueueNode::Parent(q) => Some(q),
            QueueNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Arc<LeafQueue>> {
        match self {
            QueueNode::Leaf(q) => Some(q),
            QueueNode::Parent(_) => None,
        }
    }

    /// Current children; always empty for a leaf.
    pub fn child_queues(&self) -> Vec<QueueNode> {
        match self {
            QueueNode::Leaf(_) => Vec::new(),
            QueueNode::Parent(q) => q.child_queues(),
        }
    }

    /// Depth-first search for a queue by fully-qualified name.
    pub fn find(&self, name: &str) -> Option<QueueNode> {
        if self.name() == name {
            return Some(self.clone());
        }
        self.child_queues().iter().find_map(|c| c.find(name))
    }
}

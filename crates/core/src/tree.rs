//! Build a live queue tree from a YAML description.
//!
//! Used by the CLI and by tests to stand up a scheduler state without a
//! running scheduler. Child names are short names; the loader qualifies
//! them with their parent's name (`root` -> `root.analytics`).

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::cluster::ClusterContext;
use crate::error::CoreError;
use crate::policy::SchedulingPolicy;
use crate::queue::{LeafAppState, QueueNode, QueueShares};
use crate::resource::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueKind {
    Leaf,
    Parent,
}

/// Leaf-only application state in a tree file.
#[derive(Debug, Clone, Deserialize)]
pub struct LeafDef {
    #[serde(default)]
    pub active_apps: u32,
    #[serde(default)]
    pub pending_apps: u32,
    #[serde(default)]
    pub demand: Resource,
    #[serde(default)]
    pub am_used: Resource,
    /// Absent means no ceiling beyond the cluster total.
    #[serde(default = "Resource::unbounded")]
    pub am_max: Resource,
    #[serde(default = "default_preemptable")]
    pub preemptable: bool,
}

fn default_preemptable() -> bool {
    true
}

impl Default for LeafDef {
    fn default() -> Self {
        Self {
            active_apps: 0,
            pending_apps: 0,
            demand: Resource::none(),
            am_used: Resource::none(),
            am_max: Resource::unbounded(),
            preemptable: true,
        }
    }
}

/// One queue in a tree file.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueDef {
    pub name: String,
    /// Explicit kind; inferred from `children` when omitted.
    #[serde(default)]
    pub kind: Option<QueueKind>,
    #[serde(default)]
    pub policy: Option<String>,
    #[serde(default)]
    pub usage: Resource,
    #[serde(default)]
    pub min_share: Resource,
    /// Absent means no ceiling.
    #[serde(default)]
    pub max_share: Option<Resource>,
    #[serde(default)]
    pub fair_share: Resource,
    #[serde(default)]
    pub steady_fair_share: Resource,
    #[serde(default)]
    pub pending_containers: u64,
    #[serde(default)]
    pub allocated_containers: u64,
    #[serde(default)]
    pub reserved_containers: u64,
    #[serde(default)]
    pub leaf: Option<LeafDef>,
    #[serde(default)]
    pub children: Vec<QueueDef>,
}

/// Top-level tree file: cluster capacity plus the root queue.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeFile {
    pub cluster: Resource,
    pub root: QueueDef,
}

/// A loaded scheduler state: live root queue and cluster context.
#[derive(Debug)]
pub struct QueueTree {
    pub root: QueueNode,
    pub cluster: ClusterContext,
}

impl QueueTree {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CoreError> {
        let file: TreeFile = serde_yaml::from_str(yaml)?;
        Self::from_definition(&file)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let tree = Self::from_yaml_str(&raw)?;
        info!(path = %path.display(), root = tree.root.name(), "loaded queue tree");
        Ok(tree)
    }

    pub fn from_definition(file: &TreeFile) -> Result<Self, CoreError> {
        let mut seen = HashSet::new();
        let root = build_node(&file.root, None, &mut seen)?;
        Ok(Self {
            root,
            cluster: ClusterContext::new(file.cluster),
        })
    }
}

fn build_node(
    def: &QueueDef,
    parent_name: Option<&str>,
    seen: &mut HashSet<String>,
) -> Result<QueueNode, CoreError> {
    if def.name.is_empty() || def.name.contains('.') {
        return Err(CoreError::InvalidQueue {
            queue: def.name.clone(),
            reason: "name must be a non-empty short name without '.'".to_string(),
        });
    }
    let full_name = match parent_name {
        Some(parent) => format!("{}.{}", parent, def.name),
        None => def.name.clone(),
    };
    if !seen.insert(full_name.clone()) {
        return Err(CoreError::DuplicateQueue(full_name));
    }

    let policy = match &def.policy {
        Some(p) => p.parse::<SchedulingPolicy>()?,
        None => SchedulingPolicy::default(),
    };

    let kind = def.kind.unwrap_or(if def.children.is_empty() {
        QueueKind::Leaf
    } else {
        QueueKind::Parent
    });

    let node = match kind {
        QueueKind::Leaf => {
            if !def.children.is_empty() {
                return Err(CoreError::InvalidQueue {
                    queue: full_name,
                    reason: "leaf queue cannot have children".to_string(),
                });
            }
            let node = QueueNode::leaf(full_name.clone(), policy);
            if let QueueNode::Leaf(leaf) = &node {
                let l = def.leaf.clone().unwrap_or_default();
                leaf.set_app_state(LeafAppState {
                    runnable_apps: l.active_apps,
                    non_runnable_apps: l.pending_apps,
                    demand: l.demand,
                    am_resource_usage: l.am_used,
                    max_am_resource: l.am_max,
                    preemptable: l.preemptable,
                });
            }
            node
        }
        QueueKind::Parent => {
            if def.leaf.is_some() {
                return Err(CoreError::InvalidQueue {
                    queue: full_name,
                    reason: "parent queue cannot carry leaf application state".to_string(),
                });
            }
            let node = QueueNode::parent(full_name.clone(), policy);
            if let QueueNode::Parent(parent) = &node {
                for child in &def.children {
                    parent.add_child(build_node(child, Some(&full_name), seen)?);
                }
            }
            node
        }
    };

    let base = node.base();
    base.set_resource_usage(def.usage);
    base.set_shares(QueueShares {
        min_share: def.min_share,
        max_share: def.max_share.unwrap_or_else(Resource::unbounded),
        fair_share: def.fair_share,
        steady_fair_share: def.steady_fair_share,
    });
    let metrics = base.metrics();
    metrics.set_pending_containers(def.pending_containers);
    metrics.set_allocated_containers(def.allocated_containers);
    metrics.set_reserved_containers(def.reserved_containers);

    Ok(node)
}

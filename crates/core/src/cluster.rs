use std::sync::{PoisonError, RwLock};

use crate::resource::Resource;

/// Scheduler-wide view of total cluster capacity.
///
/// Node managers joining or leaving update the total; readers get a copy.
#[derive(Debug, Default)]
pub struct ClusterContext {
    cluster_resource: RwLock<Resource>,
}

impl ClusterContext {
    pub fn new(cluster_resource: Resource) -> Self {
        Self {
            cluster_resource: RwLock::new(cluster_resource),
        }
    }

    pub fn cluster_resource(&self) -> Resource {
        *self
            .cluster_resource
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_cluster_resource(&self, total: Resource) {
        *self
            .cluster_resource
            .write()
            .unwrap_or_else(PoisonError::into_inner) = total;
    }

    pub fn add_node(&self, capacity: Resource) {
        let mut total = self
            .cluster_resource
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *total = total.saturating_add(capacity);
    }
}

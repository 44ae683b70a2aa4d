use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CoreError;

/// Max-apps limit reported for queues without an explicit one.
pub const UNBOUNDED_MAX_APPS: u32 = i32::MAX as u32;

fn default_max_apps() -> u32 {
    UNBOUNDED_MAX_APPS
}

/// Per-queue allocation settings. Missing entries fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueAllocation {
    #[serde(default)]
    pub max_apps: Option<u32>,
    /// Queue holds capacity reservations.
    #[serde(default)]
    pub reservable: bool,
    /// Expose each reservation as a child queue in summaries.
    #[serde(default)]
    pub show_reservation_as_queues: bool,
}

/// Allocation file contents, keyed by fully-qualified queue name.
///
/// ```yaml
/// default_max_apps: 50
/// queues:
///   root.reservations:
///     reservable: true
///     show_reservation_as_queues: false
///   root.adhoc:
///     max_apps: 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationConfiguration {
    #[serde(default = "default_max_apps")]
    pub default_max_apps: u32,
    #[serde(default)]
    pub queues: HashMap<String, QueueAllocation>,
}

impl Default for AllocationConfiguration {
    fn default() -> Self {
        Self {
            default_max_apps: UNBOUNDED_MAX_APPS,
            queues: HashMap::new(),
        }
    }
}

impl AllocationConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CoreError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load an allocation file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let conf = Self::from_yaml_str(&raw)?;
        info!(
            path = %path.display(),
            queues = conf.queues.len(),
            "loaded allocation configuration"
        );
        Ok(conf)
    }

    pub fn with_default_max_apps(mut self, max_apps: u32) -> Self {
        self.default_max_apps = max_apps;
        self
    }

    pub fn with_queue(mut self, name: impl Into<String>, alloc: QueueAllocation) -> Self {
        self.queues.insert(name.into(), alloc);
        self
    }

    pub fn queue(&self, name: &str) -> Option<&QueueAllocation> {
        self.queues.get(name)
    }

    pub fn queue_max_apps(&self, name: &str) -> u32 {
        self.queue(name)
            .and_then(|q| q.max_apps)
            .unwrap_or(self.default_max_apps)
    }

    pub fn is_reservable(&self, name: &str) -> bool {
        self.queue(name).is_some_and(|q| q.reservable)
    }

    pub fn show_reservation_as_queues(&self, name: &str) -> bool {
        self.queue(name).is_some_and(|q| q.show_reservation_as_queues)
    }
}

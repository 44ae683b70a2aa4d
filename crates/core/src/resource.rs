use serde::{Deserialize, Serialize};

/// A vector of schedulable resource dimensions.
///
/// Values are plain copies; anything holding a `Resource` holds a
/// point-in-time reading, never a handle into live scheduler state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    /// Memory in megabytes.
    #[serde(default)]
    pub memory_mb: u64,
    #[serde(default)]
    pub vcores: u64,
}

impl Resource {
    pub const fn new(memory_mb: u64, vcores: u64) -> Self {
        Self { memory_mb, vcores }
    }

    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    /// Sentinel used for queues without a configured ceiling.
    pub const fn unbounded() -> Self {
        Self::new(u64::MAX, u64::MAX)
    }

    /// Minimum taken independently in every dimension.
    pub fn componentwise_min(self, other: Resource) -> Resource {
        Resource {
            memory_mb: self.memory_mb.min(other.memory_mb),
            vcores: self.vcores.min(other.vcores),
        }
    }

    /// `true` when every dimension is less than or equal to `other`'s.
    pub fn fits_in(&self, other: &Resource) -> bool {
        self.memory_mb <= other.memory_mb && self.vcores <= other.vcores
    }

    /// Memory of `self` as a fraction of `total`'s memory.
    ///
    /// Returns `None` when `total` has no memory, so callers pick the
    /// zero-capacity behaviour explicitly instead of inheriting NaN or Inf.
    pub fn memory_fraction_of(&self, total: &Resource) -> Option<f32> {
        if total.memory_mb == 0 {
            return None;
        }
        Some((self.memory_mb as f64 / total.memory_mb as f64) as f32)
    }

    pub fn saturating_add(self, other: Resource) -> Resource {
        Resource {
            memory_mb: self.memory_mb.saturating_add(other.memory_mb),
            vcores: self.vcores.saturating_add(other.vcores),
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<memory:{}, vCores:{}>", self.memory_mb, self.vcores)
    }
}

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Scheduling policy attached to a queue.
///
/// The summary only reports the policy's name; ordering semantics live in
/// the scheduler itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulingPolicy {
    #[default]
    Fair,
    Fifo,
    Drf,
}

impl SchedulingPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            SchedulingPolicy::Fair => "fair",
            SchedulingPolicy::Fifo => "fifo",
            SchedulingPolicy::Drf => "drf",
        }
    }
}

impl std::fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchedulingPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fair" => Ok(SchedulingPolicy::Fair),
            "fifo" => Ok(SchedulingPolicy::Fifo),
            "drf" => Ok(SchedulingPolicy::Drf),
            _ => Err(CoreError::UnknownPolicy(s.to_string())),
        }
    }
}

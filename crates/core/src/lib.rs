pub mod allocation;
pub mod cluster;
pub mod config;
pub mod error;
pub mod policy;
pub mod queue;
pub mod resource;
pub mod tree;

pub use allocation::{AllocationConfiguration, QueueAllocation, UNBOUNDED_MAX_APPS};
pub use cluster::ClusterContext;
pub use config::{load_dotenv, SummaryConfig, ZeroCapacityPolicy};
pub use error::*;
pub use policy::SchedulingPolicy;
pub use queue::{LeafAppState, LeafQueue, ParentQueue, QueueBase, QueueMetrics, QueueNode, QueueShares};
pub use resource::Resource;
pub use tree::{QueueTree, TreeFile};

use std::path::PathBuf;

use clap::Parser;
use fairview_core::ZeroCapacityPolicy;

/// Print a resource-share summary of a fair-scheduler queue tree.
///
/// Loads the queue tree and cluster capacity from a YAML tree file,
/// optionally applies an allocation file, and writes the summary report
/// as JSON to stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "fairview", version, about)]
pub struct CliArgs {
    /// Path to the YAML queue tree file.
    #[arg(long, env = "FAIRVIEW_TREE_FILE")]
    pub tree: PathBuf,

    /// Path to the YAML allocation file.
    #[arg(long, env = "FAIRVIEW_ALLOCATION_FILE")]
    pub allocation: Option<PathBuf>,

    /// Only summarise the subtree rooted at this fully-qualified queue name.
    #[arg(long)]
    pub queue: Option<String>,

    /// Override FAIRVIEW_ZERO_CAPACITY: zero or reject.
    #[arg(long)]
    pub zero_capacity: Option<ZeroCapacityPolicy>,

    /// Emit single-line JSON.
    #[arg(long)]
    pub compact: bool,
}

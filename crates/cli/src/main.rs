mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use fairview_core::{load_dotenv, AllocationConfiguration, QueueTree, SummaryConfig};
use fairview_summary::{QueueSummary, SummaryContext, SummaryReport};

use crate::cli::CliArgs;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let mut config = SummaryConfig::from_env();
    if let Some(policy) = args.zero_capacity {
        config.zero_capacity = policy;
    }
    config.log_summary();

    let tree = QueueTree::from_file(&args.tree)
        .with_context(|| format!("failed to load queue tree {}", args.tree.display()))?;

    let allocation = match &args.allocation {
        Some(path) => AllocationConfiguration::from_file(path)
            .with_context(|| format!("failed to load allocation file {}", path.display()))?,
        None => AllocationConfiguration::new().with_default_max_apps(config.default_max_apps),
    };

    let ctx = SummaryContext::new(&tree.cluster, &allocation).zero_capacity(config.zero_capacity);
    let summary = match &args.queue {
        Some(name) => QueueSummary::build_subtree(&tree.root, name, &ctx)?,
        None => QueueSummary::build(&tree.root, &ctx)?,
    };

    let report = SummaryReport::new(summary);
    info!(
        queues = report.queue_count,
        leaves = report.leaf_count,
        "summary ready"
    );

    let json = report
        .to_json(!args.compact)
        .context("failed to serialize summary")?;
    println!("{}", json);

    Ok(())
}

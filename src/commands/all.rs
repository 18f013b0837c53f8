//! All command handler: deployment files and corpus in one run.

use super::load_topology;
use crate::cli::AllArgs;
use crate::output::OutputLayout;
use crate::pipeline::{plan_deploy, plan_workload, write_deploy, write_workload, RunSummary};
use cluster_corpus::CorpusConfig;
use cluster_deploy::InventoryConfig;

/// Run the all command.
///
/// Both plans are built before anything is written.
pub fn run_all(args: AllArgs) -> anyhow::Result<()> {
    let topology = load_topology(&args.topology.config)?;
    topology.require_nodes()?;
    let deploy_config = args.project.deploy_config()?;

    let deploy = plan_deploy(&topology, &deploy_config, &InventoryConfig::default())?;
    let workload = plan_workload(&topology, &CorpusConfig::default())?;

    let layout = OutputLayout::new(&args.topology.output_dir);
    write_deploy(&deploy, &layout)?;
    let stats = write_workload(&workload, &layout, args.corpus.content_source())?;

    let summary = RunSummary::default()
        .with_deploy(&deploy)
        .with_workload(&workload, stats.as_ref());
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

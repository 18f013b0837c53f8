//! Deploy command handler.

use super::load_topology;
use crate::cli::DeployArgs;
use crate::output::OutputLayout;
use crate::pipeline::{plan_deploy, write_deploy, RunSummary};
use cluster_deploy::InventoryConfig;

/// Run the deploy command.
pub fn run_deploy(args: DeployArgs) -> anyhow::Result<()> {
    tracing::info!("Generating deployment files...");

    let topology = load_topology(&args.topology.config)?;
    topology.require_nodes()?;
    let deploy_config = args.project.deploy_config()?;
    tracing::info!("Project: {}", deploy_config.project_name);

    let plan = plan_deploy(&topology, &deploy_config, &InventoryConfig::default())?;

    let layout = OutputLayout::new(&args.topology.output_dir);
    write_deploy(&plan, &layout)?;

    println!(
        "{}",
        serde_json::to_string(&RunSummary::default().with_deploy(&plan))?
    );
    Ok(())
}

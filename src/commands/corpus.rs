//! Corpus command handler.

use super::load_topology;
use crate::cli::CorpusArgs;
use crate::output::OutputLayout;
use crate::pipeline::{plan_workload, write_workload, RunSummary};
use cluster_corpus::CorpusConfig;

/// Run the corpus command.
pub fn run_corpus(args: CorpusArgs) -> anyhow::Result<()> {
    tracing::info!("Generating corpus and workload...");

    let topology = load_topology(&args.topology.config)?;
    let plan = plan_workload(&topology, &CorpusConfig::default())?;

    let layout = OutputLayout::new(&args.topology.output_dir);
    let stats = write_workload(&plan, &layout, args.corpus.content_source())?;

    println!(
        "{}",
        serde_json::to_string(&RunSummary::default().with_workload(&plan, stats.as_ref()))?
    );
    Ok(())
}

//! Verify command handler.

use super::load_topology;
use crate::cli::VerifyArgs;
use crate::output::OutputLayout;
use crate::pipeline::verify_output;
use cluster_corpus::CorpusConfig;

/// Run the verify command.
pub fn run_verify(args: VerifyArgs) -> anyhow::Result<()> {
    let topology = load_topology(&args.topology.config)?;
    let deploy_config = args.project.deploy_config()?;
    let layout = OutputLayout::new(&args.topology.output_dir);

    let report = verify_output(
        &topology,
        &deploy_config,
        &CorpusConfig::default(),
        &layout,
        args.check_content,
    )?;

    tracing::info!(
        "Verified {} document(s), {} file(s), {} assignment(s){}",
        report.documents_checked,
        report.files_checked,
        report.assignments_checked,
        if report.content_checked {
            ", content lengths"
        } else {
            ""
        }
    );
    Ok(())
}

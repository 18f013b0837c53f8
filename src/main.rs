//! Command-line interface for cluster-gen
//!
//! # Usage Examples
//!
//! ```bash
//! # Compose files and inventory for every host in node_config.yaml
//! cluster-gen deploy --config node_config.yaml --output-dir ./cluster-output
//!
//! # Corpus structure and workload only, no file content
//! cluster-gen corpus --config node_config.yaml --skip-content
//!
//! # Everything, with reproducible content
//! cluster-gen all --project-name simfs --content seeded
//!
//! # Check a previous run
//! cluster-gen verify --project-name simfs --check-content
//! ```

use clap::Parser;
use cluster_gen::cli::{Cli, Commands};
use cluster_gen::commands::{run_all, run_corpus, run_deploy, run_verify};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the run summary
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy(args) => run_deploy(args),
        Commands::Corpus(args) => run_corpus(args),
        Commands::All(args) => run_all(args),
        Commands::Verify(args) => run_verify(args),
    }
}

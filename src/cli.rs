//! CLI argument definitions for cluster-gen.

use cluster_corpus::ContentSource;
use cluster_deploy::{DeployConfig, DEFAULT_MEMORY_LIMIT};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Compiles a cluster topology into deployment files and a seeded test corpus.
#[derive(Parser)]
#[command(name = "cluster-gen")]
#[command(about = "Compiles a cluster topology into deployment files and a seeded test corpus")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generate per-host compose files and the host inventory
    Deploy(DeployArgs),

    /// Generate the corpus, its file map and the per-node workload
    Corpus(CorpusArgs),

    /// Generate deployment files and the corpus in one run
    All(AllArgs),

    /// Check an existing output directory against the topology
    Verify(VerifyArgs),
}

/// Where content bytes come from.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ContentChoice {
    /// Fresh OS entropy, different on every run
    #[default]
    Entropy,
    /// Derived from the topology seed, identical on every run
    Seeded,
}

impl From<ContentChoice> for ContentSource {
    fn from(choice: ContentChoice) -> Self {
        match choice {
            ContentChoice::Entropy => ContentSource::Entropy,
            ContentChoice::Seeded => ContentSource::Seeded,
        }
    }
}

/// Topology input and output location.
#[derive(Args, Debug, Clone)]
pub struct TopologyArgs {
    /// Node configuration file
    #[arg(
        short,
        long,
        env = "CLUSTER_GEN_CONFIG",
        default_value = "node_config.yaml"
    )]
    pub config: PathBuf,

    /// Output directory for generated artifacts
    #[arg(
        short,
        long,
        env = "CLUSTER_GEN_OUTPUT",
        default_value = "./cluster-output"
    )]
    pub output_dir: PathBuf,
}

/// Project naming and container policy.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project name (default: package.name from --manifest)
    #[arg(long, env = "CLUSTER_GEN_PROJECT")]
    pub project_name: Option<String>,

    /// Cargo manifest to read the project name from
    #[arg(long, default_value = "Cargo.toml")]
    pub manifest: PathBuf,

    /// Memory limit per node container (e.g., "6G", "512Mi")
    #[arg(long, default_value = DEFAULT_MEMORY_LIMIT)]
    pub memory_limit: String,
}

impl ProjectArgs {
    /// Resolve the project name and build the deployment policy.
    pub fn deploy_config(&self) -> anyhow::Result<DeployConfig> {
        let name =
            crate::project::resolve_project_name(self.project_name.as_deref(), &self.manifest)?;
        let config = DeployConfig::new(name).with_memory_limit(self.memory_limit.clone());
        config.validate()?;
        Ok(config)
    }
}

/// Corpus content options.
#[derive(Args, Debug, Clone)]
pub struct CorpusOptions {
    /// Content source for corpus files
    #[arg(long, value_enum, default_value = "entropy")]
    pub content: ContentChoice,

    /// Write only the file map and workload, not the corpus files
    #[arg(long)]
    pub skip_content: bool,
}

impl CorpusOptions {
    /// `None` when content should not be written.
    pub fn content_source(&self) -> Option<ContentSource> {
        (!self.skip_content).then(|| self.content.into())
    }
}

/// Arguments for the deploy command.
#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    #[command(flatten)]
    pub topology: TopologyArgs,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments for the corpus command.
#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    #[command(flatten)]
    pub topology: TopologyArgs,

    #[command(flatten)]
    pub corpus: CorpusOptions,
}

/// Arguments for the all command.
#[derive(Args, Debug, Clone)]
pub struct AllArgs {
    #[command(flatten)]
    pub topology: TopologyArgs,

    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub corpus: CorpusOptions,
}

/// Arguments for the verify command.
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub topology: TopologyArgs,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Also check the length of every corpus file
    #[arg(long)]
    pub check_content: bool,
}

//! Compilation pipeline.
//!
//! Planning and writing are separate steps: `plan_*` functions derive and
//! validate every artifact in memory, `write_*` functions only touch the
//! filesystem once planning has succeeded.

use crate::output::{write_atomic, OutputLayout};
use anyhow::{bail, Context};
use cluster_corpus::{
    check_materialized, check_referential_integrity, load_file_map, load_workload,
    materialize_corpus, workload_to_yaml, ContentSource, Corpus, CorpusConfig, CorpusGenerator,
    MaterializeStats, Workload,
};
use cluster_deploy::{
    is_descriptor_filename, DeployConfig, DocumentGenerator, DockerComposeGenerator,
    GeneratedDocument, InventoryConfig, InventoryGenerator,
};
use cluster_topology::{NodeId, Topology};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Deployment documents for every host, plus the inventory.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub documents: Vec<GeneratedDocument>,
    pub hosts: usize,
    pub services: usize,
}

/// Run every deployment generator. Nothing is returned unless all succeed.
pub fn plan_deploy(
    topology: &Topology,
    deploy_config: &DeployConfig,
    inventory_config: &InventoryConfig,
) -> anyhow::Result<DeployPlan> {
    let generators: Vec<Box<dyn DocumentGenerator>> = vec![
        Box::new(DockerComposeGenerator::new(deploy_config.clone())),
        Box::new(InventoryGenerator {
            config: inventory_config.clone(),
        }),
    ];

    let mut documents = Vec::new();
    for generator in &generators {
        documents.extend(generator.generate(topology)?);
    }

    Ok(DeployPlan {
        documents,
        hosts: topology.hosts().len(),
        services: topology.len(),
    })
}

/// Corpus structure, workload and their rendered documents.
#[derive(Debug, Clone)]
pub struct WorkloadPlan {
    pub seed: u64,
    pub unit_bytes: u64,
    pub corpus: Corpus,
    pub workload: Workload,
    pub file_map_yaml: String,
    pub workload_yaml: String,
}

/// Derive the corpus and workload from the topology's seed.
pub fn plan_workload(topology: &Topology, config: &CorpusConfig) -> anyhow::Result<WorkloadPlan> {
    let mut generator = CorpusGenerator::for_topology(topology, config.clone());
    let corpus = generator.generate_corpus(topology.block_size)?;
    let workload = generator.assign_workload(topology, &corpus)?;

    check_referential_integrity(&corpus.file_map(), &workload)?;

    let file_map_yaml = corpus.to_yaml().context("Failed to render file map")?;
    let workload_yaml = workload_to_yaml(&workload).context("Failed to render workload")?;

    Ok(WorkloadPlan {
        seed: topology.seed,
        unit_bytes: config.unit_bytes,
        corpus,
        workload,
        file_map_yaml,
        workload_yaml,
    })
}

/// File names directly under `dir`, sorted. A missing directory is empty.
fn list_file_names(dir: &Path) -> anyhow::Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?
    {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Write deployment documents under `deploy/`, then remove descriptors of
/// hosts that are no longer in the plan.
pub fn write_deploy(plan: &DeployPlan, layout: &OutputLayout) -> anyhow::Result<()> {
    let dir = layout.deploy_dir();
    for document in &plan.documents {
        let path = dir.join(&document.filename);
        write_atomic(&path, &document.content)?;
        info!("Generated: {}", path.display());
    }

    let planned: BTreeSet<&str> = plan.documents.iter().map(|d| d.filename.as_str()).collect();
    for name in list_file_names(&dir)? {
        if is_descriptor_filename(&name) && !planned.contains(name.as_str()) {
            let path = dir.join(&name);
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove stale {}", path.display()))?;
            info!("Removed stale: {}", path.display());
        }
    }
    Ok(())
}

/// Write the file map and workload, then materialize content unless
/// `content` is `None`. Materializing also removes data files that are not
/// in the corpus.
pub fn write_workload(
    plan: &WorkloadPlan,
    layout: &OutputLayout,
    content: Option<ContentSource>,
) -> anyhow::Result<Option<MaterializeStats>> {
    let file_map_path = layout.file_map_path();
    write_atomic(&file_map_path, &plan.file_map_yaml)?;
    info!("Generated: {}", file_map_path.display());

    let workload_path = layout.workload_path();
    write_atomic(&workload_path, &plan.workload_yaml)?;
    info!("Generated: {}", workload_path.display());

    let Some(source) = content else {
        info!("Skipping corpus content");
        return Ok(None);
    };

    let data_dir = layout.data_dir();
    let stats = materialize_corpus(&plan.corpus, plan.seed, source, plan.unit_bytes, &data_dir)
        .with_context(|| format!("Failed to materialize corpus in {}", data_dir.display()))?;

    for name in list_file_names(&data_dir)? {
        if !plan.corpus.contains(&name) {
            let path = data_dir.join(&name);
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove stale {}", path.display()))?;
            info!("Removed stale: {}", path.display());
        }
    }
    Ok(Some(stats))
}

/// One-line machine-readable summary of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_blocks: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_nodes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_written: Option<u64>,
}

impl RunSummary {
    pub fn with_deploy(mut self, plan: &DeployPlan) -> Self {
        self.hosts = Some(plan.hosts);
        self.services = Some(plan.services);
        self
    }

    pub fn with_workload(mut self, plan: &WorkloadPlan, stats: Option<&MaterializeStats>) -> Self {
        self.files = Some(plan.corpus.files.len());
        self.total_blocks = Some(plan.corpus.total_blocks());
        self.storage_nodes = Some(plan.workload.len());
        self.bytes_written = stats.map(|s| s.bytes_written);
        self
    }
}

/// What `verify_output` checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub documents_checked: usize,
    pub files_checked: usize,
    pub assignments_checked: usize,
    pub content_checked: bool,
}

/// Check an existing output directory against the topology.
///
/// Deployment documents must match a fresh generation byte for byte with no
/// extra descriptors, the file map and workload must match the seed-derived
/// corpus and assignments, and the data directory must hold no files outside
/// the file map.
pub fn verify_output(
    topology: &Topology,
    deploy_config: &DeployConfig,
    corpus_config: &CorpusConfig,
    layout: &OutputLayout,
    check_content: bool,
) -> anyhow::Result<VerifyReport> {
    let mut report = VerifyReport::default();

    let deploy = plan_deploy(topology, deploy_config, &InventoryConfig::default())?;
    for document in &deploy.documents {
        let path = layout.deploy_dir().join(&document.filename);
        let on_disk = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if on_disk != document.content {
            bail!("{} differs from the topology", path.display());
        }
        debug!("Verified {}", path.display());
        report.documents_checked += 1;
    }

    let planned: BTreeSet<&str> = deploy
        .documents
        .iter()
        .map(|d| d.filename.as_str())
        .collect();
    for name in list_file_names(&layout.deploy_dir())? {
        if is_descriptor_filename(&name) && !planned.contains(name.as_str()) {
            bail!(
                "{} is not a descriptor of any host in the topology",
                layout.deploy_dir().join(&name).display()
            );
        }
    }

    let expected = plan_workload(topology, corpus_config)?;
    let file_map = load_file_map(&layout.file_map_path())?;
    if file_map != expected.corpus.file_map() {
        bail!(
            "{} does not match the corpus derived from seed {}",
            layout.file_map_path().display(),
            topology.seed
        );
    }
    report.files_checked = file_map.len();

    let workload = load_workload(&layout.workload_path())?;
    check_referential_integrity(&file_map, &workload)?;

    let assigned: BTreeSet<NodeId> = workload.keys().copied().collect();
    let storage: BTreeSet<NodeId> = topology.fs_nodes().map(|node| node.id).collect();
    if assigned != storage {
        bail!(
            "{} assigns nodes {:?}, expected storage nodes {:?}",
            layout.workload_path().display(),
            assigned,
            storage
        );
    }
    if workload != expected.workload {
        bail!(
            "{} does not match the workload derived from seed {}",
            layout.workload_path().display(),
            topology.seed
        );
    }
    report.assignments_checked = workload.len();

    for name in list_file_names(&layout.data_dir())? {
        if !file_map.contains_key(&name) {
            bail!(
                "{} is not in the file map",
                layout.data_dir().join(&name).display()
            );
        }
    }

    if check_content {
        check_materialized(
            &file_map,
            topology.block_size,
            corpus_config.unit_bytes,
            &layout.data_dir(),
        )?;
        report.content_checked = true;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_topology::{Capability, Node};

    fn topology() -> Topology {
        Topology::new(
            vec![
                Node::new(1, "10.0.0.1", 7000).with_capability(Capability::Fs),
                Node::new(2, "10.0.0.1", 7002),
                Node::new(3, "10.0.0.2", 7000).with_capability(Capability::Fs),
            ],
            42,
            64,
        )
        .unwrap()
    }

    #[test]
    fn test_plan_deploy_documents() {
        let plan = plan_deploy(
            &topology(),
            &DeployConfig::new("simfs"),
            &InventoryConfig::default(),
        )
        .unwrap();

        let names: Vec<&str> = plan.documents.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(
            names,
            vec!["compose_10.0.0.1.yml", "compose_10.0.0.2.yml", "gen_ansible.ini"]
        );
        assert_eq!(plan.hosts, 2);
        assert_eq!(plan.services, 3);
    }

    #[test]
    fn test_plan_workload_is_deterministic() {
        let config = CorpusConfig::default();
        let first = plan_workload(&topology(), &config).unwrap();
        let second = plan_workload(&topology(), &config).unwrap();

        assert_eq!(first.file_map_yaml, second.file_map_yaml);
        assert_eq!(first.workload_yaml, second.workload_yaml);
    }

    #[test]
    fn test_summary_serialization() {
        let deploy = plan_deploy(
            &topology(),
            &DeployConfig::new("simfs"),
            &InventoryConfig::default(),
        )
        .unwrap();
        let summary = RunSummary::default().with_deploy(&deploy);

        assert_eq!(
            serde_json::to_string(&summary).unwrap(),
            r#"{"hosts":2,"services":3}"#
        );
    }
}

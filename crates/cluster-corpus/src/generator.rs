//! Seeded corpus and workload generator.

use crate::corpus::{generate_corpus, Corpus, CorpusConfig};
use crate::error::CorpusError;
use crate::workload::{assign_workload, Workload};
use cluster_topology::Topology;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

/// Generator that derives the corpus and the workload from one seeded RNG.
///
/// The RNG is seeded once in [`CorpusGenerator::new`] and advanced by each
/// call, so the corpus must be generated before the workload to reproduce a
/// previous run.
pub struct CorpusGenerator {
    /// Seed the RNG was created from
    seed: u64,
    /// Seeded random number generator for reproducibility
    rng: StdRng,
    config: CorpusConfig,
}

impl CorpusGenerator {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64, config: CorpusConfig) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    /// Create a generator seeded from the topology.
    pub fn for_topology(topology: &Topology, config: CorpusConfig) -> Self {
        Self::new(topology.seed, config)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &CorpusConfig {
        &self.config
    }

    /// Draw the corpus structure.
    pub fn generate_corpus(&mut self, block_size: u64) -> Result<Corpus, CorpusError> {
        let corpus = generate_corpus(&mut self.rng, block_size, &self.config)?;
        info!(
            "Generated corpus: {} file(s), {} block(s) of {} KiB (seed={})",
            corpus.files.len(),
            corpus.total_blocks(),
            block_size,
            self.seed
        );
        Ok(corpus)
    }

    /// Assign access workloads to the topology's storage nodes.
    pub fn assign_workload(
        &mut self,
        topology: &Topology,
        corpus: &Corpus,
    ) -> Result<Workload, CorpusError> {
        let workload = assign_workload(&mut self.rng, topology, corpus)?;
        info!("Assigned workloads to {} storage node(s)", workload.len());
        Ok(workload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_topology::{Capability, Node};

    fn topology(seed: u64) -> Topology {
        Topology::new(
            vec![
                Node::new(1, "10.0.0.1", 7000).with_capability(Capability::Fs),
                Node::new(2, "10.0.0.1", 7002),
                Node::new(3, "10.0.0.2", 7000).with_capability(Capability::Fs),
            ],
            seed,
            64,
        )
        .unwrap()
    }

    fn run(topology: &Topology) -> (Corpus, Workload) {
        let mut generator = CorpusGenerator::for_topology(topology, CorpusConfig::default());
        let corpus = generator.generate_corpus(topology.block_size).unwrap();
        let workload = generator.assign_workload(topology, &corpus).unwrap();
        (corpus, workload)
    }

    #[test]
    fn test_deterministic_generation() {
        let topology = topology(42);
        let (corpus1, workload1) = run(&topology);
        let (corpus2, workload2) = run(&topology);

        assert_eq!(corpus1.file_map(), corpus2.file_map());
        assert_eq!(workload1, workload2);
    }

    #[test]
    fn test_seed_changes_output() {
        let (corpus1, _) = run(&topology(1));
        let (corpus2, _) = run(&topology(2));
        assert_ne!(corpus1.file_map(), corpus2.file_map());
    }

    #[test]
    fn test_seed_accessor() {
        let generator = CorpusGenerator::for_topology(&topology(9), CorpusConfig::default());
        assert_eq!(generator.seed(), 9);
        assert_eq!(generator.config().file_count, 10);
    }
}

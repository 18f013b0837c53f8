//! Corpus structure: file names and block counts.

use crate::error::CorpusError;
use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

/// Number of files in a corpus.
pub const DEFAULT_FILE_COUNT: usize = 10;

/// Base file size the size envelope is centred on (50 MiB, in KiB).
pub const DEFAULT_BASE_SIZE_KIB: u64 = 50 * 1024;

/// Bytes per block-size unit; block sizes are configured in KiB.
pub const DEFAULT_UNIT_BYTES: u64 = 1024;

/// `name → block_count`, the on-disk `file_map` document.
pub type FileMap = BTreeMap<String, u64>;

/// Corpus generation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusConfig {
    /// Number of files to generate
    pub file_count: usize,
    /// Centre of the size envelope, in KiB
    pub base_size_kib: u64,
    /// Lower envelope bound, in thousandths of the base size
    pub min_permille: u64,
    /// Upper envelope bound, in thousandths of the base size
    pub max_permille: u64,
    /// Letters in a generated name
    pub name_len: usize,
    /// Extension appended to every name
    pub extension: String,
    /// Bytes per block-size unit
    pub unit_bytes: u64,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            file_count: DEFAULT_FILE_COUNT,
            base_size_kib: DEFAULT_BASE_SIZE_KIB,
            min_permille: 800,
            max_permille: 1200,
            name_len: 5,
            extension: ".txt".to_string(),
            unit_bytes: DEFAULT_UNIT_BYTES,
        }
    }
}

impl CorpusConfig {
    /// Inclusive size envelope in KiB.
    pub fn size_bounds(&self) -> (u64, u64) {
        (
            self.base_size_kib * self.min_permille / 1000,
            self.base_size_kib * self.max_permille / 1000,
        )
    }

    /// Check the policy and that `block_size` can never yield a zero-block file.
    ///
    /// The smallest possible file is the lower envelope bound, so any block
    /// size up to that bound gives every file at least one block.
    pub fn validate(&self, block_size: u64) -> Result<(), CorpusError> {
        if self.name_len == 0 {
            return Err(CorpusError::InvalidConfig(
                "name_len must be greater than zero".to_string(),
            ));
        }
        if self.unit_bytes == 0 {
            return Err(CorpusError::InvalidConfig(
                "unit_bytes must be greater than zero".to_string(),
            ));
        }
        if self.min_permille > self.max_permille {
            return Err(CorpusError::InvalidConfig(format!(
                "min_permille ({}) exceeds max_permille ({})",
                self.min_permille, self.max_permille
            )));
        }

        let (min_kib, _) = self.size_bounds();
        if block_size == 0 || block_size > min_kib {
            return Err(CorpusError::DegenerateBlockSize {
                block_size,
                max: min_kib,
            });
        }

        Ok(())
    }
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub name: String,
    /// Drawn target size in KiB
    pub size_kib: u64,
    /// `floor(size_kib / block_size)`, always ≥ 1
    pub block_count: u64,
}

/// The generated corpus, in generation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    pub block_size: u64,
    pub files: Vec<FileSpec>,
}

impl Corpus {
    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }

    pub fn total_blocks(&self) -> u64 {
        self.files.iter().map(|f| f.block_count).sum()
    }

    /// The `file_map` view of the corpus.
    pub fn file_map(&self) -> FileMap {
        self.files
            .iter()
            .map(|f| (f.name.clone(), f.block_count))
            .collect()
    }

    /// Render the `file_map` document.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.file_map())
    }
}

/// Read a `file_map` document.
pub fn load_file_map(path: &Path) -> Result<FileMap, CorpusError> {
    let content = std::fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))?;
    serde_yaml::from_str(&content).map_err(|source| CorpusError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn draw_name<R: Rng>(rng: &mut R, config: &CorpusConfig) -> String {
    let mut name: String = (0..config.name_len)
        .map(|_| rng.random_range(b'a'..=b'z') as char)
        .collect();
    name.push_str(&config.extension);
    name
}

/// Draw the corpus structure from `rng`.
///
/// A repeated name is reported as [`CorpusError::NameCollision`] rather than
/// redrawn.
pub fn generate_corpus<R: Rng>(
    rng: &mut R,
    block_size: u64,
    config: &CorpusConfig,
) -> Result<Corpus, CorpusError> {
    config.validate(block_size)?;

    let (min_kib, max_kib) = config.size_bounds();
    let mut seen = HashSet::with_capacity(config.file_count);
    let mut files = Vec::with_capacity(config.file_count);

    for _ in 0..config.file_count {
        let name = draw_name(rng, config);
        if !seen.insert(name.clone()) {
            return Err(CorpusError::NameCollision(name));
        }

        let size_kib = rng.random_range(min_kib..=max_kib);
        let block_count = size_kib / block_size;
        debug!("{name}: {size_kib} KiB, {block_count} block(s)");

        files.push(FileSpec {
            name,
            size_kib,
            block_count,
        });
    }

    Ok(Corpus { block_size, files })
}

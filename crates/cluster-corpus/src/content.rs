//! Corpus content materialization.
//!
//! Only the corpus structure is derived from the seed by default; file bytes
//! come from the OS entropy source. [`ContentSource::Seeded`] makes the bytes
//! reproducible as well, which corpus-diffing tests rely on.

use crate::corpus::{Corpus, FileMap};
use crate::error::CorpusError;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Bytes written per chunk.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Where file bytes come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentSource {
    /// Fresh OS entropy per file; differs on every run
    #[default]
    Entropy,
    /// Per-file RNG derived from the corpus seed and file index
    Seeded,
}

/// Totals from a materialization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeStats {
    pub files_written: usize,
    pub bytes_written: u64,
}

/// Content length of a file with `block_count` blocks.
pub fn content_len(block_count: u64, block_size: u64, unit_bytes: u64) -> u64 {
    block_count * block_size * unit_bytes
}

/// Seed for file `index`, spread so neighbouring files get unrelated streams.
fn content_seed(seed: u64, index: usize) -> u64 {
    seed.wrapping_add((index as u64 + 1).wrapping_mul(0x9E3779B97F4A7C15))
}

fn content_rng(source: ContentSource, seed: u64, index: usize) -> StdRng {
    match source {
        ContentSource::Entropy => StdRng::from_os_rng(),
        ContentSource::Seeded => StdRng::seed_from_u64(content_seed(seed, index)),
    }
}

fn write_random_file(
    dir: &Path,
    name: &str,
    len: u64,
    rng: &mut StdRng,
) -> Result<(), CorpusError> {
    let path = dir.join(name);
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| CorpusError::io(dir, e))?;

    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut remaining = len;
    while remaining > 0 {
        let n = remaining.min(CHUNK_SIZE as u64) as usize;
        rng.fill_bytes(&mut chunk[..n]);
        tmp.write_all(&chunk[..n])
            .map_err(|e| CorpusError::io(&path, e))?;
        remaining -= n as u64;
    }
    tmp.flush().map_err(|e| CorpusError::io(&path, e))?;

    tmp.persist(&path)
        .map_err(|e| CorpusError::io(&path, e.error))?;
    Ok(())
}

/// Write every corpus file into `dir`.
///
/// Each file is written to a temporary file first and renamed into place, so
/// a file either has its full length or does not exist.
pub fn materialize_corpus(
    corpus: &Corpus,
    seed: u64,
    source: ContentSource,
    unit_bytes: u64,
    dir: &Path,
) -> Result<MaterializeStats, CorpusError> {
    std::fs::create_dir_all(dir).map_err(|e| CorpusError::io(dir, e))?;

    let mut stats = MaterializeStats::default();
    for (index, file) in corpus.files.iter().enumerate() {
        let len = content_len(file.block_count, corpus.block_size, unit_bytes);
        let mut rng = content_rng(source, seed, index);
        write_random_file(dir, &file.name, len, &mut rng)?;
        debug!("Wrote {} ({} bytes)", file.name, len);

        stats.files_written += 1;
        stats.bytes_written += len;
    }

    info!(
        "Materialized {} file(s), {} bytes, content source {:?}",
        stats.files_written, stats.bytes_written, source
    );
    Ok(stats)
}

/// Check that every file in `file_map` exists in `dir` with its expected length.
pub fn check_materialized(
    file_map: &FileMap,
    block_size: u64,
    unit_bytes: u64,
    dir: &Path,
) -> Result<(), CorpusError> {
    for (name, &block_count) in file_map {
        let path = dir.join(name);
        let actual = std::fs::metadata(&path)
            .map_err(|e| CorpusError::io(&path, e))?
            .len();
        let expected = content_len(block_count, block_size, unit_bytes);
        if actual != expected {
            return Err(CorpusError::SizeMismatch {
                name: name.clone(),
                expected,
                actual,
            });
        }
    }
    Ok(())
}

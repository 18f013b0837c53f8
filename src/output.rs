//! Output directory layout and atomic document writes.

use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEPLOY_DIR: &str = "deploy";
pub const FILES_DIR: &str = "files";
pub const DATA_DIR: &str = "datas";
pub const FILE_MAP_FILENAME: &str = "file_map.yaml";
pub const WORKLOAD_FILENAME: &str = "user.yaml";

/// Paths of every artifact under one output root.
///
/// ```text
/// <root>/
/// ├── deploy/
/// │   ├── compose_<host>.yml
/// │   └── gen_ansible.ini
/// └── files/
///     ├── file_map.yaml
///     ├── user.yaml
///     └── datas/<name>
/// ```
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn deploy_dir(&self) -> PathBuf {
        self.root.join(DEPLOY_DIR)
    }

    pub fn files_dir(&self) -> PathBuf {
        self.root.join(FILES_DIR)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.files_dir().join(DATA_DIR)
    }

    pub fn file_map_path(&self) -> PathBuf {
        self.files_dir().join(FILE_MAP_FILENAME)
    }

    pub fn workload_path(&self) -> PathBuf {
        self.files_dir().join(WORKLOAD_FILENAME)
    }
}

/// Write `content` to `path` through a temporary file in the same directory,
/// then rename it into place.
pub fn write_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

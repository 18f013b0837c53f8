//! Configuration types for deployment generation.

use crate::error::DeployError;

/// Memory ceiling applied to every node container.
pub const DEFAULT_MEMORY_LIMIT: &str = "6G";

/// Tag of the node image built from the project.
pub const DEFAULT_IMAGE_TAG: &str = "v1";

/// Directory on each host under which `<project>_deploy` lives.
pub const DEFAULT_DEPLOY_ROOT: &str = "/root";

/// Settings shared by every generated compose service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    /// Project name scoping image, mount paths and container paths
    pub project_name: String,
    /// Image tag
    pub image_tag: String,
    /// Memory ceiling per container (e.g., "6G", "512Mi")
    pub memory_limit: String,
    /// Host directory containing `<project>_deploy`
    pub deploy_root: String,
}

impl DeployConfig {
    /// Create a config with the default policy for the given project.
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            image_tag: DEFAULT_IMAGE_TAG.to_string(),
            memory_limit: DEFAULT_MEMORY_LIMIT.to_string(),
            deploy_root: DEFAULT_DEPLOY_ROOT.to_string(),
        }
    }

    /// Override the memory ceiling.
    pub fn with_memory_limit(mut self, memory_limit: impl Into<String>) -> Self {
        self.memory_limit = memory_limit.into();
        self
    }

    /// Reject project names that cannot be used inside image references and paths.
    pub fn validate(&self) -> Result<(), DeployError> {
        let name = &self.project_name;
        let valid = !name.is_empty()
            && name.chars().all(|c| {
                c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' || c == '.'
            });
        if !valid {
            return Err(DeployError::InvalidProjectName(name.clone()));
        }
        Ok(())
    }

    /// Image reference, `<project>:<tag>`.
    pub fn image(&self) -> String {
        format!("{}:{}", self.project_name, self.image_tag)
    }

    /// Bind mount from the host files directory to the container files directory.
    pub fn files_volume(&self) -> String {
        format!(
            "{}/{}_deploy/files:/etc/{}/files",
            self.deploy_root.trim_end_matches('/'),
            self.project_name,
            self.project_name
        )
    }

    /// Memory limit in Docker Compose notation.
    pub fn compose_memory_limit(&self) -> String {
        normalize_memory_unit(&self.memory_limit)
    }
}

/// Settings for the remote-execution inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// Inventory group header
    pub group: String,
    /// Prefix of each host's label
    pub label_prefix: String,
    /// Administrative login on every host
    pub user: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            group: "web".to_string(),
            label_prefix: "webserver".to_string(),
            user: "root".to_string(),
        }
    }
}

/// Normalize memory unit from Kubernetes format (Mi, Gi) to Docker format (m, g).
/// Docker Compose expects suffixes without 'i' (e.g., "512m" not "512Mi").
pub fn normalize_memory_unit(memory: &str) -> String {
    memory
        .replace("Gi", "g")
        .replace("Mi", "m")
        .replace("Ki", "k")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let config = DeployConfig::new("simfs");
        assert_eq!(config.image(), "simfs:v1");
        assert_eq!(config.compose_memory_limit(), "6G");
        assert_eq!(
            config.files_volume(),
            "/root/simfs_deploy/files:/etc/simfs/files"
        );
    }

    #[test]
    fn test_normalize_memory_unit() {
        assert_eq!(normalize_memory_unit("6Gi"), "6g");
        assert_eq!(normalize_memory_unit("512Mi"), "512m");
        assert_eq!(normalize_memory_unit("6G"), "6G");
    }

    #[test]
    fn test_project_name_validation() {
        assert!(DeployConfig::new("wasm_serverless").validate().is_ok());
        assert!(DeployConfig::new("").validate().is_err());
        assert!(DeployConfig::new("Bad Name").validate().is_err());
        assert!(DeployConfig::new("a/b").validate().is_err());
    }

    #[test]
    fn test_deploy_root_trailing_slash() {
        let config = DeployConfig {
            deploy_root: "/srv/".to_string(),
            ..DeployConfig::new("simfs")
        };
        assert_eq!(
            config.files_volume(),
            "/srv/simfs_deploy/files:/etc/simfs/files"
        );
    }
}

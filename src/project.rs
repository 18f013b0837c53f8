//! Project name resolution.
//!
//! The project name scopes the node image, the host mount directory and the
//! container files directory. It comes from `--project-name` or from
//! `package.name` in a Cargo manifest.

use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CargoManifest {
    package: Option<PackageSection>,
}

#[derive(Debug, Deserialize)]
struct PackageSection {
    name: String,
}

/// Read `package.name` from manifest content.
pub fn project_name_from_manifest(content: &str) -> anyhow::Result<String> {
    let manifest: CargoManifest = toml::from_str(content).context("Failed to parse manifest")?;
    manifest
        .package
        .map(|package| package.name)
        .ok_or_else(|| anyhow!("manifest has no [package] section"))
}

/// Resolve the project name, preferring an explicit override.
pub fn resolve_project_name(explicit: Option<&str>, manifest: &Path) -> anyhow::Result<String> {
    if let Some(name) = explicit {
        return Ok(name.to_string());
    }

    let content = std::fs::read_to_string(manifest)
        .with_context(|| format!("Failed to read project manifest: {}", manifest.display()))?;
    let name = project_name_from_manifest(&content)
        .with_context(|| format!("Failed to resolve project name from {}", manifest.display()))?;

    tracing::debug!("Resolved project name '{}' from {}", name, manifest.display());
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_manifest() {
        let manifest = r#"
[package]
name = "wasm_serverless"
version = "0.1.0"
edition = "2021"

[dependencies]
serde = "1"
"#;
        assert_eq!(
            project_name_from_manifest(manifest).unwrap(),
            "wasm_serverless"
        );
    }

    #[test]
    fn test_manifest_without_package() {
        let manifest = "[workspace]\nmembers = [\"a\"]\n";
        assert!(project_name_from_manifest(manifest).is_err());
    }

    #[test]
    fn test_explicit_name_wins() {
        let name = resolve_project_name(Some("simfs"), Path::new("/nonexistent/Cargo.toml")).unwrap();
        assert_eq!(name, "simfs");
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        let err = resolve_project_name(None, Path::new("/nonexistent/Cargo.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/Cargo.toml"));
    }
}

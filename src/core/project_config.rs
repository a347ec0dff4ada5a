// Project Configuration
// Runtime overrides loaded from project-sync.yaml

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime configuration file
/// Every field is optional; anything left out keeps its compiled default
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    #[serde(default)]
    pub paths: PathOverrides,

    #[serde(default)]
    pub archive: ArchiveOverrides,

    #[serde(default)]
    pub secrets: SecretOverrides,

    /// Command that mounts the remote store
    pub mount_command: Option<String>,

    /// Command that launches the project from the workspace
    pub entrypoint: Option<String>,

    /// Replaces the default extract excludes when present
    pub extract_excludes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PathOverrides {
    pub workspace_dir: Option<PathBuf>,
    pub temp_archive_path: Option<PathBuf>,
    pub remote_base: Option<PathBuf>,
    pub executable_subdir: Option<String>,
    pub archive_subdir: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ArchiveOverrides {
    pub extension: Option<String>,
    pub flatten_single_root: Option<bool>,
    pub backup_supplied_archive: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecretOverrides {
    pub secret_name: Option<String>,
    pub secrets_file: Option<PathBuf>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read project config: {}", path.display()))?;

        let config: ProjectConfig = serde_yaml::from_str(&content)
            .context("Failed to parse project config YAML")?;

        Ok(config)
    }

    /// Load project configuration from a directory, if the file is there
    pub fn load_from_dir(dir: &Path, config_name: &str) -> Result<Option<Self>> {
        let config_path = dir.join(config_name);
        if !config_path.exists() {
            return Ok(None);
        }
        Self::load(&config_path).map(Some)
    }
}

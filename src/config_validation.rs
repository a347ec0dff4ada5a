// Configuration validation module

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::PROJECT_CONFIG_NAME;
use crate::core::{AppConfig, ProjectConfig};
use crate::utilities::is_inside;

/// Load the runtime overrides and validate the merged configuration
/// An explicit `config_path` must exist; the default file is optional
pub fn load_and_validate_config(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let overrides = match config_path {
        Some(path) => Some(ProjectConfig::load(&path)?),
        None => ProjectConfig::load_from_dir(Path::new("."), PROJECT_CONFIG_NAME)?,
    };

    let config = match overrides {
        Some(project) => {
            debug!("applying runtime config overrides");
            AppConfig::default().with_overrides(&project)
        }
        None => AppConfig::default(),
    };

    validate(&config)?;
    Ok(config)
}

/// Reject configurations that would make a sync destroy the wrong thing
pub fn validate(config: &AppConfig) -> Result<()> {
    let paths = &config.paths;

    for (name, path) in [
        ("workspace_dir", &paths.workspace_dir),
        ("temp_archive_path", &paths.temp_archive_path),
        ("remote_base", &paths.remote_base),
    ] {
        if path.as_os_str().is_empty() {
            bail!("{} must not be empty", name);
        }
    }

    for (name, sub) in [
        ("executable_subdir", &paths.executable_subdir),
        ("archive_subdir", &paths.archive_subdir),
    ] {
        if sub.is_empty() || Path::new(sub).is_absolute() || sub.contains("..") {
            bail!("{} must be a plain relative name, got '{}'", name, sub);
        }
    }
    if paths.executable_subdir == paths.archive_subdir {
        bail!("executable_subdir and archive_subdir must differ");
    }

    let workspace = &paths.workspace_dir;
    let remote = &paths.remote_base;
    if is_inside(workspace, remote) || is_inside(remote, workspace) {
        bail!(
            "workspace_dir ({}) and remote_base ({}) must not contain each other",
            workspace.display(),
            remote.display()
        );
    }

    let extension = &config.archive.extension;
    if !extension.starts_with('.') || extension.len() < 2 {
        bail!("archive extension must start with a dot, got '{}'", extension);
    }

    if config.secrets.secret_name.trim().is_empty() {
        warn!("no secret name configured; secret lookup disabled");
    }

    Ok(())
}

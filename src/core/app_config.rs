// Application Configuration
// Defaults compiled from config.yaml at build time
// Modify config.yaml and rebuild to change these values

// Include the auto-generated config from build.rs
pub mod compiled {
    include!(concat!(env!("OUT_DIR"), "/compiled_config.rs"));
}

use std::path::PathBuf;

use super::ProjectConfig;

/// Application-level configuration for project-sync
/// Values are compiled in from config.yaml and may be overridden by project-sync.yaml
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Filesystem locations
    pub paths: PathSettings,

    /// Archive handling
    pub archive: ArchiveSettings,

    /// Secret lookup
    pub secrets: SecretSettings,

    /// Shell command that mounts the remote store, if any
    pub mount_command: Option<String>,

    /// Shell command that launches the project inside the workspace
    pub entrypoint: Option<String>,

    /// Archive entries skipped during extraction
    pub extract_excludes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PathSettings {
    /// Local ephemeral workspace
    pub workspace_dir: PathBuf,

    /// Where a supplied archive is staged before extraction
    pub temp_archive_path: PathBuf,

    /// Persistent remote store root
    pub remote_base: PathBuf,

    /// Extracted executable copy, relative to remote_base
    pub executable_subdir: String,

    /// Compressed snapshots, relative to remote_base
    pub archive_subdir: String,
}

#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    /// The one recognized archive extension, with leading dot
    pub extension: String,

    /// Hoist a lone top-level directory after extraction
    pub flatten_single_root: bool,

    /// Copy supplied archives into the remote archive store
    pub backup_supplied_archive: bool,
}

#[derive(Debug, Clone)]
pub struct SecretSettings {
    /// Exact, case-sensitive secret name
    pub secret_name: String,

    /// Optional YAML secrets file consulted before the environment
    pub secrets_file: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from(compiled::WORKSPACE_DIR),
            temp_archive_path: PathBuf::from(compiled::TEMP_ARCHIVE_PATH),
            remote_base: PathBuf::from(compiled::REMOTE_BASE),
            executable_subdir: compiled::EXECUTABLE_SUBDIR.to_string(),
            archive_subdir: compiled::ARCHIVE_SUBDIR.to_string(),
        }
    }
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            extension: compiled::ARCHIVE_EXTENSION.to_string(),
            flatten_single_root: compiled::FLATTEN_SINGLE_ROOT,
            backup_supplied_archive: compiled::BACKUP_SUPPLIED_ARCHIVE,
        }
    }
}

impl Default for SecretSettings {
    fn default() -> Self {
        Self {
            secret_name: compiled::SECRET_NAME.to_string(),
            secrets_file: PathBuf::from(compiled::SECRETS_FILE),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathSettings::default(),
            archive: ArchiveSettings::default(),
            secrets: SecretSettings::default(),
            mount_command: None,
            entrypoint: None,
            extract_excludes: compiled::EXTRACT_EXCLUDES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    /// Apply runtime overrides on top of the compiled defaults
    pub fn with_overrides(mut self, project: &ProjectConfig) -> Self {
        let paths = &project.paths;
        if let Some(dir) = &paths.workspace_dir {
            self.paths.workspace_dir = dir.clone();
        }
        if let Some(path) = &paths.temp_archive_path {
            self.paths.temp_archive_path = path.clone();
        }
        if let Some(base) = &paths.remote_base {
            self.paths.remote_base = base.clone();
        }
        if let Some(sub) = &paths.executable_subdir {
            self.paths.executable_subdir = sub.clone();
        }
        if let Some(sub) = &paths.archive_subdir {
            self.paths.archive_subdir = sub.clone();
        }

        let archive = &project.archive;
        if let Some(ext) = &archive.extension {
            self.archive.extension = ext.clone();
        }
        if let Some(flatten) = archive.flatten_single_root {
            self.archive.flatten_single_root = flatten;
        }
        if let Some(backup) = archive.backup_supplied_archive {
            self.archive.backup_supplied_archive = backup;
        }

        if let Some(name) = &project.secrets.secret_name {
            self.secrets.secret_name = name.clone();
        }
        if let Some(file) = &project.secrets.secrets_file {
            self.secrets.secrets_file = file.clone();
        }

        if project.mount_command.is_some() {
            self.mount_command = project.mount_command.clone();
        }
        if project.entrypoint.is_some() {
            self.entrypoint = project.entrypoint.clone();
        }
        if let Some(excludes) = &project.extract_excludes {
            self.extract_excludes = excludes.clone();
        }

        self
    }
}

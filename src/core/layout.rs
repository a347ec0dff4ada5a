// Filesystem Layout
// The fixed locations a sync reads from and writes to

use std::path::{Path, PathBuf};

use super::AppConfig;

/// Resolved paths for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Ephemeral, ready-to-run project directory
    pub workspace: PathBuf,
    /// Where a supplied archive is copied before extraction
    pub temp_archive: PathBuf,
    /// Root of the persistent remote store
    pub remote_base: PathBuf,
    /// Extracted executable copy inside the remote store
    pub remote_executable: PathBuf,
    /// Directory holding the compressed snapshot
    pub remote_archives: PathBuf,
}

impl Layout {
    pub fn new(
        workspace: impl Into<PathBuf>,
        temp_archive: impl Into<PathBuf>,
        remote_base: impl Into<PathBuf>,
        executable_subdir: &str,
        archive_subdir: &str,
    ) -> Self {
        let remote_base = remote_base.into();
        Self {
            workspace: workspace.into(),
            temp_archive: temp_archive.into(),
            remote_executable: remote_base.join(executable_subdir),
            remote_archives: remote_base.join(archive_subdir),
            remote_base,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let paths = &config.paths;
        Self::new(
            &paths.workspace_dir,
            &paths.temp_archive_path,
            &paths.remote_base,
            &paths.executable_subdir,
            &paths.archive_subdir,
        )
    }
}

/// Sibling directory where new contents are assembled before being swapped in
pub fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "root".to_string());
    target.with_file_name(format!(".{}{}", name, crate::constants::STAGING_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_subpaths() {
        let layout = Layout::new("/w", "/t/p.zip", "/drive/p", "executable", "archives");
        assert_eq!(layout.remote_executable, PathBuf::from("/drive/p/executable"));
        assert_eq!(layout.remote_archives, PathBuf::from("/drive/p/archives"));
    }

    #[test]
    fn test_staging_is_sibling() {
        let staging = staging_path(Path::new("/content/project"));
        assert_eq!(staging.parent(), Some(Path::new("/content")));
        assert_ne!(staging, PathBuf::from("/content/project"));
    }
}

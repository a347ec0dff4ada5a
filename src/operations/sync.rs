// Sync Engine
// Carries out a resolved action against the workspace and remote store

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::archive::{backup_archive, extract_archive, flatten_single_root, stage_supplied_archive};
use super::probe::find_archive;
use super::resolver::{FailReason, SyncAction};
use crate::core::error::{IoResultExt, SyncError};
use crate::core::layout::{staging_path, Layout};
use crate::report::Reporter;
use crate::utilities::PatternMatcher;

/// Options for sync operations
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Recognized archive extension, with leading dot
    pub extension: String,
    /// Hoist a lone top-level directory after extraction
    pub flatten_single_root: bool,
    /// Copy a supplied archive into the remote archive store
    pub backup_supplied_archive: bool,
    /// Archive entries skipped during extraction
    pub excludes: PatternMatcher,
    /// Dry run - don't actually modify files
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            extension: ".zip".to_string(),
            flatten_single_root: true,
            backup_supplied_archive: true,
            excludes: PatternMatcher::default(),
            dry_run: false,
        }
    }
}

/// Result of executing one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// The action that was carried out
    pub action: SyncAction,
    /// Files written into the workspace
    pub files_written: usize,
    /// Where a supplied archive was backed up, if it was
    pub archive_backup: Option<PathBuf>,
}

impl Outcome {
    fn new(action: &SyncAction) -> Self {
        Self {
            action: action.clone(),
            files_written: 0,
            archive_backup: None,
        }
    }
}

/// Engine for workspace synchronization
pub struct SyncEngine {
    options: SyncOptions,
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new(SyncOptions::default())
    }
}

impl SyncEngine {
    /// Create a new sync engine with the given options
    pub fn new(options: SyncOptions) -> Self {
        Self { options }
    }

    /// Execute a resolved action
    /// On error the workspace is left as it was before the call
    pub fn execute(
        &self,
        action: &SyncAction,
        layout: &Layout,
        reporter: &mut Reporter,
    ) -> Result<Outcome, SyncError> {
        info!(%action, dry_run = self.options.dry_run, "executing sync action");

        let result = match action {
            SyncAction::UseExistingWorkspace => {
                reporter.done(format!(
                    "Workspace already populated at {}; keeping it",
                    layout.workspace.display()
                ));
                Ok(Outcome::new(action))
            }
            SyncAction::CopyRemoteExecutableToWorkspace => self.copy_remote_executable(action, layout, reporter),
            SyncAction::ExtractRemoteArchiveThenBackupToExecutable => {
                self.extract_remote_archive(action, layout, reporter)
            }
            SyncAction::ExtractSuppliedArchiveToWorkspace(supplied) => {
                self.extract_supplied_archive(action, supplied, layout, reporter)
            }
            SyncAction::Fail(reason) => Err(self.failure(*reason, layout)),
        };

        if let Err(e) = &result {
            reporter.fail(format!("{} ({})", e, e.kind()));
        }
        result
    }

    /// Map a resolver failure to the error reported to the user
    pub fn failure(&self, reason: FailReason, layout: &Layout) -> SyncError {
        match reason {
            FailReason::NoArchiveSupplied => SyncError::NoFileSupplied,
            FailReason::UnsupportedArchiveFormat => SyncError::UnsupportedArchiveFormat(
                "supplied file".to_string(),
                self.options.extension.clone(),
            ),
            FailReason::RemoteStoreEmpty => SyncError::RemoteStoreEmpty(layout.remote_base.clone()),
        }
    }

    fn copy_remote_executable(
        &self,
        action: &SyncAction,
        layout: &Layout,
        reporter: &mut Reporter,
    ) -> Result<Outcome, SyncError> {
        let source = &layout.remote_executable;
        let workspace = &layout.workspace;

        if self.options.dry_run {
            reporter.step(format!("Would replace {} with a copy of {}", workspace.display(), source.display()));
            return Ok(Outcome::new(action));
        }

        reporter.step(format!("Copying {} -> {}", source.display(), workspace.display()));
        let staging = prepare_staging(workspace)?;
        let copied = copy_tree(source, &staging).and_then(|count| {
            replace_dir(&staging, workspace)?;
            Ok(count)
        });
        let copied = discard_on_error(copied, &staging)?;

        reporter.done(format!("Copied {} files into the workspace", copied));
        Ok(Outcome {
            files_written: copied,
            ..Outcome::new(action)
        })
    }

    fn extract_remote_archive(
        &self,
        action: &SyncAction,
        layout: &Layout,
        reporter: &mut Reporter,
    ) -> Result<Outcome, SyncError> {
        let archive = find_archive(&layout.remote_archives, &self.options.extension)
            .ok_or_else(|| SyncError::RemoteStoreEmpty(layout.remote_base.clone()))?;

        if self.options.dry_run {
            reporter.step(format!("Would extract {} into {}", archive.display(), layout.workspace.display()));
            reporter.step(format!(
                "Would back up the extracted copy to {}",
                layout.remote_executable.display()
            ));
            return Ok(Outcome::new(action));
        }

        reporter.step(format!("Extracting {} -> {}", archive.display(), layout.workspace.display()));
        let workspace_staging = prepare_staging(&layout.workspace)?;
        let written = discard_on_error(self.extract_into(&archive, &workspace_staging, reporter), &workspace_staging)?;

        reporter.step(format!(
            "Backing up extracted copy -> {}",
            layout.remote_executable.display()
        ));
        let cache_staging = match prepare_staging(&layout.remote_executable) {
            Ok(path) => path,
            Err(e) => return discard_on_error(Err(e), &workspace_staging),
        };
        let mirrored = copy_tree(&workspace_staging, &cache_staging)
            .and_then(|_| replace_dir(&cache_staging, &layout.remote_executable));
        if let Err(e) = mirrored {
            discard(&cache_staging);
            return discard_on_error(Err(e), &workspace_staging);
        }

        discard_on_error(replace_dir(&workspace_staging, &layout.workspace), &workspace_staging)?;

        reporter.done(format!(
            "Extracted {} files; remote executable copy now matches the workspace",
            written
        ));
        Ok(Outcome {
            files_written: written,
            ..Outcome::new(action)
        })
    }

    fn extract_supplied_archive(
        &self,
        action: &SyncAction,
        supplied: &Path,
        layout: &Layout,
        reporter: &mut Reporter,
    ) -> Result<Outcome, SyncError> {
        if !supplied.is_file() {
            return Err(SyncError::NoFileSupplied);
        }

        if self.options.dry_run {
            reporter.step(format!("Would extract {} into {}", supplied.display(), layout.workspace.display()));
            if self.options.backup_supplied_archive {
                reporter.step(format!("Would back up {} to {}", supplied.display(), layout.remote_archives.display()));
            }
            return Ok(Outcome::new(action));
        }

        reporter.step(format!("Staging {} -> {}", supplied.display(), layout.temp_archive.display()));
        stage_supplied_archive(supplied, &layout.temp_archive)?;

        reporter.step(format!("Extracting into {}", layout.workspace.display()));
        let staging = prepare_staging(&layout.workspace)?;
        let written = self
            .extract_into(&layout.temp_archive, &staging, reporter)
            .and_then(|count| {
                replace_dir(&staging, &layout.workspace)?;
                Ok(count)
            });
        let written = discard_on_error(written, &staging)?;
        reporter.done(format!("Extracted {} files into the workspace", written));

        let archive_backup = if self.options.backup_supplied_archive {
            self.backup_supplied(supplied, layout, reporter)
        } else {
            None
        };

        Ok(Outcome {
            files_written: written,
            archive_backup,
            ..Outcome::new(action)
        })
    }

    /// The workspace is already correct here, so backup problems only warn
    fn backup_supplied(&self, supplied: &Path, layout: &Layout, reporter: &mut Reporter) -> Option<PathBuf> {
        if !layout.remote_base.is_dir() {
            reporter.warn(format!(
                "Remote store {} is not reachable; archive not backed up",
                layout.remote_base.display()
            ));
            return None;
        }

        let file_name = supplied
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("project{}", self.options.extension));

        match backup_archive(&layout.temp_archive, &layout.remote_archives, &file_name, &self.options.extension) {
            Ok(path) => {
                reporter.done(format!("Backed up archive to {}", path.display()));
                Some(path)
            }
            Err(e) => {
                warn!(error = %e, "archive backup failed");
                reporter.warn(format!("Archive backup failed: {}", e));
                None
            }
        }
    }

    fn extract_into(&self, archive: &Path, staging: &Path, reporter: &mut Reporter) -> Result<usize, SyncError> {
        let written = extract_archive(archive, staging, &self.options.excludes)?;
        if self.options.flatten_single_root && flatten_single_root(staging)? {
            warn!(archive = %archive.display(), "hoisted single top-level directory");
            reporter.warn(format!(
                "{} had a single top-level directory; its contents were moved up into the workspace",
                archive.display()
            ));
        }
        Ok(written)
    }
}

/// Fresh, empty staging directory next to `target`
fn prepare_staging(target: &Path) -> Result<PathBuf, SyncError> {
    let staging = staging_path(target);
    if staging.exists() {
        fs::remove_dir_all(&staging).at(&staging)?;
    }
    if let Some(parent) = staging.parent() {
        fs::create_dir_all(parent).at(parent)?;
    }
    fs::create_dir(&staging).at(&staging)?;
    Ok(staging)
}

/// Swap a staged directory into place, discarding whatever was there
fn replace_dir(staged: &Path, target: &Path) -> Result<(), SyncError> {
    if target.exists() {
        fs::remove_dir_all(target).at(target)?;
    }
    fs::rename(staged, target).at(target)?;
    debug!(target = %target.display(), "replaced directory");
    Ok(())
}

/// Copy every file under `source` into `dest`
/// Returns the number of files copied
pub fn copy_tree(source: &Path, dest: &Path) -> Result<usize, SyncError> {
    let mut copied = 0;

    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            match e.into_io_error() {
                Some(io) => SyncError::io(&path, io),
                None => SyncError::io(&path, std::io::Error::other("filesystem loop")),
            }
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| SyncError::io(entry.path(), std::io::Error::other("path outside copy root")))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).at(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).at(parent)?;
            }
            fs::copy(entry.path(), &target).at(&target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

fn discard(staging: &Path) {
    if staging.exists() {
        if let Err(e) = fs::remove_dir_all(staging) {
            warn!(path = %staging.display(), error = %e, "could not remove staging directory");
        }
    }
}

fn discard_on_error<T>(result: Result<T, SyncError>, staging: &Path) -> Result<T, SyncError> {
    if result.is_err() {
        discard(staging);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::archive::tests::write_zip;

    fn layout(root: &Path) -> Layout {
        Layout::new(
            root.join("content/project"),
            root.join("content/upload/project.zip"),
            root.join("drive/project-sync"),
            "executable",
            "archives",
        )
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_copy_replaces_workspace_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        write(&layout.workspace.join("stale.py"), "old");
        write(&layout.remote_executable.join("main.py"), "new");
        write(&layout.remote_executable.join("pkg/a.py"), "a");

        let mut reporter = Reporter::silent();
        let outcome = SyncEngine::default()
            .execute(&SyncAction::CopyRemoteExecutableToWorkspace, &layout, &mut reporter)
            .unwrap();

        assert_eq!(outcome.files_written, 2);
        assert!(!layout.workspace.join("stale.py").exists());
        assert_eq!(fs::read_to_string(layout.workspace.join("main.py")).unwrap(), "new");
        assert!(!staging_path(&layout.workspace).exists());
    }

    #[test]
    fn test_extract_remote_archive_populates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        fs::create_dir_all(&layout.remote_archives).unwrap();
        write_zip(
            &layout.remote_archives.join("project.zip"),
            &[("project/main.py", "print('hi')"), ("project/lib/util.py", "")],
        );

        let mut reporter = Reporter::silent();
        let outcome = SyncEngine::default()
            .execute(
                &SyncAction::ExtractRemoteArchiveThenBackupToExecutable,
                &layout,
                &mut reporter,
            )
            .unwrap();

        assert_eq!(outcome.files_written, 2);
        for root in [&layout.workspace, &layout.remote_executable] {
            assert_eq!(fs::read_to_string(root.join("main.py")).unwrap(), "print('hi')");
            assert!(root.join("lib/util.py").is_file());
        }
        assert!(reporter
            .lines()
            .iter()
            .any(|l| l.starts_with("!!") && l.contains("single top-level directory")));
    }

    #[test]
    fn test_flat_archive_reports_no_hoist() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        fs::create_dir_all(&layout.remote_archives).unwrap();
        write_zip(
            &layout.remote_archives.join("project.zip"),
            &[("main.py", ""), ("lib/util.py", "")],
        );

        let mut reporter = Reporter::silent();
        SyncEngine::default()
            .execute(
                &SyncAction::ExtractRemoteArchiveThenBackupToExecutable,
                &layout,
                &mut reporter,
            )
            .unwrap();

        assert!(layout.workspace.join("lib/util.py").is_file());
        assert!(!reporter.lines().iter().any(|l| l.starts_with("!!")));
    }

    #[test]
    fn test_corrupt_archive_leaves_workspace_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        write(&layout.workspace.join("keep.py"), "keep");
        write(&layout.remote_archives.join("project.zip"), "garbage");

        let mut reporter = Reporter::silent();
        let err = SyncEngine::default()
            .execute(
                &SyncAction::ExtractRemoteArchiveThenBackupToExecutable,
                &layout,
                &mut reporter,
            )
            .unwrap_err();

        assert!(matches!(err, SyncError::CorruptArchive { .. }));
        assert_eq!(fs::read_to_string(layout.workspace.join("keep.py")).unwrap(), "keep");
        assert!(!layout.remote_executable.exists());
        assert!(!staging_path(&layout.workspace).exists());
        assert!(reporter.lines().last().unwrap().starts_with("xx"));
    }

    #[test]
    fn test_corrupt_supplied_archive_leaves_workspace_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        fs::create_dir_all(&layout.remote_base).unwrap();
        write(&layout.workspace.join("keep.py"), "keep");
        let supplied = dir.path().join("Downloads/project.zip");
        write(&supplied, "garbage");

        let mut reporter = Reporter::silent();
        let err = SyncEngine::default()
            .execute(
                &SyncAction::ExtractSuppliedArchiveToWorkspace(supplied.clone()),
                &layout,
                &mut reporter,
            )
            .unwrap_err();

        assert!(matches!(err, SyncError::CorruptArchive { .. }));
        assert_eq!(fs::read_to_string(layout.workspace.join("keep.py")).unwrap(), "keep");
        assert!(!staging_path(&layout.workspace).exists());
        // The upload stays staged for inspection; nothing reaches the remote store
        assert_eq!(fs::read_to_string(&supplied).unwrap(), "garbage");
        assert_eq!(fs::read_to_string(&layout.temp_archive).unwrap(), "garbage");
        assert!(!layout.remote_archives.exists());
        assert!(reporter.lines().last().unwrap().starts_with("xx"));
    }

    #[test]
    fn test_supplied_archive_is_extracted_and_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        fs::create_dir_all(&layout.remote_base).unwrap();
        write(&layout.workspace.join("old.py"), "");
        let supplied = dir.path().join("Downloads/project.zip");
        fs::create_dir_all(supplied.parent().unwrap()).unwrap();
        write_zip(&supplied, &[("main.py", "v2"), ("data/in.csv", "a,b")]);

        let mut reporter = Reporter::silent();
        let action = SyncAction::ExtractSuppliedArchiveToWorkspace(supplied.clone());
        let outcome = SyncEngine::default()
            .execute(&action, &layout, &mut reporter)
            .unwrap();

        assert_eq!(outcome.files_written, 2);
        assert!(!layout.workspace.join("old.py").exists());
        assert!(layout.temp_archive.is_file());
        assert_eq!(outcome.archive_backup, Some(layout.remote_archives.join("project.zip")));
    }

    #[test]
    fn test_supplied_archive_without_remote_only_warns() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let supplied = dir.path().join("project.zip");
        write_zip(&supplied, &[("main.py", "")]);

        let mut reporter = Reporter::silent();
        let outcome = SyncEngine::default()
            .execute(
                &SyncAction::ExtractSuppliedArchiveToWorkspace(supplied),
                &layout,
                &mut reporter,
            )
            .unwrap();

        assert!(outcome.archive_backup.is_none());
        assert!(layout.workspace.join("main.py").is_file());
        assert!(reporter.lines().iter().any(|l| l.starts_with("!!")));
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        write(&layout.remote_executable.join("main.py"), "");

        let engine = SyncEngine::new(SyncOptions {
            dry_run: true,
            ..SyncOptions::default()
        });
        let mut reporter = Reporter::silent();
        engine
            .execute(&SyncAction::CopyRemoteExecutableToWorkspace, &layout, &mut reporter)
            .unwrap();

        assert!(!layout.workspace.exists());
        assert!(reporter.lines()[0].contains("Would replace"));
    }

    #[test]
    fn test_fail_action_maps_to_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let mut reporter = Reporter::silent();

        let err = SyncEngine::default()
            .execute(&SyncAction::Fail(FailReason::RemoteStoreEmpty), &layout, &mut reporter)
            .unwrap_err();
        assert!(matches!(err, SyncError::RemoteStoreEmpty(_)));
    }
}

// Sync Resolver
// Pure decision from workspace/remote state and user intent to a single action

use std::fmt;
use std::path::{Path, PathBuf};

use crate::utilities::has_extension;

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Populate the workspace from the remote store
    SyncFromRemote,
    /// Replace the workspace with a freshly supplied archive
    SupplyNewArchive,
}

/// Availability flags the resolver decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceState {
    pub workspace_populated: bool,
    pub remote_executable_present: bool,
    pub remote_archive_present: bool,
}

/// Why no action is possible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    /// Supply intent without any file
    NoArchiveSupplied,
    /// Files were supplied but none carries the recognized extension
    UnsupportedArchiveFormat,
    /// Sync intent with neither an executable copy nor an archive remotely
    RemoteStoreEmpty,
}

/// The single action that brings the workspace to a runnable state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    UseExistingWorkspace,
    CopyRemoteExecutableToWorkspace,
    ExtractRemoteArchiveThenBackupToExecutable,
    ExtractSuppliedArchiveToWorkspace(PathBuf),
    Fail(FailReason),
}

impl SyncAction {
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoArchiveSupplied => "no archive was supplied",
            Self::UnsupportedArchiveFormat => "supplied file is not a recognized archive",
            Self::RemoteStoreEmpty => "remote store holds neither an executable copy nor an archive",
        };
        f.write_str(text)
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseExistingWorkspace => f.write_str("use existing workspace"),
            Self::CopyRemoteExecutableToWorkspace => {
                f.write_str("copy remote executable copy into workspace")
            }
            Self::ExtractRemoteArchiveThenBackupToExecutable => {
                f.write_str("extract remote archive into workspace, then back it up as executable copy")
            }
            Self::ExtractSuppliedArchiveToWorkspace(path) => {
                write!(f, "extract supplied archive {} into workspace", path.display())
            }
            Self::Fail(reason) => write!(f, "fail: {}", reason),
        }
    }
}

/// Inputs to one resolution
#[derive(Debug, Clone)]
pub struct ResolveRequest<'a> {
    pub state: SourceState,
    pub intent: Intent,
    pub force_refresh: bool,
    /// Candidate files for `SupplyNewArchive`, in the order supplied
    pub supplied: &'a [PathBuf],
    /// Recognized archive extension, with leading dot
    pub extension: &'a str,
}

/// Pick the first candidate carrying the recognized extension
pub fn select_archive<'a>(candidates: &'a [PathBuf], extension: &str) -> Option<&'a Path> {
    candidates
        .iter()
        .map(PathBuf::as_path)
        .find(|p| has_extension(p, extension))
}

/// Decide the action for a request
pub fn resolve(request: &ResolveRequest<'_>) -> SyncAction {
    let state = request.state;

    match request.intent {
        Intent::SupplyNewArchive => {
            if request.supplied.is_empty() {
                return SyncAction::Fail(FailReason::NoArchiveSupplied);
            }
            match select_archive(request.supplied, request.extension) {
                Some(archive) => SyncAction::ExtractSuppliedArchiveToWorkspace(archive.to_path_buf()),
                None => SyncAction::Fail(FailReason::UnsupportedArchiveFormat),
            }
        }
        Intent::SyncFromRemote => {
            if !request.force_refresh && state.workspace_populated {
                SyncAction::UseExistingWorkspace
            } else if state.remote_executable_present {
                SyncAction::CopyRemoteExecutableToWorkspace
            } else if state.remote_archive_present {
                SyncAction::ExtractRemoteArchiveThenBackupToExecutable
            } else {
                SyncAction::Fail(FailReason::RemoteStoreEmpty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_states() -> Vec<SourceState> {
        let mut states = Vec::new();
        for bits in 0..8u8 {
            states.push(SourceState {
                workspace_populated: bits & 1 != 0,
                remote_executable_present: bits & 2 != 0,
                remote_archive_present: bits & 4 != 0,
            });
        }
        states
    }

    fn sync(state: SourceState, force_refresh: bool) -> SyncAction {
        resolve(&ResolveRequest {
            state,
            intent: Intent::SyncFromRemote,
            force_refresh,
            supplied: &[],
            extension: ".zip",
        })
    }

    fn supply(supplied: &[PathBuf]) -> SyncAction {
        resolve(&ResolveRequest {
            state: SourceState::default(),
            intent: Intent::SupplyNewArchive,
            force_refresh: false,
            supplied,
            extension: ".zip",
        })
    }

    #[test]
    fn test_populated_workspace_wins_without_refresh() {
        for state in all_states().into_iter().filter(|s| s.workspace_populated) {
            assert_eq!(sync(state, false), SyncAction::UseExistingWorkspace, "{:?}", state);
        }
    }

    #[test]
    fn test_remote_executable_preferred_when_refreshing_or_empty() {
        for state in all_states().into_iter().filter(|s| s.remote_executable_present) {
            for force in [false, true] {
                if force || !state.workspace_populated {
                    assert_eq!(sync(state, force), SyncAction::CopyRemoteExecutableToWorkspace);
                }
            }
        }
    }

    #[test]
    fn test_archive_only_remote_extracts_then_converges() {
        for workspace_populated in [false, true] {
            let state = SourceState {
                workspace_populated,
                remote_executable_present: false,
                remote_archive_present: true,
            };
            let force = workspace_populated;
            assert_eq!(
                sync(state, force),
                SyncAction::ExtractRemoteArchiveThenBackupToExecutable
            );

            let after = SourceState {
                remote_executable_present: true,
                ..state
            };
            assert_eq!(sync(after, true), SyncAction::CopyRemoteExecutableToWorkspace);
        }
    }

    #[test]
    fn test_empty_remote_fails() {
        for state in all_states()
            .into_iter()
            .filter(|s| !s.remote_executable_present && !s.remote_archive_present)
        {
            assert_eq!(sync(state, true), SyncAction::Fail(FailReason::RemoteStoreEmpty));
            if !state.workspace_populated {
                assert_eq!(sync(state, false), SyncAction::Fail(FailReason::RemoteStoreEmpty));
            }
        }
    }

    #[test]
    fn test_supply_without_files() {
        assert_eq!(supply(&[]), SyncAction::Fail(FailReason::NoArchiveSupplied));
    }

    #[test]
    fn test_supply_rejects_unrecognized_extension() {
        let files = vec![PathBuf::from("notes.txt"), PathBuf::from("project.tar.gz")];
        assert_eq!(supply(&files), SyncAction::Fail(FailReason::UnsupportedArchiveFormat));
    }

    #[test]
    fn test_supply_takes_first_archive() {
        let files = vec![
            PathBuf::from("readme.md"),
            PathBuf::from("project (1).zip"),
            PathBuf::from("project.zip"),
        ];
        assert_eq!(
            supply(&files),
            SyncAction::ExtractSuppliedArchiveToWorkspace(PathBuf::from("project (1).zip"))
        );
    }

    #[test]
    fn test_supply_ignores_state() {
        let request = ResolveRequest {
            state: SourceState {
                workspace_populated: true,
                remote_executable_present: true,
                remote_archive_present: true,
            },
            intent: Intent::SupplyNewArchive,
            force_refresh: false,
            supplied: &[PathBuf::from("p.zip")],
            extension: ".zip",
        };
        assert!(matches!(
            resolve(&request),
            SyncAction::ExtractSuppliedArchiveToWorkspace(_)
        ));
    }
}

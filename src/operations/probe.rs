// State Probe
// Inspects the layout to produce the resolver's inputs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::resolver::SourceState;
use crate::core::Layout;
use crate::utilities::{has_extension, is_populated_dir};

/// Observed state of the workspace and remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub workspace_populated: bool,
    pub remote_reachable: bool,
    pub remote_executable_present: bool,
    /// The archive the remote store holds, if any
    pub remote_archive: Option<PathBuf>,
}

impl ProbeResult {
    pub fn source_state(&self) -> SourceState {
        SourceState {
            workspace_populated: self.workspace_populated,
            remote_executable_present: self.remote_executable_present,
            remote_archive_present: self.remote_archive.is_some(),
        }
    }
}

/// Probe the layout
pub fn probe(layout: &Layout, extension: &str) -> ProbeResult {
    let remote_reachable = layout.remote_base.is_dir();

    let (remote_executable_present, remote_archive) = if remote_reachable {
        (
            is_populated_dir(&layout.remote_executable),
            find_archive(&layout.remote_archives, extension),
        )
    } else {
        (false, None)
    };

    let result = ProbeResult {
        workspace_populated: is_populated_dir(&layout.workspace),
        remote_reachable,
        remote_executable_present,
        remote_archive,
    };
    debug!(?result, "probed layout");
    result
}

/// First file with the recognized extension, by name
pub fn find_archive(dir: &Path, extension: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;

    let mut archives: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_extension(p, extension))
        .collect();

    archives.sort();
    archives.into_iter().next()
}

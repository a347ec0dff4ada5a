// Remote Mount
// Makes the remote store reachable before probing

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::core::error::SyncError;

/// Remote store mount handling
pub struct RemoteMount;

impl RemoteMount {
    /// Check whether the remote base is reachable
    pub fn is_reachable(remote_base: &Path) -> bool {
        remote_base.is_dir()
    }

    /// Run the mount command unless the remote is already reachable
    pub fn ensure(remote_base: &Path, mount_command: Option<&str>) -> Result<(), SyncError> {
        if Self::is_reachable(remote_base) {
            debug!(path = %remote_base.display(), "remote store already reachable");
            return Ok(());
        }

        let Some(command) = mount_command else {
            return Err(Self::unavailable(remote_base, "path does not exist and no mount command is configured"));
        };

        info!(command, "mounting remote store");
        let output = Command::new("sh")
            .args(["-c", command])
            .output()
            .map_err(|e| Self::unavailable(remote_base, &format!("failed to run mount command: {}", e)))?;

        if !output.status.success() {
            return Err(Self::unavailable(
                remote_base,
                &format!("mount command failed: {}", String::from_utf8_lossy(&output.stderr).trim()),
            ));
        }

        if !Self::is_reachable(remote_base) {
            return Err(Self::unavailable(remote_base, "mount command succeeded but the path is still missing"));
        }

        Ok(())
    }

    fn unavailable(remote_base: &Path, reason: &str) -> SyncError {
        SyncError::RemoteUnavailable {
            path: remote_base.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

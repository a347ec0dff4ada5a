// Project Launcher
// Runs the project entrypoint from a synced workspace

use std::path::Path;
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};
use tracing::info;

/// Run `entrypoint` through the shell inside `workspace`
/// The secret, when present, is exported under its own name
pub fn run_entrypoint(
    workspace: &Path,
    entrypoint: &str,
    secret: Option<(&str, &str)>,
) -> Result<ExitStatus> {
    info!(entrypoint, workspace = %workspace.display(), "launching project");

    let mut command = Command::new("sh");
    command.args(["-c", entrypoint]).current_dir(workspace);
    if let Some((name, value)) = secret {
        command.env(name, value);
    }

    command
        .status()
        .with_context(|| format!("Failed to launch '{}' in {}", entrypoint, workspace.display()))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_runs_in_workspace_with_secret() {
        let dir = tempfile::tempdir().unwrap();
        let status = run_entrypoint(
            dir.path(),
            "printf %s \"$PROJECT_TOKEN\" > token.txt",
            Some(("PROJECT_TOKEN", "t0k3n")),
        )
        .unwrap();

        assert!(status.success());
        assert_eq!(fs::read_to_string(dir.path().join("token.txt")).unwrap(), "t0k3n");
    }

    #[test]
    fn test_exit_code_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let status = run_entrypoint(dir.path(), "exit 7", None).unwrap();
        assert_eq!(status.code(), Some(7));
    }
}

// Application constants

/// Runtime config file looked up in the current directory
pub const PROJECT_CONFIG_NAME: &str = "project-sync.yaml";

/// Suffix of the hidden sibling used to stage a directory replacement
pub const STAGING_SUFFIX: &str = ".staging";

/// Characters of a secret shown in status output
pub const SECRET_PREVIEW_CHARS: usize = 4;

// Process exit codes
pub const EXIT_OK: i32 = 0;
pub const EXIT_RESOLUTION_FAILED: i32 = 1;
pub const EXIT_EXECUTION_FAILED: i32 = 2;
pub const EXIT_REMOTE_UNAVAILABLE: i32 = 3;

// Project Sync Library
// Prepares a runnable project workspace from a remote store or a supplied archive

// Core infrastructure - configuration, layout, errors, session
pub mod core;

// Operations - resolution, probing and filesystem work
pub mod operations;

// Utilities - helper functions and tools
pub mod utilities;

// Configuration loading and validation
pub mod config_validation;

// Human-readable status lines
pub mod report;

// Application constants
pub mod constants;

// Re-export commonly used items for convenience
pub use core::{App, AppConfig, Layout, SyncError, SyncRequest};
pub use operations::{resolve, FailReason, Intent, SyncAction, SyncEngine};
pub use report::Reporter;
pub use constants::*;

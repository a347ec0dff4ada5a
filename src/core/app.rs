// Application Session
// Ties probing, resolution and execution together for one invocation

use anyhow::Result;
use std::path::PathBuf;
use std::process::ExitStatus;
use tracing::{info, warn};

use super::error::SyncError;
use super::{AppConfig, Layout};
use crate::operations::launch::run_entrypoint;
use crate::operations::secrets::mask;
use crate::operations::{
    probe, resolve, ChainedSecretStore, FailReason, Intent, Outcome, ProbeResult, RemoteMount,
    ResolveRequest, SecretStore, SyncAction, SyncEngine, SyncOptions,
};
use crate::report::Reporter;
use crate::utilities::PatternMatcher;

/// What the user asked this invocation to do
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub intent: Intent,
    pub force_refresh: bool,
    /// Candidate archives for `SupplyNewArchive`
    pub supplied: Vec<PathBuf>,
}

impl SyncRequest {
    pub fn from_remote(force_refresh: bool) -> Self {
        Self {
            intent: Intent::SyncFromRemote,
            force_refresh,
            supplied: Vec::new(),
        }
    }

    pub fn supply(files: Vec<PathBuf>) -> Self {
        Self {
            intent: Intent::SupplyNewArchive,
            force_refresh: false,
            supplied: files,
        }
    }
}

/// A planned action together with the state it was planned from
#[derive(Debug, Clone)]
pub struct Plan {
    pub probe: ProbeResult,
    pub action: SyncAction,
}

/// One invocation of project-sync
pub struct App {
    /// Merged configuration
    pub config: AppConfig,

    /// Resolved filesystem locations
    pub layout: Layout,

    engine: SyncEngine,
    secrets: Box<dyn SecretStore>,
}

impl App {
    /// Create a new session from configuration
    pub fn new(config: AppConfig, dry_run: bool) -> Self {
        let secrets = Box::new(ChainedSecretStore::standard(&config.secrets.secrets_file));
        Self::with_secret_store(config, dry_run, secrets)
    }

    /// Create a session with a specific secret store
    pub fn with_secret_store(config: AppConfig, dry_run: bool, secrets: Box<dyn SecretStore>) -> Self {
        let layout = Layout::from_config(&config);
        let engine = SyncEngine::new(SyncOptions {
            extension: config.archive.extension.clone(),
            flatten_single_root: config.archive.flatten_single_root,
            backup_supplied_archive: config.archive.backup_supplied_archive,
            excludes: PatternMatcher::new(config.extract_excludes.clone()),
            dry_run,
        });

        Self {
            config,
            layout,
            engine,
            secrets,
        }
    }

    /// Make sure the remote is reachable, mounting it if configured
    /// Returns false and warns when it cannot be reached
    pub fn prepare_remote(&self, reporter: &mut Reporter) -> bool {
        match RemoteMount::ensure(&self.layout.remote_base, self.config.mount_command.as_deref()) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "remote store not reachable");
                reporter.warn(e.to_string());
                false
            }
        }
    }

    /// Probe and resolve without touching anything
    pub fn plan(&self, request: &SyncRequest) -> Plan {
        let probe = probe(&self.layout, &self.config.archive.extension);
        let action = resolve(&ResolveRequest {
            state: probe.source_state(),
            intent: request.intent,
            force_refresh: request.force_refresh,
            supplied: &request.supplied,
            extension: &self.config.archive.extension,
        });
        Plan { probe, action }
    }

    /// Resolve and execute a request
    pub fn sync(&self, request: &SyncRequest, reporter: &mut Reporter) -> Result<Outcome, SyncError> {
        let wants_remote = match request.intent {
            Intent::SyncFromRemote => true,
            Intent::SupplyNewArchive => self.config.archive.backup_supplied_archive,
        };
        if wants_remote {
            self.prepare_remote(reporter);
        }

        let plan = self.plan(request);
        info!(action = %plan.action, "resolved sync action");
        reporter.step(format!("Plan: {}", plan.action));

        // No remote and nothing local to fall back on
        if plan.action == SyncAction::Fail(FailReason::RemoteStoreEmpty) && !plan.probe.remote_reachable {
            let err = SyncError::RemoteUnavailable {
                path: self.layout.remote_base.clone(),
                reason: "not reachable and no local workspace to fall back on".to_string(),
            };
            reporter.fail(err.to_string());
            return Err(err);
        }

        if plan.action == SyncAction::UseExistingWorkspace && !plan.probe.remote_reachable {
            reporter.warn("Remote store not reachable; using the local workspace as is");
        }

        self.engine.execute(&plan.action, &self.layout, reporter)
    }

    /// Look up the configured secret and report its presence
    pub fn check_secret(&self, reporter: &mut Reporter) -> Option<String> {
        let name = self.config.secrets.secret_name.trim();
        if name.is_empty() {
            return None;
        }

        match self.secrets.get(name) {
            Some(value) => {
                reporter.done(format!("Secret {} found ({})", name, mask(&value)));
                Some(value)
            }
            None => {
                reporter.warn(format!(
                    "Secret {} not found in {}; features that need it will not work",
                    name,
                    self.secrets.describe()
                ));
                None
            }
        }
    }

    /// Run the configured entrypoint, if there is one
    pub fn launch(&self, secret: Option<&str>, reporter: &mut Reporter) -> Result<Option<ExitStatus>> {
        let Some(entrypoint) = self.config.entrypoint.as_deref() else {
            reporter.warn("No entrypoint configured; nothing to run");
            return Ok(None);
        };

        reporter.step(format!("Running {}", entrypoint));
        let name = self.config.secrets.secret_name.as_str();
        let status = run_entrypoint(&self.layout.workspace, entrypoint, secret.map(|v| (name, v)))?;
        Ok(Some(status))
    }
}

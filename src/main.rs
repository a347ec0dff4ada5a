// Project Sync
// Prepares a runnable project workspace for the current session

// IMPORTS ------------------>>

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use project_sync::config_validation::load_and_validate_config;
use project_sync::core::events::{ask_line, ask_yes_no};
use project_sync::{
    App, Reporter, SyncError, SyncRequest, EXIT_EXECUTION_FAILED, EXIT_OK, EXIT_REMOTE_UNAVAILABLE,
    EXIT_RESOLUTION_FAILED,
};

//--------------------------------------------------------<<
// CLI ------------------>>

#[derive(Parser)]
#[command(name = "project-sync")]
#[command(about = "Prepare a runnable project workspace from a remote store or a supplied archive")]
struct Cli {
    /// Runtime config file (defaults to ./project-sync.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Populate the workspace from the remote store
    Sync {
        /// Replace a populated workspace with the remote copy
        #[arg(short, long)]
        force_refresh: bool,

        /// Show what would happen without touching anything
        #[arg(long)]
        dry_run: bool,

        /// Run the configured entrypoint after a successful sync
        #[arg(long)]
        run: bool,
    },
    /// Replace the workspace with a freshly supplied archive
    Supply {
        /// Candidate files; the first with the archive extension is used
        files: Vec<PathBuf>,

        /// Do not copy the archive into the remote archive store
        #[arg(long)]
        no_backup: bool,

        /// Show what would happen without touching anything
        #[arg(long)]
        dry_run: bool,

        /// Run the configured entrypoint after a successful sync
        #[arg(long)]
        run: bool,
    },
    /// Show the probed state and the action a sync would take
    Status {
        /// Plan as if --force-refresh were given
        #[arg(short, long)]
        force_refresh: bool,
    },
    /// Ask interactively whether to sync from the remote or supply an archive
    Prompt {
        /// Run the configured entrypoint after a successful sync
        #[arg(long)]
        run: bool,
    },
}

//--------------------------------------------------------<<

fn init_tracing(verbose: bool) {
    let default = if verbose { "project_sync=debug" } else { "project_sync=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    // stdout carries the status lines
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_EXECUTION_FAILED as u8)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let mut config = load_and_validate_config(cli.config)?;
    let mut reporter = Reporter::new();

    let command = cli.command.unwrap_or(Commands::Prompt { run: false });
    let (request, dry_run, launch) = match command {
        Commands::Sync { force_refresh, dry_run, run } => (SyncRequest::from_remote(force_refresh), dry_run, run),
        Commands::Supply { files, no_backup, dry_run, run } => {
            if no_backup {
                config.archive.backup_supplied_archive = false;
            }
            (SyncRequest::supply(files), dry_run, run)
        }
        Commands::Status { force_refresh } => {
            let app = App::new(config, true);
            return Ok(status(&app, force_refresh, &mut reporter) as u8);
        }
        Commands::Prompt { run } => match prompt_request()? {
            Some(request) => (request, false, run),
            None => {
                reporter.warn("Cancelled");
                return Ok(EXIT_RESOLUTION_FAILED as u8);
            }
        },
    };

    let app = App::new(config, dry_run);
    let outcome = match app.sync(&request, &mut reporter) {
        Ok(outcome) => outcome,
        // Downstream steps never run after a failed sync
        Err(e) => return Ok(exit_code(&e) as u8),
    };
    tracing::debug!(?outcome, "sync finished");

    let secret = app.check_secret(&mut reporter);

    if launch && !dry_run {
        if let Some(status) = app.launch(secret.as_deref(), &mut reporter)? {
            return Ok(status.code().unwrap_or(EXIT_EXECUTION_FAILED) as u8);
        }
    }

    Ok(EXIT_OK as u8)
}

fn exit_code(error: &SyncError) -> i32 {
    match error {
        SyncError::RemoteUnavailable { .. } => EXIT_REMOTE_UNAVAILABLE,
        SyncError::NoFileSupplied
        | SyncError::UnsupportedArchiveFormat(..)
        | SyncError::RemoteStoreEmpty(_) => EXIT_RESOLUTION_FAILED,
        _ => EXIT_EXECUTION_FAILED,
    }
}

/// Print the current state and what a sync would do
/// Exits with the resolution-failure code when a sync would fail
fn status(app: &App, force_refresh: bool, reporter: &mut Reporter) -> i32 {
    let layout = &app.layout;
    let plan = app.plan(&SyncRequest::from_remote(force_refresh));
    let probe = &plan.probe;

    println!("Workspace          {} ({})", layout.workspace.display(), populated(probe.workspace_populated));
    println!(
        "Remote store       {} ({})",
        layout.remote_base.display(),
        if probe.remote_reachable { "reachable" } else { "not reachable" }
    );
    println!(
        "Executable copy    {} ({})",
        layout.remote_executable.display(),
        populated(probe.remote_executable_present)
    );
    match &probe.remote_archive {
        Some(path) => println!("Archive            {}", path.display()),
        None => println!("Archive            none under {}", layout.remote_archives.display()),
    }
    println!("Sync would         {}", plan.action);

    app.check_secret(reporter);

    if plan.action.is_fail() {
        EXIT_RESOLUTION_FAILED
    } else {
        EXIT_OK
    }
}

fn populated(flag: bool) -> &'static str {
    if flag { "populated" } else { "empty" }
}

/// Collect the user's intent with a y/n key prompt
fn prompt_request() -> anyhow::Result<Option<SyncRequest>> {
    let Some(from_remote) = ask_yes_no("Sync the project from the remote store?")? else {
        return Ok(None);
    };

    if from_remote {
        let Some(force) = ask_yes_no("Replace the local workspace even if it is already populated?")? else {
            return Ok(None);
        };
        return Ok(Some(SyncRequest::from_remote(force)));
    }

    let path = ask_line("Path to the project archive:")?;
    let files = if path.is_empty() { Vec::new() } else { vec![PathBuf::from(path)] };
    Ok(Some(SyncRequest::supply(files)))
}

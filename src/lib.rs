// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod resolve;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use crate::cli::CliArgs;
use crate::config::load_settings;
use crate::engine::ControlLoop;
use crate::exec::GoToolchain;
use crate::resolve::{GoListResolver, PackageResolver};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings (CLI flags, optional `Rerun.toml`, `GOBIN`)
/// - the `go list` resolver and the go toolchain pipeline
/// - the control loop (watcher + supervisor)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = load_settings(&args)?;
    info!(
        import_path = %settings.import_path,
        test = settings.run_tests,
        build = settings.release_build,
        no_run = settings.never_run,
        race = settings.race,
        "rerun starting"
    );

    let resolver: Arc<dyn PackageResolver> =
        Arc::new(GoListResolver::new(settings.go_command.clone()));
    let backend = GoToolchain::new(settings.go_command.clone());

    let control = ControlLoop::new(settings, resolver, backend)?;

    // Ctrl-C → stop the program and exit.
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    control.run(shutdown).await?;
    info!("rerun exiting");
    Ok(())
}

// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `rerun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rerun",
    version,
    about = "Rebuild, test and restart a Go program whenever its sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// Import path of the program to supervise.
    #[arg(value_name = "IMPORT_PATH")]
    pub import_path: String,

    /// Arguments passed verbatim to the supervised program.
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,

    /// Run tests (before running the program).
    #[arg(long)]
    pub test: bool,

    /// Produce a release build on every cycle.
    #[arg(long)]
    pub build: bool,

    /// Never run the program; only rebuild/test/build.
    #[arg(long)]
    pub no_run: bool,

    /// Pass `-race` to every invoked go command.
    #[arg(long)]
    pub race: bool,

    /// Path to an optional config file (TOML).
    ///
    /// When omitted, `Rerun.toml` in the current directory is used if it
    /// exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// How long to wait for the program to exit after an interrupt before
    /// killing it (e.g. `500ms`, `5s`).
    #[arg(long, value_name = "DURATION")]
    pub grace_period: Option<String>,

    /// The go executable to invoke.
    #[arg(long = "go", value_name = "PATH")]
    pub go_command: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RERUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

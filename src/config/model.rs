// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Default grace period between interrupting the program and killing it.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Default source file extension that triggers a rebuild.
pub const DEFAULT_SOURCE_EXTENSION: &str = "go";

/// Raw configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// go = "go"
/// grace_period = "5s"
/// extension = "go"
/// exclude = ["*_test.go"]
/// test = true
/// ```
///
/// Every key is optional. Booleans set here are OR'ed with the matching CLI
/// flags; values given on the command line win over values from the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSection {
    /// The go executable.
    #[serde(default)]
    pub go: Option<String>,

    /// Duration string such as `"500ms"` or `"5s"`.
    #[serde(default)]
    pub grace_period: Option<String>,

    /// Source extension, with or without the leading dot.
    #[serde(default)]
    pub extension: Option<String>,

    /// File-name globs whose changes never trigger a rebuild.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub test: bool,

    #[serde(default)]
    pub build: bool,

    #[serde(default)]
    pub race: bool,

    #[serde(default)]
    pub no_run: bool,
}

/// Immutable run configuration.
///
/// Built once at startup from CLI flags, the optional config file and the
/// environment, then handed to every component that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Import path of the supervised program.
    pub import_path: String,
    /// Arguments forwarded verbatim to the program.
    pub args: Vec<String>,
    /// Run `go test` before relaunching.
    pub run_tests: bool,
    /// Run `go build` on every cycle.
    pub release_build: bool,
    /// Never start the program.
    pub never_run: bool,
    /// Pass `-race` to every go command.
    pub race: bool,
    pub go_command: PathBuf,
    pub grace_period: Duration,
    /// Extension without the leading dot, e.g. `"go"`.
    pub source_extension: String,
    pub exclude: Vec<String>,
    /// Value of `GOBIN` captured at startup.
    pub bin_dir_override: Option<PathBuf>,
}

impl Settings {
    /// Settings with defaults for everything but the import path.
    pub fn new(import_path: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            args: Vec::new(),
            run_tests: false,
            release_build: false,
            never_run: false,
            race: false,
            go_command: PathBuf::from("go"),
            grace_period: DEFAULT_GRACE_PERIOD,
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            exclude: Vec::new(),
            bin_dir_override: None,
        }
    }
}

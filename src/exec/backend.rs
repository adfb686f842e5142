// src/exec/backend.rs

//! Pluggable build backend abstraction.
//!
//! The pipeline talks to a `PipelineBackend` instead of spawning the go
//! toolchain directly. Production code uses [`GoToolchain`]; tests provide a
//! backend that records stages and returns scripted results.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

/// One step of the build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Compile and install the binary.
    Install,
    /// Run the package tests.
    Test,
    /// Produce a release build.
    Build,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Install => "install",
            Stage::Test => "test",
            Stage::Build => "build",
        };
        f.write_str(s)
    }
}

/// Outcome of a single stage: pass/fail plus stdout and stderr captured
/// together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub passed: bool,
    pub output: String,
}

impl StageResult {
    pub fn pass() -> Self {
        Self {
            passed: true,
            output: String::new(),
        }
    }

    pub fn fail(output: impl Into<String>) -> Self {
        Self {
            passed: false,
            output: output.into(),
        }
    }
}

/// Trait abstracting how pipeline stages are executed.
pub trait PipelineBackend: Send {
    fn run_stage<'a>(
        &'a mut self,
        stage: Stage,
        import_path: &'a str,
        race: bool,
    ) -> Pin<Box<dyn Future<Output = StageResult> + Send + 'a>>;
}

/// Runs stages through the go toolchain.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    go_command: PathBuf,
}

impl GoToolchain {
    pub fn new(go_command: impl Into<PathBuf>) -> Self {
        Self {
            go_command: go_command.into(),
        }
    }

    /// Arguments passed to the go command for `stage`.
    pub fn stage_args(stage: Stage, import_path: &str, race: bool) -> Vec<String> {
        let mut args = vec![stage.to_string()];
        if race {
            args.push("-race".to_string());
        }
        if stage != Stage::Install {
            args.push("-v".to_string());
        }
        args.push(import_path.to_string());
        args
    }
}

impl PipelineBackend for GoToolchain {
    fn run_stage<'a>(
        &'a mut self,
        stage: Stage,
        import_path: &'a str,
        race: bool,
    ) -> Pin<Box<dyn Future<Output = StageResult> + Send + 'a>> {
        let args = Self::stage_args(stage, import_path, race);
        let go = self.go_command.clone();

        Box::pin(async move {
            debug!(%stage, ?args, "running go command");

            let output = Command::new(&go)
                .args(&args)
                .stdin(Stdio::null())
                .output()
                .await;

            let output = match output {
                Ok(o) => o,
                Err(e) => {
                    return StageResult::fail(format!("running {}: {e}\n", go.display()));
                }
            };

            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));

            let passed = match stage {
                // `go install` is silent on success; any output means trouble.
                Stage::Install => output.status.success() && text.is_empty(),
                Stage::Test | Stage::Build => output.status.success(),
            };

            StageResult {
                passed,
                output: text,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_args() {
        assert_eq!(
            GoToolchain::stage_args(Stage::Install, "ex.com/app", false),
            vec!["install", "ex.com/app"]
        );
    }

    #[test]
    fn race_flag_precedes_verbose() {
        assert_eq!(
            GoToolchain::stage_args(Stage::Test, "ex.com/app", true),
            vec!["test", "-race", "-v", "ex.com/app"]
        );
        assert_eq!(
            GoToolchain::stage_args(Stage::Build, "ex.com/app", false),
            vec!["build", "-v", "ex.com/app"]
        );
    }

    #[tokio::test]
    async fn missing_toolchain_fails_the_stage() {
        let mut go = GoToolchain::new("/nonexistent/bin/go");
        let res = go.run_stage(Stage::Install, "ex.com/app", false).await;
        assert!(!res.passed);
        assert!(res.output.contains("/nonexistent/bin/go"));
    }
}

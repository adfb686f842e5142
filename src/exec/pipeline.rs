// src/exec/pipeline.rs

//! Install → test → build sequencing.

use tracing::{error, info};

use crate::config::Settings;
use crate::exec::backend::{PipelineBackend, Stage};

/// Stages that will run for `settings`, in order.
pub fn planned_stages(settings: &Settings) -> Vec<Stage> {
    let mut stages = vec![Stage::Install];
    if settings.run_tests {
        stages.push(Stage::Test);
    }
    if settings.release_build {
        stages.push(Stage::Build);
    }
    stages
}

/// Run the pipeline for `settings.import_path`.
///
/// Each stage gates the next. On the first failure the captured output is
/// printed to stderr and `false` is returned; no later stage runs.
pub async fn run_pipeline<B: PipelineBackend>(backend: &mut B, settings: &Settings) -> bool {
    for stage in planned_stages(settings) {
        let result = backend
            .run_stage(stage, &settings.import_path, settings.race)
            .await;

        if !result.passed {
            if !result.output.is_empty() {
                eprint!("{}", result.output);
                if !result.output.ends_with('\n') {
                    eprintln!();
                }
            }
            error!(%stage, import_path = %settings.import_path, "{stage} failed");
            return false;
        }

        match stage {
            Stage::Install => info!(import_path = %settings.import_path, "installed"),
            Stage::Test => info!("tests passed"),
            Stage::Build => info!("build passed"),
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_plan_follows_settings() {
        let mut settings = Settings::new("ex.com/app");
        assert_eq!(planned_stages(&settings), vec![Stage::Install]);

        settings.release_build = true;
        assert_eq!(planned_stages(&settings), vec![Stage::Install, Stage::Build]);

        settings.run_tests = true;
        assert_eq!(
            planned_stages(&settings),
            vec![Stage::Install, Stage::Test, Stage::Build]
        );
    }
}

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rerun::exec::{PipelineBackend, Stage, StageResult};

/// A fake pipeline backend that:
/// - records every stage it was asked to run (with the race flag)
/// - passes every stage unless a failure was scripted for it
/// - optionally takes a while to do so, like a real compile.
///
/// Clones share state, so a test can keep one clone for assertions after
/// moving another into the control loop.
#[derive(Debug, Clone, Default)]
pub struct FakePipeline {
    runs: Arc<Mutex<Vec<(Stage, bool)>>>,
    failing: Arc<Mutex<HashMap<Stage, String>>>,
    delay: Arc<Mutex<Duration>>,
}

impl FakePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `stage` fail with `output` until [`FakePipeline::pass`] is called.
    pub fn fail(&self, stage: Stage, output: &str) {
        self.failing.lock().unwrap().insert(stage, output.to_string());
    }

    pub fn pass(&self, stage: Stage) {
        self.failing.lock().unwrap().remove(&stage);
    }

    /// Every stage sleeps this long before reporting its result.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Stages run so far, in order.
    pub fn stages(&self) -> Vec<Stage> {
        self.runs.lock().unwrap().iter().map(|(s, _)| *s).collect()
    }

    /// Stages run so far together with the race flag they were given.
    pub fn runs(&self) -> Vec<(Stage, bool)> {
        self.runs.lock().unwrap().clone()
    }

    pub fn count(&self, stage: Stage) -> usize {
        self.runs.lock().unwrap().iter().filter(|(s, _)| *s == stage).count()
    }
}

impl PipelineBackend for FakePipeline {
    fn run_stage<'a>(
        &'a mut self,
        stage: Stage,
        _import_path: &'a str,
        race: bool,
    ) -> Pin<Box<dyn Future<Output = StageResult> + Send + 'a>> {
        self.runs.lock().unwrap().push((stage, race));
        let failure = self.failing.lock().unwrap().get(&stage).cloned();
        let delay = *self.delay.lock().unwrap();

        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match failure {
                Some(output) => StageResult::fail(output),
                None => StageResult::pass(),
            }
        })
    }
}

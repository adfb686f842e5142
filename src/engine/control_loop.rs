// src/engine/control_loop.rs

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::engine::target::{BuildTarget, setup};
use crate::errors::{RerunError, Result};
use crate::exec::{PipelineBackend, SupervisorHandle, run_pipeline, spawn_supervisor};
use crate::resolve::PackageResolver;
use crate::watch::{ChangeFilter, ChangeWatcher};

/// Creates the supervisor for a freshly set-up target.
pub type SupervisorFactory = Box<dyn Fn(&BuildTarget) -> SupervisorHandle + Send + Sync>;

enum SetupState {
    Failed,
    Ready {
        target: BuildTarget,
        /// `None` when running with `--no-run`.
        supervisor: Option<SupervisorHandle>,
    },
}

enum Wake {
    Changed(Option<PathBuf>),
    Shutdown,
}

/// Top-level watch → rebuild → relaunch loop.
pub struct ControlLoop<B: PipelineBackend> {
    settings: Settings,
    resolver: Arc<dyn PackageResolver>,
    backend: B,
    filter: ChangeFilter,
    supervisor_factory: SupervisorFactory,
    setup: SetupState,
    /// Where the root package last resolved to.
    root_dir: Option<PathBuf>,
}

impl<B: PipelineBackend> fmt::Debug for ControlLoop<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlLoop")
            .field("import_path", &self.settings.import_path)
            .field("setup_ok", &self.is_setup())
            .finish_non_exhaustive()
    }
}

impl<B: PipelineBackend> ControlLoop<B> {
    pub fn new(settings: Settings, resolver: Arc<dyn PackageResolver>, backend: B) -> Result<Self> {
        let filter = ChangeFilter::from_settings(&settings)?;
        let grace_period = settings.grace_period;

        Ok(Self {
            settings,
            resolver,
            backend,
            filter,
            supervisor_factory: Box::new(move |target| spawn_supervisor(target.clone(), grace_period)),
            setup: SetupState::Failed,
            root_dir: None,
        })
    }

    /// Replace how supervisors are created.
    pub fn with_supervisor_factory(mut self, factory: SupervisorFactory) -> Self {
        self.supervisor_factory = factory;
        self
    }

    fn is_setup(&self) -> bool {
        matches!(self.setup, SetupState::Ready { .. })
    }

    /// Run until `shutdown` resolves or the watcher cannot be rebuilt.
    ///
    /// On shutdown the running program is stopped and reaped before this
    /// returns. A watcher construction failure also stops the program and is
    /// returned as an error.
    pub async fn run<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        self.try_setup().await;
        self.build_test_run().await;

        let mut watcher = match self.create_watcher().await {
            Ok(w) => w,
            Err(err) => {
                self.stop_supervisor().await;
                return Err(err);
            }
        };

        loop {
            let wake = tokio::select! {
                change = watcher.next_change(&self.filter) => Wake::Changed(change),
                () = &mut shutdown => Wake::Shutdown,
            };

            let path = match wake {
                Wake::Shutdown => {
                    info!("shutdown requested");
                    watcher.discard();
                    self.stop_supervisor().await;
                    return Ok(());
                }
                Wake::Changed(None) => {
                    watcher.discard();
                    self.stop_supervisor().await;
                    return Err(RerunError::Other(anyhow::anyhow!(
                        "file watcher stopped delivering events"
                    )));
                }
                Wake::Changed(Some(path)) => path,
            };

            info!(path = %path.display(), "change detected");

            // The old watcher is never reused; its leftovers are drained in
            // the background.
            watcher.discard();

            info!("rescanning");
            watcher = match self.create_watcher().await {
                Ok(w) => w,
                Err(err) => {
                    error!(error = %err, "cannot recreate file watcher");
                    self.stop_supervisor().await;
                    return Err(err);
                }
            };

            if !self.is_setup() {
                self.try_setup().await;
            }

            self.build_test_run().await;
        }
    }

    /// Resolve the build target; on success (and unless `--no-run`) spawn a
    /// supervisor for it.
    async fn try_setup(&mut self) {
        let resolver = Arc::clone(&self.resolver);
        let settings = self.settings.clone();
        let res = tokio::task::spawn_blocking(move || setup(resolver.as_ref(), &settings))
            .await
            .map_err(|e| RerunError::Other(e.into()))
            .and_then(|r| r);

        match res {
            Ok(target) => {
                let supervisor = if self.settings.never_run {
                    None
                } else {
                    Some((self.supervisor_factory)(&target))
                };
                info!(binary = %target.bin_path.display(), "setup complete");
                self.setup = SetupState::Ready { target, supervisor };
            }
            Err(err) => {
                error!(error = %err, "setup failed; will retry on the next change");
                self.setup = SetupState::Failed;
            }
        }
    }

    /// Run the pipeline and, if it passes, ask the supervisor to relaunch.
    async fn build_test_run(&mut self) {
        if !run_pipeline(&mut self.backend, &self.settings).await {
            return;
        }

        match &self.setup {
            SetupState::Ready {
                supervisor: Some(supervisor),
                target,
            } => {
                if let Err(err) = supervisor.relaunch().await {
                    error!(import_path = %target.import_path, error = %err, "cannot relaunch");
                }
            }
            SetupState::Ready {
                supervisor: None, ..
            } => debug!("not running the program (--no-run)"),
            SetupState::Failed => warn!("setup has not succeeded; not starting the program"),
        }
    }

    /// Build a fresh watcher and remember where the root package lives, so
    /// a later walk that cannot resolve it still watches its directory.
    async fn create_watcher(&mut self) -> Result<ChangeWatcher> {
        let watcher = ChangeWatcher::create(
            Arc::clone(&self.resolver),
            &self.settings.import_path,
            self.root_dir.clone(),
        )
        .await?;
        self.root_dir = watcher.watch_set().root_dir().map(Path::to_path_buf);
        Ok(watcher)
    }

    async fn stop_supervisor(&mut self) {
        if let SetupState::Ready { supervisor, .. } = &mut self.setup {
            if let Some(supervisor) = supervisor.take() {
                supervisor.shutdown().await;
            }
        }
    }
}

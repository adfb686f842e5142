// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::errors::{RerunError, Result};
use crate::resolve::PackageResolver;
use crate::watch::filter::ChangeFilter;
use crate::watch::watch_set::{WatchSet, build_watch_set};

/// A single-use filesystem watcher over one [`WatchSet`].
///
/// Once it has reported a relevant change it should be handed to
/// [`ChangeWatcher::discard`] and replaced by a fresh one built from a new
/// walk of the import graph.
pub struct ChangeWatcher {
    inner: RecommendedWatcher,
    events: mpsc::UnboundedReceiver<Event>,
    errors: mpsc::UnboundedReceiver<notify::Error>,
    watch_set: WatchSet,
}

impl std::fmt::Debug for ChangeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeWatcher")
            .field("dirs", &self.watch_set.len())
            .finish_non_exhaustive()
    }
}

impl ChangeWatcher {
    /// Walk the import graph from `root` on a blocking thread, then watch
    /// every directory found.
    ///
    /// If the root package cannot be resolved at all, `last_root_dir` (the
    /// directory it resolved to previously) is watched in its place.
    pub async fn create(
        resolver: Arc<dyn PackageResolver>,
        root: &str,
        last_root_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let root = root.to_string();
        let mut watch_set = tokio::task::spawn_blocking({
            let root = root.clone();
            move || build_watch_set(resolver.as_ref(), &root)
        })
        .await
        .map_err(|e| RerunError::Other(e.into()))?;

        match last_root_dir {
            Some(dir) if watch_set.root_dir().is_none() => {
                warn!(import_path = %root, dir = %dir.display(), "cannot resolve package; watching its last known directory");
                watch_set.fall_back_to_root_dir(dir);
            }
            _ if watch_set.root_dir().is_none() => {
                warn!(import_path = %root, "cannot resolve package; its directory is not watched");
            }
            _ => {}
        }

        Self::new(watch_set)
    }

    /// Construct a watcher over an already-built watch set.
    ///
    /// Failing to create the underlying notify handle is an error. A single
    /// directory that cannot be registered (it may have been removed since
    /// the walk) is logged and skipped.
    pub fn new(watch_set: WatchSet) -> Result<Self> {
        let (event_tx, events) = mpsc::unbounded_channel::<Event>();
        let (error_tx, errors) = mpsc::unbounded_channel::<notify::Error>();

        // Called synchronously by notify on its own thread.
        let mut inner = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                // Send failures only mean the receiver is gone.
                let _ = match res {
                    Ok(event) => event_tx.send(event).map_err(|_| ()),
                    Err(err) => error_tx.send(err).map_err(|_| ()),
                };
            },
            Config::default(),
        )?;

        let mut registered = 0usize;
        for dir in watch_set.dirs() {
            match inner.watch(dir, RecursiveMode::NonRecursive) {
                Ok(()) => registered += 1,
                Err(err) => warn!(dir = ?dir, error = %err, "cannot watch directory; skipping"),
            }
        }

        info!(dirs = registered, "watching for changes");

        Ok(Self {
            inner,
            events,
            errors,
            watch_set,
        })
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.watch_set
    }

    /// Wait for the next event that `filter` considers relevant and return
    /// its path. Irrelevant events are dropped; watcher errors are logged.
    ///
    /// Returns `None` only if the notify backend went away.
    pub async fn next_change(&mut self, filter: &ChangeFilter) -> Option<PathBuf> {
        loop {
            tokio::select! {
                maybe_event = self.events.recv() => {
                    let event = maybe_event?;
                    match filter.relevant_path(&event) {
                        Some(path) => return Some(path.to_path_buf()),
                        None => trace!(?event, "ignoring irrelevant event"),
                    }
                }
                Some(err) = self.errors.recv() => {
                    warn!(error = %err, "file watcher error");
                }
            }
        }
    }

    /// Close the watcher and spawn a task that drains whatever it had
    /// already buffered.
    ///
    /// Dropping the notify handle drops its callback, which closes both
    /// channels; the drain task ends once both are exhausted.
    pub fn discard(self) -> JoinHandle<()> {
        let ChangeWatcher {
            inner,
            mut events,
            mut errors,
            ..
        } = self;
        drop(inner);

        tokio::spawn(async move {
            let mut drained_events = 0usize;
            let mut drained_errors = 0usize;
            while events.recv().await.is_some() {
                drained_events += 1;
            }
            while errors.recv().await.is_some() {
                drained_errors += 1;
            }
            debug!(drained_events, drained_errors, "discarded watcher drained");
        })
    }
}

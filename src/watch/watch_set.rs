// src/watch/watch_set.rs

//! Import-graph walk producing the set of directories to watch.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::resolve::PackageResolver;

/// Directories to register with a watcher, plus the import paths visited
/// while collecting them.
///
/// A `WatchSet` is always built from scratch; it is never patched after a
/// change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSet {
    visited: HashSet<String>,
    dirs: BTreeSet<PathBuf>,
    root_dir: Option<PathBuf>,
}

impl WatchSet {
    pub fn dirs(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    pub fn contains_dir(&self, dir: impl AsRef<Path>) -> bool {
        self.dirs.contains(dir.as_ref())
    }

    pub fn has_visited(&self, import_path: &str) -> bool {
        self.visited.contains(import_path)
    }

    /// Directory of the root package, if the root resolved this time.
    pub fn root_dir(&self) -> Option<&Path> {
        self.root_dir.as_deref()
    }

    /// Watch `dir` as the root's directory when the root did not resolve.
    ///
    /// Returns `true` if `dir` was used.
    pub fn fall_back_to_root_dir(&mut self, dir: PathBuf) -> bool {
        if self.root_dir.is_some() {
            return false;
        }
        self.dirs.insert(dir.clone());
        self.root_dir = Some(dir);
        true
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// Walk the import graph depth-first from `root` and collect every directory
/// that belongs to a writable package.
///
/// - Packages that fail to resolve are skipped. Packages that resolve with
///   a load error are still watched, so fixing them is noticed.
/// - Read-only (standard library) packages are neither watched nor expanded.
/// - Each import path is visited at most once, so cycles terminate.
pub fn build_watch_set(resolver: &dyn PackageResolver, root: &str) -> WatchSet {
    let mut set = WatchSet::default();
    let mut stack = vec![root.to_string()];
    set.visited.insert(root.to_string());

    while let Some(import_path) = stack.pop() {
        let pkg = match resolver.resolve(&import_path) {
            Ok(pkg) => pkg,
            Err(err) => {
                debug!(import_path = %import_path, error = %err, "skipping unresolvable package");
                continue;
            }
        };

        if pkg.read_only {
            trace!(import_path = %import_path, "skipping read-only package");
            continue;
        }

        if let Some(err) = &pkg.error {
            debug!(import_path = %import_path, error = %err, "watching broken package");
        }

        if import_path == root {
            set.root_dir = Some(pkg.dir.clone());
        }
        set.dirs.insert(pkg.dir);

        // Push in reverse so imports are expanded in declaration order.
        for imp in pkg.imports.into_iter().rev() {
            if set.visited.insert(imp.clone()) {
                stack.push(imp);
            }
        }
    }

    debug!(root, dirs = set.dirs.len(), "built watch set");
    set
}

// src/resolve/mock.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{MAIN_PACKAGE, Package, PackageResolver};
use crate::errors::{RerunError, Result};

/// In-memory import graph.
///
/// Clones share the same graph, so a test can keep one clone and edit the
/// graph while the control loop resolves through another.
#[derive(Debug, Clone, Default)]
pub struct MockResolver {
    packages: Arc<Mutex<HashMap<String, Package>>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_package(&self, pkg: Package) {
        let mut packages = self.packages.lock().unwrap();
        packages.insert(pkg.import_path.clone(), pkg);
    }

    /// Add a regular library package.
    pub fn add_library(&self, import_path: &str, dir: impl AsRef<Path>, imports: &[&str]) {
        self.add_package(Package {
            import_path: import_path.to_string(),
            name: last_segment(import_path).to_string(),
            dir: dir.as_ref().to_path_buf(),
            imports: imports.iter().map(|s| s.to_string()).collect(),
            read_only: false,
            bin_dir: None,
            error: None,
        });
    }

    /// Add an executable (`package main`) installing into `bin_dir`.
    pub fn add_main(
        &self,
        import_path: &str,
        dir: impl AsRef<Path>,
        imports: &[&str],
        bin_dir: impl AsRef<Path>,
    ) {
        self.add_package(Package {
            import_path: import_path.to_string(),
            name: MAIN_PACKAGE.to_string(),
            dir: dir.as_ref().to_path_buf(),
            imports: imports.iter().map(|s| s.to_string()).collect(),
            read_only: false,
            bin_dir: Some(bin_dir.as_ref().to_path_buf()),
            error: None,
        });
    }

    /// Add a standard library package rooted under `/goroot/src`.
    pub fn add_std(&self, import_path: &str, imports: &[&str]) {
        self.add_package(Package {
            import_path: import_path.to_string(),
            name: last_segment(import_path).to_string(),
            dir: PathBuf::from("/goroot/src").join(import_path),
            imports: imports.iter().map(|s| s.to_string()).collect(),
            read_only: true,
            bin_dir: None,
            error: None,
        });
    }

    /// Add a package whose sources do not currently load.
    pub fn add_broken(&self, import_path: &str, dir: impl AsRef<Path>, error: &str) {
        self.add_package(Package {
            import_path: import_path.to_string(),
            name: String::new(),
            dir: dir.as_ref().to_path_buf(),
            imports: Vec::new(),
            read_only: false,
            bin_dir: None,
            error: Some(error.to_string()),
        });
    }

    /// Make `import_path` unresolvable.
    pub fn remove(&self, import_path: &str) {
        self.packages.lock().unwrap().remove(import_path);
    }

    /// Every import path passed to `resolve`, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl PackageResolver for MockResolver {
    fn resolve(&self, import_path: &str) -> Result<Package> {
        self.lookups.lock().unwrap().push(import_path.to_string());
        let packages = self.packages.lock().unwrap();
        packages
            .get(import_path)
            .cloned()
            .ok_or_else(|| RerunError::resolve(import_path, "cannot find package"))
    }
}

fn last_segment(import_path: &str) -> &str {
    import_path.rsplit('/').next().unwrap_or(import_path)
}

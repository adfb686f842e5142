// src/resolve/mod.rs

//! Package metadata resolution.
//!
//! Turns an import path into the directory holding its sources, the import
//! paths it depends on and whether it lives in the read-only standard
//! library. The watch set builder and the setup step only ever talk to the
//! [`PackageResolver`] trait, so tests can swap in [`mock::MockResolver`].

use std::fmt::Debug;
use std::path::PathBuf;

use crate::errors::Result;

pub mod go_list;
pub mod mock;

pub use go_list::GoListResolver;
pub use mock::MockResolver;

/// Name Go gives to packages that build into an executable.
pub const MAIN_PACKAGE: &str = "main";

/// Metadata for a single resolved package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub import_path: String,
    /// Declared package name (`main` for executables).
    pub name: String,
    pub dir: PathBuf,
    pub imports: Vec<String>,
    /// Standard library / GOROOT packages never change and are never watched.
    pub read_only: bool,
    /// Directory `go install` places the binary in, when known.
    pub bin_dir: Option<PathBuf>,
    /// Package-level load error (bad `package` clause, syntax error in the
    /// import block, ...). The directory is still known and still watched.
    pub error: Option<String>,
}

impl Package {
    pub fn is_executable(&self) -> bool {
        self.name == MAIN_PACKAGE
    }
}

/// Abstract package lookup.
pub trait PackageResolver: Send + Sync + Debug {
    fn resolve(&self, import_path: &str) -> Result<Package>;
}

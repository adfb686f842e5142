// src/engine/target.rs

use std::path::PathBuf;

use tracing::info;

use crate::config::Settings;
use crate::errors::{RerunError, Result};
use crate::resolve::PackageResolver;

/// The program under supervision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub import_path: String,
    /// Last segment of the resolved import path.
    pub bin_name: String,
    pub bin_path: PathBuf,
    pub args: Vec<String>,
}

/// Resolve the program described by `settings` into a [`BuildTarget`].
///
/// Fails if the package cannot be resolved, does not currently load, is not
/// `package main`, or has no known install directory and `GOBIN` is unset.
pub fn setup(resolver: &dyn PackageResolver, settings: &Settings) -> Result<BuildTarget> {
    info!(import_path = %settings.import_path, args = ?settings.args, "setting up");

    let pkg = resolver.resolve(&settings.import_path)?;

    if let Some(message) = pkg.error {
        return Err(RerunError::resolve(&settings.import_path, message));
    }

    if !pkg.is_executable() {
        return Err(RerunError::NotExecutable {
            import_path: settings.import_path.clone(),
            name: pkg.name,
        });
    }

    let bin_name = pkg
        .import_path
        .rsplit('/')
        .next()
        .unwrap_or(&pkg.import_path)
        .to_string();

    let bin_dir = settings
        .bin_dir_override
        .clone()
        .or(pkg.bin_dir)
        .ok_or_else(|| RerunError::NoInstallDir(settings.import_path.clone()))?;

    let bin_path = bin_dir.join(format!("{bin_name}{}", std::env::consts::EXE_SUFFIX));

    Ok(BuildTarget {
        import_path: settings.import_path.clone(),
        bin_name,
        bin_path,
        args: settings.args.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::MockResolver;

    fn exe(name: &str) -> String {
        format!("{name}{}", std::env::consts::EXE_SUFFIX)
    }

    #[test]
    fn binary_path_comes_from_package_metadata() {
        let resolver = MockResolver::new();
        resolver.add_main("ex.com/tools/server", "/src/server", &[], "/home/me/go/bin");

        let mut settings = Settings::new("ex.com/tools/server");
        settings.args = vec!["-port".into(), "8080".into()];

        let target = setup(&resolver, &settings).unwrap();
        assert_eq!(target.bin_name, "server");
        assert_eq!(target.bin_path, PathBuf::from("/home/me/go/bin").join(exe("server")));
        assert_eq!(target.args, vec!["-port", "8080"]);
    }

    #[test]
    fn gobin_overrides_package_metadata() {
        let resolver = MockResolver::new();
        resolver.add_main("ex.com/tools/server", "/src/server", &[], "/home/me/go/bin");

        let mut settings = Settings::new("ex.com/tools/server");
        settings.bin_dir_override = Some(PathBuf::from("/opt/bin"));

        let target = setup(&resolver, &settings).unwrap();
        assert_eq!(target.bin_path, PathBuf::from("/opt/bin").join(exe("server")));
    }

    #[test]
    fn library_package_is_not_runnable() {
        let resolver = MockResolver::new();
        resolver.add_library("ex.com/lib", "/src/lib", &[]);

        let err = setup(&resolver, &Settings::new("ex.com/lib")).unwrap_err();
        assert!(matches!(err, RerunError::NotExecutable { .. }));
    }

    #[test]
    fn package_with_load_error_fails_setup() {
        let resolver = MockResolver::new();
        resolver.add_broken("ex.com/app", "/src/app", "main.go:3:1: expected 'package'");

        let err = setup(&resolver, &Settings::new("ex.com/app")).unwrap_err();
        assert!(matches!(err, RerunError::Resolve { .. }));
        assert!(err.to_string().contains("expected 'package'"));
    }

    #[test]
    fn unresolvable_package_fails_setup() {
        let resolver = MockResolver::new();
        let err = setup(&resolver, &Settings::new("ex.com/nope")).unwrap_err();
        assert!(matches!(err, RerunError::Resolve { .. }));
    }
}

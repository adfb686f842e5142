// src/resolve/go_list.rs

//! [`PackageResolver`] backed by `go list -e -json`.
//!
//! `-e` makes `go list` report broken packages instead of failing outright,
//! so a package whose sources are mid-edit still yields its directory.

use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::errors::{RerunError, Result};
use crate::resolve::{Package, PackageResolver};

/// Subset of the JSON object printed by `go list -json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GoListPackage {
    import_path: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    dir: Option<PathBuf>,
    #[serde(default)]
    goroot: bool,
    #[serde(default)]
    standard: bool,
    #[serde(default)]
    imports: Vec<String>,
    #[serde(default)]
    target: Option<PathBuf>,
    #[serde(default)]
    error: Option<GoListError>,
    #[serde(default)]
    deps_errors: Vec<GoListError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GoListError {
    err: String,
}

/// Resolves packages by shelling out to the go toolchain.
#[derive(Debug, Clone)]
pub struct GoListResolver {
    go_command: PathBuf,
}

impl GoListResolver {
    pub fn new(go_command: impl Into<PathBuf>) -> Self {
        Self {
            go_command: go_command.into(),
        }
    }

    pub fn list_args(import_path: &str) -> [&str; 4] {
        ["list", "-e", "-json", import_path]
    }
}

impl PackageResolver for GoListResolver {
    fn resolve(&self, import_path: &str) -> Result<Package> {
        let output = Command::new(&self.go_command)
            .args(Self::list_args(import_path))
            .output()
            .map_err(|e| {
                RerunError::resolve(
                    import_path,
                    format!("running {}: {e}", self.go_command.display()),
                )
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        // A non-zero exit still carries the package object when the package
        // itself is broken; only a missing object is a lookup failure.
        if stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("go list exited with {}", output.status),
                s => s.to_string(),
            };
            return Err(RerunError::resolve(import_path, message));
        }

        trace!(import_path, status = %output.status, "go list output: {}", stdout);
        parse_go_list_output(import_path, &stdout)
    }
}

/// Parse the JSON printed by `go list -e -json <import_path>`.
pub fn parse_go_list_output(import_path: &str, json: &str) -> Result<Package> {
    let raw: GoListPackage = serde_json::from_str(json)?;

    for dep in &raw.deps_errors {
        debug!(import_path, error = %dep.err, "dependency error");
    }

    let error = raw.error.map(|e| e.err);

    let Some(dir) = raw.dir else {
        let message = error.unwrap_or_else(|| "go list reported no directory".to_string());
        return Err(RerunError::resolve(import_path, message));
    };

    let bin_dir = raw
        .target
        .as_deref()
        .and_then(|t| t.parent())
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf());

    Ok(Package {
        import_path: raw.import_path,
        name: raw.name,
        dir,
        imports: raw.imports,
        read_only: raw.goroot || raw.standard,
        bin_dir,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_main_package() {
        let json = r#"{
            "Dir": "/home/me/src/example.com/app/cmd/server",
            "ImportPath": "example.com/app/cmd/server",
            "Name": "main",
            "Target": "/home/me/go/bin/server",
            "Imports": ["example.com/app/internal/db", "fmt", "net/http"]
        }"#;

        let pkg = parse_go_list_output("example.com/app/cmd/server", json).unwrap();

        assert!(pkg.is_executable());
        assert!(!pkg.read_only);
        assert_eq!(pkg.dir, PathBuf::from("/home/me/src/example.com/app/cmd/server"));
        assert_eq!(pkg.bin_dir, Some(PathBuf::from("/home/me/go/bin")));
        assert_eq!(pkg.imports.len(), 3);
        assert_eq!(pkg.error, None);
    }

    #[test]
    fn standard_library_is_read_only() {
        let json = r#"{
            "Dir": "/usr/local/go/src/fmt",
            "ImportPath": "fmt",
            "Name": "fmt",
            "Goroot": true,
            "Standard": true,
            "Imports": ["errors", "io"]
        }"#;

        let pkg = parse_go_list_output("fmt", json).unwrap();
        assert!(pkg.read_only);
        assert!(!pkg.is_executable());
        assert_eq!(pkg.bin_dir, None);
    }

    #[test]
    fn broken_package_keeps_its_dir() {
        let json = r#"{
            "Dir": "/home/me/src/example.com/app",
            "ImportPath": "example.com/app",
            "Error": {
                "ImportStack": ["example.com/app"],
                "Pos": "main.go:3:1",
                "Err": "main.go:3:1: expected 'package', found 'EOF'"
            },
            "DepsErrors": [
                { "ImportStack": ["example.com/app", "example.com/missing"], "Err": "no required module provides package example.com/missing" }
            ]
        }"#;

        let pkg = parse_go_list_output("example.com/app", json).unwrap();
        assert_eq!(pkg.dir, PathBuf::from("/home/me/src/example.com/app"));
        assert!(!pkg.is_executable());
        assert_eq!(
            pkg.error.as_deref(),
            Some("main.go:3:1: expected 'package', found 'EOF'")
        );
    }

    #[test]
    fn missing_dir_is_a_resolve_error() {
        let json = r#"{ "ImportPath": "example.com/gone", "Name": "" }"#;
        let err = parse_go_list_output("example.com/gone", json).unwrap_err();
        assert!(matches!(err, RerunError::Resolve { .. }));
    }

    #[test]
    fn missing_dir_reports_the_package_error() {
        let json = r#"{
            "ImportPath": "example.com/gone",
            "Error": { "Err": "cannot find module providing package example.com/gone" }
        }"#;
        let err = parse_go_list_output("example.com/gone", json).unwrap_err();
        assert!(err.to_string().contains("cannot find module"));
    }

    #[test]
    fn lists_with_error_reporting() {
        assert_eq!(
            GoListResolver::list_args("example.com/app"),
            ["list", "-e", "-json", "example.com/app"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_with_package_object_still_resolves() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let go = tmp.path().join("go");
        std::fs::write(
            &go,
            r#"#!/bin/sh
echo '{"Dir": "/src/app", "ImportPath": "ex.com/app", "Error": {"Err": "main.go:3:1: expected package"}}'
exit 1
"#,
        )
        .unwrap();
        std::fs::set_permissions(&go, std::fs::Permissions::from_mode(0o755)).unwrap();

        let pkg = GoListResolver::new(&go).resolve("ex.com/app").unwrap();
        assert_eq!(pkg.dir, PathBuf::from("/src/app"));
        assert!(pkg.error.is_some());
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_without_output_is_a_resolve_error() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let go = tmp.path().join("go");
        std::fs::write(&go, "#!/bin/sh\necho 'cannot find package' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&go, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = GoListResolver::new(&go).resolve("ex.com/app").unwrap_err();
        assert!(err.to_string().contains("cannot find package"));
    }
}

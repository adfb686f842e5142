// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::cli::CliArgs;
use crate::config::model::{DEFAULT_GRACE_PERIOD, DEFAULT_SOURCE_EXTENSION, RawConfigFile, Settings};
use crate::config::validate::{normalize_extension, parse_duration, validate_settings};

/// Environment variable naming the directory that holds installed binaries.
pub const BIN_DIR_ENV: &str = "GOBIN";

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: RawConfigFile = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    Ok(config)
}

/// Load the config file named on the command line, or the default one if it
/// exists. An explicitly named file must exist; the default is optional.
pub fn load_config_file(explicit: Option<&str>) -> Result<RawConfigFile> {
    match explicit {
        Some(path) => load_from_path(path),
        None => {
            let path = default_config_path();
            if path.is_file() {
                load_from_path(&path)
            } else {
                Ok(RawConfigFile::default())
            }
        }
    }
}

/// Merge CLI args, config file and the `GOBIN` value into [`Settings`] and
/// validate the result.
pub fn build_settings(
    args: &CliArgs,
    file: RawConfigFile,
    bin_dir_override: Option<String>,
) -> Result<Settings> {
    let section = file.config;

    let grace_period = match args.grace_period.as_deref().or(section.grace_period.as_deref()) {
        Some(s) => parse_duration(s)
            .map_err(|e| anyhow!(e))
            .context("invalid grace period")?,
        None => DEFAULT_GRACE_PERIOD,
    };

    let source_extension = section
        .extension
        .as_deref()
        .map(normalize_extension)
        .unwrap_or_else(|| DEFAULT_SOURCE_EXTENSION.to_string());

    let go_command = args
        .go_command
        .clone()
        .or(section.go)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("go"));

    let settings = Settings {
        import_path: args.import_path.clone(),
        args: args.args.clone(),
        run_tests: args.test || section.test,
        release_build: args.build || section.build,
        never_run: args.no_run || section.no_run,
        race: args.race || section.race,
        go_command,
        grace_period,
        source_extension,
        exclude: section.exclude,
        bin_dir_override: bin_dir_override
            .filter(|s| !s.is_empty())
            .map(PathBuf::from),
    };

    validate_settings(&settings)?;
    Ok(settings)
}

/// Recommended entry point: read the config file and the environment once
/// and produce validated [`Settings`].
pub fn load_settings(args: &CliArgs) -> Result<Settings> {
    let file = load_config_file(args.config.as_deref())?;
    build_settings(args, file, std::env::var(BIN_DIR_ENV).ok())
}

/// Default config file location: `Rerun.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Rerun.toml")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::*;

    fn args(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn file_booleans_are_ored_with_flags() {
        let file: RawConfigFile = toml::from_str(
            r#"
            [config]
            test = true
            exclude = ["*_test.go"]
            "#,
        )
        .unwrap();

        let settings = build_settings(&args(&["rerun", "--race", "example.com/app"]), file, None).unwrap();

        assert!(settings.run_tests);
        assert!(settings.race);
        assert!(!settings.release_build);
        assert_eq!(settings.exclude, vec!["*_test.go"]);
        assert_eq!(settings.grace_period, DEFAULT_GRACE_PERIOD);
    }

    #[test]
    fn cli_values_override_file_values() {
        let file: RawConfigFile = toml::from_str(
            r#"
            [config]
            go = "/opt/go/bin/go"
            grace_period = "10s"
            extension = ".go"
            "#,
        )
        .unwrap();

        let settings = build_settings(
            &args(&["rerun", "--grace-period", "300ms", "example.com/app"]),
            file,
            Some("/home/me/bin".to_string()),
        )
        .unwrap();

        assert_eq!(settings.grace_period, Duration::from_millis(300));
        assert_eq!(settings.go_command, PathBuf::from("/opt/go/bin/go"));
        assert_eq!(settings.source_extension, "go");
        assert_eq!(settings.bin_dir_override, Some(PathBuf::from("/home/me/bin")));
    }

    #[test]
    fn empty_gobin_is_ignored() {
        let settings = build_settings(
            &args(&["rerun", "example.com/app"]),
            RawConfigFile::default(),
            Some(String::new()),
        )
        .unwrap();
        assert_eq!(settings.bin_dir_override, None);
    }

    #[test]
    fn bad_grace_period_is_an_error() {
        let res = build_settings(
            &args(&["rerun", "--grace-period", "soon", "example.com/app"]),
            RawConfigFile::default(),
            None,
        );
        assert!(res.is_err());
    }
}

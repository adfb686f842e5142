#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use rerun::config::Settings;

/// Builder for `Settings` to simplify test setup.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new(import_path: &str) -> Self {
        Self {
            settings: Settings::new(import_path),
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.settings.args.push(arg.to_string());
        self
    }

    pub fn test(mut self, val: bool) -> Self {
        self.settings.run_tests = val;
        self
    }

    pub fn build(mut self, val: bool) -> Self {
        self.settings.release_build = val;
        self
    }

    pub fn no_run(mut self, val: bool) -> Self {
        self.settings.never_run = val;
        self
    }

    pub fn race(mut self, val: bool) -> Self {
        self.settings.race = val;
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.settings.exclude.push(pattern.to_string());
        self
    }

    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.settings.grace_period = grace;
        self
    }

    pub fn bin_dir_override(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.bin_dir_override = Some(dir.into());
        self
    }

    pub fn finish(self) -> Settings {
        self.settings
    }
}

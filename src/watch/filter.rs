// src/watch/filter.rs

//! Decides which filesystem events count as a source change.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use notify::{Event, EventKind};

use crate::config::Settings;

/// Only paths with the source extension, and not matching any exclude glob,
/// are relevant. Directory touches, temp files and editor droppings are
/// noise.
#[derive(Clone)]
pub struct ChangeFilter {
    extension: String,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for ChangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFilter")
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

impl ChangeFilter {
    pub fn new(extension: impl Into<String>, exclude: &[String]) -> Result<Self> {
        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building exclude globset")?)
        };

        Ok(Self {
            extension: extension.into(),
            exclude,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.source_extension.clone(), &settings.exclude)
    }

    /// True if `path` is a source file we care about.
    pub fn is_relevant_path(&self, path: &Path) -> bool {
        let ext_matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == self.extension);
        if !ext_matches {
            return false;
        }

        match (&self.exclude, path.file_name()) {
            (Some(exclude), Some(name)) => !exclude.is_match(name),
            _ => true,
        }
    }

    /// Returns the first relevant path of `event`, if any.
    ///
    /// Access events (open/close/read) never count.
    pub fn relevant_path<'a>(&self, event: &'a Event) -> Option<&'a Path> {
        if matches!(event.kind, EventKind::Access(_)) {
            return None;
        }
        event
            .paths
            .iter()
            .map(|p| p.as_path())
            .find(|p| self.is_relevant_path(p))
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

// src/config/mod.rs

//! Configuration for rerun.
//!
//! Responsibilities:
//! - Define the optional TOML file model and the immutable [`Settings`]
//!   (`model.rs`).
//! - Load the file and merge it with CLI flags and the environment
//!   (`loader.rs`).
//! - Validate the merged settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{build_settings, load_config_file, load_from_path, load_settings};
pub use model::{ConfigSection, RawConfigFile, Settings};
pub use validate::{parse_duration, validate_settings};

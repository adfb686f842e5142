// src/engine/mod.rs

//! Orchestration.
//!
//! - [`target`] turns settings + package metadata into the [`BuildTarget`].
//! - [`control_loop`] drives setup, the build pipeline, the watcher and the
//!   supervisor.

pub mod control_loop;
pub mod target;

pub use control_loop::{ControlLoop, SupervisorFactory};
pub use target::{BuildTarget, setup};

// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `PipelineBackend` trait and the production
//!   `GoToolchain` backend; tests replace it with a fake.
//! - [`pipeline`] sequences install → test → build for one cycle.
//! - [`supervisor`] owns the single running instance of the program.

pub mod backend;
pub mod pipeline;
pub mod supervisor;

pub use backend::{GoToolchain, PipelineBackend, Stage, StageResult};
pub use pipeline::{planned_stages, run_pipeline};
pub use supervisor::{SupervisorHandle, SupervisorSignal, spawn_supervisor};

// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Walking the import graph into the set of directories to watch
//!   (`watch_set`).
//! - Deciding which filesystem events are source changes (`filter`).
//! - Wrapping a single-use `notify` watcher that is discarded and rebuilt
//!   after every relevant change (`watcher`).
//!
//! It does **not** know about the build pipeline or the running program.

pub mod filter;
pub mod watch_set;
pub mod watcher;

pub use filter::ChangeFilter;
pub use watch_set::{WatchSet, build_watch_set};
pub use watcher::ChangeWatcher;

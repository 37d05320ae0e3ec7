//! EnderaLib support library
//!
//! Configuration lifecycle for plugins: typed YAML documents that are
//! validated, repaired against defaults, and written back with comments.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;

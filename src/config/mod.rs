//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: the top-level `Config` and its loader
//! - [`manager`]: library-facing manager options (`ManagerConfig`)
//! - [`daemon`]: sections only the `metricd` binary reads (poll, log, sources)
//! - [`validation`]: startup checks

mod daemon;
mod defaults;
mod manager;
mod types;
mod validation;

pub use daemon::{LogConfig, LogFormat, PollConfig, SourcesConfig};
pub use manager::ManagerConfig;
pub use types::{Config, ConfigError};
pub use validation::{ValidationError, validate};

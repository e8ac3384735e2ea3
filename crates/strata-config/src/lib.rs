//! Configuration for strata world generation.
//!
//! Settings persist to disk as `config.ron`, can be overridden from the
//! command line, and are validated before any voxel work starts.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, MeshingConfig, WorldConfig, default_config_dir};
pub use error::ConfigError;

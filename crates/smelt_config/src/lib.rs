//! Parsing and validation of compilation configuration and project files.
//!
//! This crate reads the compilation configuration (addons, addons directory,
//! and named targets) and the project file (base compiler options and root
//! files), and resolves which targets are valid and what options each one
//! compiles with.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    load_config_from_str, load_project_from_str, ConfigFormat, DEFAULT_CONFIG_FILE,
    DEFAULT_PROJECT_FILE,
};
pub use resolve::{
    has_invalid_targets, invalid_targets_message, merge_options, partition_targets,
    resolve_target, target_config, ResolvedTarget, TargetPartition,
};
pub use types::*;

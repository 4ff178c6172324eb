//! Configuration file parsing and validation.
//!
//! Reading bytes from disk is left to the caller's filesystem abstraction;
//! these functions only turn file content into validated configuration.

use crate::error::ConfigError;
use crate::types::{CompilationConfig, ProjectConfig};
use serde::de::DeserializeOwned;
use std::path::Path;

/// File name of the compilation configuration looked up when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "smelt.config.json";

/// File name of the project file looked up when none is given.
pub const DEFAULT_PROJECT_FILE: &str = "smelt.project.json";

/// The syntax a configuration file is written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON, the default.
    Json,
    /// TOML, selected by a `.toml` extension.
    Toml,
}

impl ConfigFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Parses and validates a compilation configuration read from `path`.
///
/// The path selects the syntax and is recorded as the config file path,
/// from which the project directory and addons directory are later derived.
pub fn load_config_from_str(content: &str, path: &Path) -> Result<CompilationConfig, ConfigError> {
    let mut config: CompilationConfig = parse(content, ConfigFormat::from_path(path))?;
    validate_config(&config)?;
    config.config_file_path = Some(path.to_path_buf());
    Ok(config)
}

/// Parses a project file read from `path`.
pub fn load_project_from_str(content: &str, path: &Path) -> Result<ProjectConfig, ConfigError> {
    let mut project: ProjectConfig = parse(content, ConfigFormat::from_path(path))?;
    project.config_file_path = Some(path.to_path_buf());
    Ok(project)
}

fn parse<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> Result<T, ConfigError> {
    // An empty file is an empty configuration.
    if content.trim().is_empty() {
        return parse("{}", ConfigFormat::Json);
    }
    match format {
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
        }
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
        }
    }
}

/// Rejects names that could never be requested from the command line.
fn validate_config(config: &CompilationConfig) -> Result<(), ConfigError> {
    if config.targets.keys().any(|name| name.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "target name must not be empty".to_string(),
        ));
    }
    // Target names become directories under the build dir.
    if let Some(name) = config.targets.keys().find(|name| !is_plain_dir_name(name)) {
        return Err(ConfigError::ValidationError(format!(
            "target name \"{name}\" must not contain path separators or be '.' or '..'"
        )));
    }
    let target_addons = config.targets.values().flat_map(|t| t.addons.iter());
    if config
        .addons
        .iter()
        .chain(target_addons)
        .any(|name| name.is_empty() || name.contains(','))
    {
        return Err(ConfigError::ValidationError(
            "addon names must be non-empty and must not contain ','".to_string(),
        ));
    }
    Ok(())
}

fn is_plain_dir_name(name: &str) -> bool {
    !name.contains(['/', '\\']) && name != "." && name != ".."
}

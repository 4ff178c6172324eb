//! Configuration types deserialized from compilation config and project files.

use indexmap::IndexMap;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Free-form compiler options, keyed by option name.
///
/// The pipeline never interprets these; they are merged per target and
/// handed to addons and the language service untouched.
pub type CompilerOptionMap = BTreeMap<String, serde_json::Value>;

/// The compilation configuration, usually read from `smelt.config.json`.
///
/// ```json
/// {
///   "addons": ["banner"],
///   "addonsDir": "./addons",
///   "targets": { "web": { "addons": ["minify"], "writeFile": true } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationConfig {
    /// Addon names requested for every target.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub addons: Vec<String>,
    /// Directory addons are discovered in, relative to the config file.
    #[serde(default, alias = "addons_dir")]
    pub addons_dir: Option<String>,
    /// Named target configurations, in declaration order.
    #[serde(default)]
    pub targets: IndexMap<String, TargetConfig>,
    /// The file this configuration was read from, if any.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

impl CompilationConfig {
    /// Returns the configured target names in declaration order.
    pub fn target_names(&self) -> Vec<String> {
        self.targets.keys().cloned().collect()
    }

    /// Returns the directory containing the config file, if it was read from one.
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_file_path.as_deref().and_then(Path::parent)
    }
}

/// Configuration for one named target.
///
/// Every key other than `addons` and `writeFile` is a compiler-option
/// override that wins over the project's base options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfig {
    /// Addon names requested for this target only.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub addons: Vec<String>,
    /// Whether this target writes its output to disk.
    #[serde(default, alias = "write_file")]
    pub write_file: bool,
    /// Compiler-option overrides for this target.
    #[serde(flatten)]
    pub options: CompilerOptionMap,
}

/// The project file, holding base compiler options and the root file list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Base compiler options shared by every target.
    #[serde(default, alias = "compiler_options")]
    pub compiler_options: CompilerOptionMap,
    /// Root source files, relative to the project file.
    #[serde(default)]
    pub files: Vec<String>,
    /// The file this project was read from, if any.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

impl ProjectConfig {
    /// Returns the root files resolved against the project file's directory.
    pub fn file_names(&self) -> Vec<PathBuf> {
        let base = self
            .config_file_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new(""));
        self.files.iter().map(|f| base.join(f)).collect()
    }
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Accepts `"addons": "zip, zap"` (a comma-separated string) as well as
/// `"addons": ["zip", "zap"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(smelt_common::split_names(v))
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val.trim().to_string());
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

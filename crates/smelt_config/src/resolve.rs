//! Target resolution: validating requested targets and merging per-target options.

use crate::types::{CompilationConfig, CompilerOptionMap, TargetConfig};
use smelt_common::{join_names, WILDCARD_TARGET};

/// Returns `true` if any requested target is neither `"*"` nor declared in the config.
///
/// Without a config there is nothing to validate against, so any non-empty
/// request is invalid. An empty request is always valid: it defaults to
/// `["*"]` elsewhere.
pub fn has_invalid_targets<S: AsRef<str>>(requested: &[S], config: Option<&CompilationConfig>) -> bool {
    match config {
        None => !requested.is_empty(),
        Some(config) => requested.iter().map(AsRef::as_ref).any(|name| {
            name != WILDCARD_TARGET && !config.targets.contains_key(name)
        }),
    }
}

/// The warning emitted for an invalid target list.
///
/// Names the full requested list, not only the invalid entries.
pub fn invalid_targets_message<S: AsRef<str>>(requested: &[S]) -> String {
    format!(
        "Custom target configuration \"{}\" found, but no target provided.\n\tSome custom addons may not be applied during compilation.",
        join_names(requested)
    )
}

/// Returns the target's configuration, or the empty default for undeclared
/// targets (including `"*"` unless it is declared explicitly).
pub fn target_config(config: Option<&CompilationConfig>, target: &str) -> TargetConfig {
    config
        .and_then(|c| c.targets.get(target))
        .cloned()
        .unwrap_or_default()
}

/// Overlays `overrides` on `base`; the override wins on conflicting keys.
pub fn merge_options(base: &CompilerOptionMap, overrides: &CompilerOptionMap) -> CompilerOptionMap {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// A target with its configuration and fully merged compiler options.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    /// The target name.
    pub name: String,
    /// Base project options overlaid with the target's overrides.
    pub options: CompilerOptionMap,
    /// The target's raw configuration.
    pub config: TargetConfig,
}

/// Resolves a named target by merging the project options with its overrides.
pub fn resolve_target(
    project: &CompilerOptionMap,
    config: Option<&CompilationConfig>,
    target: &str,
) -> ResolvedTarget {
    let target_config = target_config(config, target);
    ResolvedTarget {
        name: target.to_string(),
        options: merge_options(project, &target_config.options),
        config: target_config,
    }
}

/// Active targets split by whether they write their output to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetPartition {
    /// Targets with `writeFile: true`, in target-list order.
    pub writing: Vec<String>,
    /// Targets without `writeFile`, in target-list order.
    pub non_writing: Vec<String>,
}

/// Partitions `targets` into writing and non-writing targets, keeping order.
pub fn partition_targets<S: AsRef<str>>(targets: &[S], config: Option<&CompilationConfig>) -> TargetPartition {
    let mut partition = TargetPartition::default();
    for name in targets.iter().map(AsRef::as_ref) {
        if target_config(config, name).write_file {
            partition.writing.push(name.to_string());
        } else {
            partition.non_writing.push(name.to_string());
        }
    }
    partition
}

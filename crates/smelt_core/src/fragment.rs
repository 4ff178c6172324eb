//! Picking the single target whose pipeline produces in-memory fragments.

use crate::error::CompilerError;
use smelt_common::WILDCARD_TARGET;
use smelt_config::{partition_targets, CompilationConfig};
use smelt_diagnostics::{Diagnostic, DiagnosticCode, Reporter};

/// Selects the target a loader-driven compiler emits through.
///
/// Non-writing targets are preferred: the requested one if it is among them,
/// else the first in `targets` order. Every other non-writing target is
/// reported as unused. Without non-writing targets the first writing target
/// is used when `requested` names one of them or is `"*"`; any other request
/// fails with [`CompilerError::NoTargetFound`].
pub fn select_fragment_target(
    requested: &str,
    targets: &[String],
    config: Option<&CompilationConfig>,
    reporter: &dyn Reporter,
) -> Result<String, CompilerError> {
    let partition = partition_targets(targets, config);

    if partition.non_writing.is_empty() {
        reporter.report_diagnostic(Diagnostic::warning(
            DiagnosticCode::NO_FRAGMENT_TARGETS,
            format!("No writeFile: false targets found for \"{requested}\""),
        ));

        if requested == WILDCARD_TARGET || partition.writing.iter().any(|t| t == requested) {
            let target = partition
                .writing
                .first()
                .cloned()
                .unwrap_or_else(|| requested.to_string());
            return Ok(target);
        }

        let err = CompilerError::NoTargetFound(requested.to_string());
        reporter.report_diagnostic(Diagnostic::error(DiagnosticCode::NO_TARGET_FOUND, err.to_string()));
        return Err(err);
    }

    let selected = if partition.non_writing.iter().any(|t| t == requested) {
        requested.to_string()
    } else {
        partition.non_writing[0].clone()
    };

    for unused in partition.non_writing.iter().filter(|t| **t != selected) {
        reporter.report_diagnostic(Diagnostic::warning(
            DiagnosticCode::UNUSED_TARGET,
            format!("Target \"{unused}\" is not used by the plugin."),
        ));
    }

    tracing::debug!(requested, selected = %selected, "fragment target selected");
    Ok(selected)
}

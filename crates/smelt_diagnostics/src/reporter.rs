//! The reporting seam every pipeline component writes diagnostics through.

use crate::diagnostic::Diagnostic;

/// Receives warnings and errors produced while resolving targets, loading
/// addons and emitting files.
///
/// Implementations must be shareable across contexts: one reporter instance is
/// handed to every target's compilation context.
pub trait Reporter: Send + Sync {
    /// Reports a single diagnostic.
    fn report_diagnostic(&self, diag: Diagnostic);
}

/// A reporter that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoReporter;

impl Reporter for NoReporter {
    fn report_diagnostic(&self, _diag: Diagnostic) {}
}

//! Diagnostic creation, severity management, and reporting.
//!
//! This crate provides structured [`Diagnostic`] messages with severity levels
//! and stable codes, the [`Reporter`] trait every pipeline component reports
//! through, the thread-safe [`DiagnosticSink`] that accumulates diagnostics,
//! and a [`TerminalRenderer`] for human-readable output.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod reporter;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use reporter::{NoReporter, Reporter};
pub use severity::Severity;
pub use sink::DiagnosticSink;

//! Error types for addon hooks and compiler construction and invocation.

/// An error raised by an addon, either while activating or from one of the
/// generators or processors it registered.
#[derive(Debug, thiserror::Error)]
pub enum AddonError {
    /// The addon reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The addon's manifest could not be parsed or is inconsistent.
    #[error("invalid addon manifest: {0}")]
    Manifest(String),

    /// An I/O failure inside a hook.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AddonError {
    /// Creates a failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        AddonError::Failed(message.into())
    }
}

/// Fatal errors of compiler construction and per-file invocation.
///
/// Configuration problems are not errors: they are reported as warnings and
/// the pipeline runs degraded.
#[derive(Debug, thiserror::Error)]
pub enum CompilerError {
    /// More than one target was requested for a single-target compiler.
    #[error("Multiple targets are not supported.")]
    MultipleTargets,

    /// Fragment selection found no usable target.
    #[error("No target found for \"{0}\"")]
    NoTargetFound(String),

    /// `build` was called while a different system than the compiler's own is bound.
    #[error("LiteCompiler::build() not called with the compiler's system as the active system")]
    InactiveSystem,

    /// A generator or processor failed; passed through unmodified.
    #[error(transparent)]
    Addon(#[from] AddonError),
}

//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The file content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected value at line 1 column 3".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse configuration: expected value at line 1 column 3"
        );
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("target name must not be empty".to_string());
        assert_eq!(
            format!("{err}"),
            "validation error: target name must not be empty"
        );
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::from(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}

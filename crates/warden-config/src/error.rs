//! Configuration error types.

/// Errors from loading or validating a backend configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ReadError {
        /// Path of the file that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or carries invalid values.
    #[error("failed to parse config {path}: {source}")]
    ParseError {
        /// Path of the file that failed.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A field failed semantic validation.
    #[error("invalid config value for {field}: {message}")]
    ValidationError {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

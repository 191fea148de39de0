//! Error types for the Foobar Factory binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the run so
//! `main` can attach context and hand it to `anyhow`.

/// Top-level error for the Foobar Factory binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: foobar_core::config::ConfigError,
    },

    /// The round loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: foobar_core::runner::RunnerError,
    },

    /// The run log file could not be created.
    #[error("cannot create log file {}: {source}", path.display())]
    LogFile {
        /// The file or directory concerned.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Writing to the terminal failed.
    #[error("terminal error: {source}")]
    Terminal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

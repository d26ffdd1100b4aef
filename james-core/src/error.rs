//! Error types for the James core

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Boxed error raised by a job implementation
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building, loading or saving a pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A job could not be constructed from its configuration fragment
    #[error("failed to load job '{name}'")]
    JobImport {
        /// Name of the offending job
        name: String,
        /// Error reported by the job implementation
        #[source]
        source: BoxError,
    },

    /// The configuration is valid YAML but misses a required key or has a
    /// value of the wrong type
    #[error("malformed pipeline configuration: {0}")]
    Structure(String),

    /// The configuration file is not parseable
    #[error("failed to parse pipeline configuration: {0}")]
    Syntax(#[from] serde_yaml::Error),

    /// The configuration could not be written out
    #[error("failed to serialize pipeline configuration: {0}")]
    Serialize(serde_yaml::Error),

    /// Other processes kept winning the race for the next ID
    #[error("other processes block ID assignment ({attempts} attempts)")]
    Contention {
        /// Number of reservation attempts made
        attempts: u32,
    },

    /// The project directory holds something that is not a pipeline
    #[error("unexpected entry '{entry}' in project directory {}", .dir.display())]
    InvalidLayout {
        /// The project directory
        dir: PathBuf,
        /// Name of the entry that is not a pipeline ID
        entry: String,
    },

    /// Underlying storage failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Create a structural error from any message
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure(message.into())
    }

    /// Wrap a job error together with the job's name
    pub fn job_import(name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::JobImport {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Check if this error is caused by ID allocation contention
    ///
    /// Callers may retry the whole operation later or report that the
    /// project is busy.
    pub fn is_contention(&self) -> bool {
        matches!(self, Self::Contention { .. })
    }

    /// Check if this error is a missing or malformed key
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structure(_))
    }
}

/// Errors raised while importing a single job
#[derive(Debug, Error)]
pub enum JobError {
    /// Required key missing or value of the wrong type
    #[error("{0}")]
    Structure(String),
}

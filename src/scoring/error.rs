use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoreError>;

/// Failures raised by the scoring engine. All of them mean bad input; none
/// are retried.
#[derive(Error, Debug)]
pub enum ScoreError {
    /// Malformed JSON or CSV input.
    #[error("format error in {location}: {message}")]
    Format { location: String, message: String },

    /// A referenced file or path does not exist.
    #[error("not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Gold data violates the annotation schema.
    #[error("schema error: {0}")]
    Schema(String),

    /// A record lacks a key the current operation needs.
    #[error("record {record} is missing field `{field}`")]
    MissingField { record: String, field: String },

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScoreError {
    pub fn format(location: impl Into<String>, message: impl ToString) -> Self {
        Self::Format {
            location: location.into(),
            message: message.to_string(),
        }
    }

    pub fn missing_field(record: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            record: record.into(),
            field: field.into(),
        }
    }

    /// Maps an io failure on `path`. A missing file becomes `NotFound` and
    /// undecodable text becomes `Format`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::InvalidData => Self::format(path.display().to_string(), source),
            _ => Self::Io { path, source },
        }
    }

    /// Stable label a presentation layer can key user-facing messages on.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Format { .. } => "format_error",
            Self::NotFound { .. } => "not_found",
            Self::Schema(_) => "schema_error",
            Self::MissingField { .. } => "missing_field",
            Self::Io { .. } => "io_error",
        }
    }
}

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("Store error: {0}")]
    StoreError(String),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type DeskResult<T> = Result<T, DeskError>;

/// Longest error line printed to a terminal, in characters.
pub const SUMMARY_LIMIT: usize = 400;

impl DeskError {
    /// HTTP status a transport layer should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            DeskError::ValidationError(_) => 400,
            DeskError::NotFound(_) => 404,
            DeskError::IoError(_)
            | DeskError::SerdeError(_)
            | DeskError::StoreError(_)
            | DeskError::ConfigError(_) => 500,
        }
    }

    /// Stable machine-readable kind, used in CLI error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            DeskError::IoError(_) => "io",
            DeskError::SerdeError(_) => "serde",
            DeskError::StoreError(_) => "store",
            DeskError::ConfigError(_) => "config",
            DeskError::ValidationError(_) => "validation",
            DeskError::NotFound(_) => "not_found",
        }
    }

    /// `[kind] message` on one line. Embedded newlines (e.g. from serde
    /// positions or io detail) are collapsed and the text is cut at
    /// [`SUMMARY_LIMIT`] characters.
    pub fn summary(&self) -> String {
        let message = self.to_string().split_whitespace().collect::<Vec<_>>().join(" ");
        let mut line = format!("[{}] {}", self.kind(), message);
        if let Some((cut, _)) = line.char_indices().nth(SUMMARY_LIMIT) {
            line.truncate(cut);
            line.push_str("...");
        }
        line
    }
}

/// Shorthand for the "missing required field" family of validation errors.
pub fn required(field: &str) -> DeskError {
    DeskError::ValidationError(format!("{} is required", field))
}

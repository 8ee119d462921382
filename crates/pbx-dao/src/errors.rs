//! Error types for the PBX data-access layer.

use std::fmt;

/// Top-level error enum for the data-access layer.
#[derive(Debug, thiserror::Error)]
pub enum DaoError {
    /// The caller asked for a column, sort key or parameter that does not exist.
    #[error("Input Error - {message}")]
    Input { message: String },

    /// A lookup that required exactly one row found none.
    #[error("Resource Not Found - {resource} is not found ({criteria})")]
    NotFound { resource: String, criteria: String },

    /// The operation would break a cross-field invariant the schema cannot express.
    #[error("Resource Error - {resource}: {message}")]
    Resource { resource: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DaoResult<T> = Result<T, DaoError>;

impl DaoError {
    pub fn input(message: impl Into<String>) -> Self {
        DaoError::Input {
            message: message.into(),
        }
    }

    /// Input error naming every unknown key, in the order they were given.
    pub fn unknown_keys<S: AsRef<str>>(resource: &str, keys: &[S]) -> Self {
        let names: Vec<&str> = keys.iter().map(|k| k.as_ref()).collect();
        DaoError::input(format!(
            "unknown field(s) for {resource}: {}",
            names.join(", ")
        ))
    }

    pub fn not_found(resource: &str, criteria: impl fmt::Display) -> Self {
        DaoError::NotFound {
            resource: resource.to_string(),
            criteria: criteria.to_string(),
        }
    }

    pub fn resource(resource: &str, message: impl Into<String>) -> Self {
        DaoError::Resource {
            resource: resource.to_string(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DaoError::NotFound { .. })
    }

    pub fn is_input(&self) -> bool {
        matches!(self, DaoError::Input { .. })
    }

    pub fn is_resource(&self) -> bool {
        matches!(self, DaoError::Resource { .. })
    }
}

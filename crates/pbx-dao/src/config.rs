//! Runtime configuration for the data-access layer.
//!
//! Values come from a JSON file or from `PBX_DAO_*` environment variables,
//! falling back to the defaults below.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{DaoError, DaoResult};

pub const DEFAULT_DB_PATH: &str = "~/.pbx-dao/pbx.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Connection and query settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DaoConfig {
    pub db_path: PathBuf,
    pub busy_timeout_ms: u64,
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl DaoConfig {
    /// Build a config from `PBX_DAO_DB_PATH` and `PBX_DAO_BUSY_TIMEOUT_MS`.
    pub fn from_env() -> DaoResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DaoResult<Self> {
        let mut config = Self::default();
        if let Some(path) = lookup("PBX_DAO_DB_PATH") {
            let path = path.trim();
            if !path.is_empty() {
                config.db_path = PathBuf::from(path);
            }
        }
        if let Some(raw) = lookup("PBX_DAO_BUSY_TIMEOUT_MS") {
            config.busy_timeout_ms = parse_number("PBX_DAO_BUSY_TIMEOUT_MS", &raw)?;
        }
        Ok(config)
    }

    /// Load a config from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> DaoResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: DaoConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// The database path with a leading `~` expanded.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.db_path.to_string_lossy())
    }
}

fn parse_number(key: &str, raw: &str) -> DaoResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| DaoError::Config(format!("{key} must be a non-negative integer, got {raw:?}")))
}

/// Expand a leading `~` to the user's home directory.
pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            let mut expanded = PathBuf::from(home);
            if path.len() > 2 {
                expanded.push(&path[2..]);
            }
            return expanded;
        }
    }
    PathBuf::from(path)
}

//! Operator configuration.
//!
//! Resolution order, highest first: CLI flags, environment
//! (`BROKERDESK_DATA_DIR`, `BROKERDESK_ACTOR`, `BROKERDESK_LOG`), `brokerdesk.toml`
//! in the data directory, built-in defaults. A missing config file is not an error.

use crate::core::error::{DeskError, DeskResult};
use crate::core::schemas;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeskConfig {
    pub data_dir: PathBuf,
    /// File name of the document inside `data_dir`.
    pub document: String,
    /// Append broker events to the audit log.
    pub audit: bool,
    pub log_level: String,
    /// Actor recorded on audit events when none is given.
    pub actor: String,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(schemas::DEFAULT_DATA_DIR),
            document: schemas::DOCUMENT_FILE_NAME.to_string(),
            audit: true,
            log_level: "warn".to_string(),
            actor: "operator".to_string(),
        }
    }
}

/// Overrides collected from the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub data_dir: Option<PathBuf>,
    pub actor: Option<String>,
    pub log_level: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("BROKERDESK_DATA_DIR").ok().map(PathBuf::from),
            actor: std::env::var("BROKERDESK_ACTOR").ok(),
            log_level: std::env::var("BROKERDESK_LOG").ok(),
        }
    }
}

/// Parse a config file body. Unknown keys are ignored.
pub fn parse_config(content: &str) -> DeskResult<DeskConfig> {
    toml::from_str(content).map_err(|e| DeskError::ConfigError(e.to_string()))
}

/// Load `brokerdesk.toml` from `data_dir`, falling back to defaults.
/// The returned config always points at `data_dir`, whatever the file says.
pub fn load_config(data_dir: &Path) -> DeskResult<DeskConfig> {
    let config_path = data_dir.join(schemas::CONFIG_FILE_NAME);
    let mut config = if config_path.exists() {
        let content = fs::read_to_string(&config_path).map_err(DeskError::IoError)?;
        parse_config(&content)?
    } else {
        DeskConfig::default()
    };
    config.data_dir = data_dir.to_path_buf();
    Ok(config)
}

/// Resolve the effective config from a CLI data-dir flag and the environment.
pub fn resolve(cli_data_dir: Option<PathBuf>, env: EnvOverrides) -> DeskResult<DeskConfig> {
    let data_dir = cli_data_dir
        .or(env.data_dir)
        .unwrap_or_else(|| PathBuf::from(schemas::DEFAULT_DATA_DIR));
    let mut config = load_config(&data_dir)?;
    if let Some(actor) = env.actor {
        config.actor = actor;
    }
    if let Some(level) = env.log_level {
        config.log_level = level;
    }
    if config.document.trim().is_empty() {
        return Err(DeskError::ConfigError("document file name cannot be empty".into()));
    }
    Ok(config)
}

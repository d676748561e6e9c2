//! Configuration loading from disk and the command line.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values supplied on the command line or through the environment.
///
/// Each `Some` replaces the corresponding file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub allowed_hosts: Option<String>,
    pub redirect_url: Option<String>,
    pub bind_address: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut ProxyConfig) {
        if let Some(hosts) = &self.allowed_hosts {
            config.cors.allowed_hosts = hosts.clone();
        }
        if let Some(url) = &self.redirect_url {
            config.cors.redirect_url = url.clone();
        }
        if let Some(addr) = &self.bind_address {
            config.listener.bind_address = addr.clone();
        }
    }
}

/// Parse a TOML document into a configuration without validating it.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load the optional config file, apply overrides, and validate the result.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_config(&content)?
        }
        None => ProxyConfig::default(),
    };

    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

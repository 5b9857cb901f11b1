use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Largest page size the upstream news API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read newsfeed config at '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in newsfeed config '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid newsfeed config: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

impl Config {
    /// `newsfeed/config.toml` under the platform config directory, or under
    /// the working directory when the platform has none.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("newsfeed")
            .join("config.toml")
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Read and validate `path`. A missing file is not an error: every
    /// section then takes its defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&raw).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Page sizes must fit the news API and pages are numbered from 1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let paging = &self.paging;
        if !(1..=MAX_PAGE_SIZE).contains(&paging.page_size) {
            return Err(ConfigError::invalid(format!(
                "paging.page_size must be in 1..={MAX_PAGE_SIZE}, got {}",
                paging.page_size
            )));
        }
        if paging.first_page == 0 {
            return Err(ConfigError::invalid("paging.first_page must be at least 1"));
        }
        Ok(())
    }
}

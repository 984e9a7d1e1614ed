//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory where uploaded activity files are stored.
    pub data_dir: PathBuf,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/fit_files"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let data_dir = env::var("FIT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/fit_files"));

        if data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("FIT_DATA_DIR"));
        }

        Ok(Self { data_dir })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test body: integration tests run in parallel threads and the
    // process environment is shared.
    #[test]
    fn test_config_from_env() {
        env::remove_var("FIT_DATA_DIR");
        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.data_dir, PathBuf::from("data/fit_files"));

        env::set_var("FIT_DATA_DIR", "/tmp/fit-test");
        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/fit-test"));
        env::remove_var("FIT_DATA_DIR");
    }
}

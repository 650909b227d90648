//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default row count for top lists.
    pub default_limit: usize,

    /// Row count for the nested per-day breakdowns.
    pub breakdown_limit: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("default_limit", &self.default_limit)
            .field("breakdown_limit", &self.breakdown_limit)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_limit: 10,
            breakdown_limit: 5,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (REPLAY_*)
        figment = figment.merge(Env::prefixed("REPLAY_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for replay.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("replay"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let config = Config::default();
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.breakdown_limit, 5);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_limit = 25\n").unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.default_limit, 25);
        assert_eq!(config.breakdown_limit, 5);
    }
}

//! Configuration management for the Composer buildpack
//!
//! `buildpack.yml` is optional; a missing or empty file yields the defaults.

pub mod schema;

pub use schema::{BuildpackConfig, ComposerConfig, PhpConfig};

use crate::error::{ComposerError, ComposerResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File name of the developer-authored override configuration
pub const BUILDPACK_YML: &str = "buildpack.yml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a config manager for an application root
    pub fn for_app(app_root: &Path) -> Self {
        Self {
            config_path: app_root.join(BUILDPACK_YML),
        }
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> ComposerResult<BuildpackConfig> {
        if !self.config_path.exists() {
            debug!("{} not found, using defaults", self.config_path.display());
            return Ok(BuildpackConfig::default());
        }

        let content = fs::read_to_string(&self.config_path).await.map_err(|e| {
            ComposerError::io(format!("reading config from {}", self.config_path.display()), e)
        })?;

        Self::parse(&content, &self.config_path)
    }

    /// Parse configuration from YAML text
    pub fn parse(content: &str, path: &Path) -> ComposerResult<BuildpackConfig> {
        if content.trim().is_empty() {
            return Ok(BuildpackConfig::default());
        }

        serde_yaml::from_str(content).map_err(|e| ComposerError::OverrideConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::for_app(temp.path());

        let config = manager.load().await.unwrap();
        assert_eq!(config, BuildpackConfig::default());
    }

    #[tokio::test]
    async fn load_empty_file_is_default() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(BUILDPACK_YML), "\n").unwrap();

        let config = ConfigManager::for_app(temp.path()).load().await.unwrap();
        assert_eq!(config, BuildpackConfig::default());
    }

    #[tokio::test]
    async fn load_json_flavoured_yaml() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(BUILDPACK_YML),
            r#"{"composer": {"version": "1.2.3"}}"#,
        )
        .unwrap();

        let config = ConfigManager::for_app(temp.path()).load().await.unwrap();
        assert_eq!(config.composer.version, "1.2.3");
    }

    #[tokio::test]
    async fn malformed_yaml_is_override_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(BUILDPACK_YML),
            "composer:\n  install_options: 12\n",
        )
        .unwrap();

        let err = ConfigManager::for_app(temp.path()).load().await.unwrap_err();
        assert!(matches!(err, ComposerError::OverrideConfig { .. }));
    }
}

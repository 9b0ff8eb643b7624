//! Configuration schema for the Composer buildpack
//!
//! Configuration is read from `buildpack.yml` at the application root.

use serde::{Deserialize, Serialize};

/// Default web directory used by the PHP web buildpack
pub const DEFAULT_WEB_DIRECTORY: &str = "htdocs";

/// Default Composer vendor directory
pub const DEFAULT_VENDOR_DIRECTORY: &str = "vendor";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildpackConfig {
    /// Composer settings
    pub composer: ComposerConfig,

    /// PHP web settings shared with the web buildpack
    pub php: PhpConfig,
}

/// Composer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Pinned Composer version (empty = buildpack default)
    pub version: String,

    /// Extra flags appended to `composer install`
    pub install_options: Vec<String>,

    /// Directory, relative to the manifest, that Composer installs into
    pub vendor_directory: String,

    /// Manifest subpath under the web directory
    pub json_path: String,

    /// GitHub OAuth token written into the global Composer config
    pub github_oauth_token: String,

    /// Packages installed with `composer global require`
    pub install_global: Vec<String>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            version: String::new(),
            install_options: vec![],
            vendor_directory: DEFAULT_VENDOR_DIRECTORY.to_string(),
            json_path: String::new(),
            github_oauth_token: String::new(),
            install_global: vec![],
        }
    }
}

impl ComposerConfig {
    /// Vendor directory, falling back to the default when blank
    pub fn vendor_directory(&self) -> &str {
        if self.vendor_directory.trim().is_empty() {
            DEFAULT_VENDOR_DIRECTORY
        } else {
            &self.vendor_directory
        }
    }
}

/// PHP web settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhpConfig {
    /// Directory served by the web server
    #[serde(rename = "webdirectory")]
    pub web_directory: String,
}

impl Default for PhpConfig {
    fn default() -> Self {
        Self {
            web_directory: DEFAULT_WEB_DIRECTORY.to_string(),
        }
    }
}

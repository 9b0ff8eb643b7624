//! Build plan contribution
//!
//! Detection hands two requirements to the lifecycle: the PHP runtime
//! (version from the manifests) and Composer itself (version from
//! buildpack.yml, empty for the default). Both are needed at build time.

use crate::atomic::write_atomic;
use crate::config::{BuildpackConfig, BUILDPACK_YML};
use crate::error::{ComposerError, ComposerResult};
use crate::version::ResolvedVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Build plan name of the PHP runtime dependency
pub const PHP_DEPENDENCY: &str = "php";

/// Build plan name of the Composer dependency
pub const COMPOSER_DEPENDENCY: &str = "php-composer";

/// Metadata attached to each plan entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMetadata {
    /// Required while building
    pub build: bool,

    /// File that supplied the version, for diagnostics
    #[serde(
        rename = "version-source",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub version_source: Option<String>,
}

/// A single build plan entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Version constraint; empty lets the provider pick its default
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub metadata: PlanMetadata,
}

/// Build plan: dependency name to requirement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildPlan(BTreeMap<String, Dependency>);

impl BuildPlan {
    /// Look up an entry by dependency name
    pub fn get(&self, name: &str) -> Option<&Dependency> {
        self.0.get(name)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> ComposerResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Parse from TOML
    pub fn from_toml(content: &str) -> ComposerResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write the whole plan or nothing
    pub async fn write(&self, path: &Path) -> ComposerResult<()> {
        let content = self.to_toml()?;
        write_atomic(path, content.as_bytes()).await?;
        info!("Build plan written to {}", path.display());
        Ok(())
    }
}

/// Reject pinned Composer versions that cannot be a single version token
fn validate_composer_version(version: &str) -> Result<(), String> {
    if version.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(format!(
            "composer.version '{}' must not contain whitespace",
            version.escape_debug()
        ));
    }
    Ok(())
}

/// Turn the resolved PHP version and buildpack.yml into plan entries
pub fn contribute(resolved: &ResolvedVersion, config: &BuildpackConfig) -> ComposerResult<BuildPlan> {
    let composer_version = config.composer.version.trim();
    validate_composer_version(composer_version).map_err(|reason| ComposerError::OverrideConfig {
        path: BUILDPACK_YML.into(),
        reason,
    })?;

    let mut entries = BTreeMap::new();

    entries.insert(
        PHP_DEPENDENCY.to_string(),
        Dependency {
            version: resolved.version.clone(),
            metadata: PlanMetadata {
                build: true,
                version_source: resolved.source.label().map(str::to_string),
            },
        },
    );

    entries.insert(
        COMPOSER_DEPENDENCY.to_string(),
        Dependency {
            version: composer_version.to_string(),
            metadata: PlanMetadata {
                build: true,
                version_source: (!composer_version.is_empty()).then(|| BUILDPACK_YML.to_string()),
            },
        },
    );

    Ok(BuildPlan(entries))
}

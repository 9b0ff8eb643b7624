//! Manifest discovery
//!
//! Looks for `composer.json` in this order (first match wins):
//! 1. `{app_root}/composer.json`
//! 2. `{app_root}/{web_directory}/{subpath}/composer.json`
//!
//! The lock file is only ever looked up next to the manifest that was found.

use crate::config::BuildpackConfig;
use crate::error::{ComposerError, ComposerResult};
use crate::manifest::composer::{Manifest, ManifestKind, COMPOSER_JSON, COMPOSER_LOCK};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where to look for the manifest below the application root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    /// Web directory served by the PHP web buildpack
    pub web_directory: String,
    /// Optional subpath below the web directory
    pub subpath: Option<String>,
}

impl SearchPath {
    /// Build the search path from configuration and an explicit override.
    ///
    /// `subpath_override` (e.g. from `COMPOSER_PATH`) beats `composer.json_path`.
    pub fn from_config(config: &BuildpackConfig, subpath_override: Option<&str>) -> Self {
        let subpath = subpath_override
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| {
                Some(config.composer.json_path.clone()).filter(|s| !s.is_empty())
            });

        Self {
            web_directory: config.php.web_directory.clone(),
            subpath,
        }
    }

    /// Candidate manifest locations in search order
    pub fn candidates(&self, app_root: &Path) -> Vec<PathBuf> {
        let mut nested = app_root.join(&self.web_directory);
        if let Some(ref subpath) = self.subpath {
            nested = nested.join(subpath);
        }

        vec![app_root.join(COMPOSER_JSON), nested.join(COMPOSER_JSON)]
    }
}

/// Declarative manifest plus its optional locked sibling
#[derive(Debug, Clone)]
pub struct ManifestSet {
    /// composer.json
    pub declarative: Manifest,
    /// composer.lock, when one sits next to composer.json
    pub locked: Option<Manifest>,
}

impl ManifestSet {
    /// Directory containing composer.json; Composer runs from here
    pub fn project_dir(&self) -> &Path {
        self.declarative.path().parent().unwrap_or_else(|| Path::new("."))
    }

    /// Path of the lock file, whether or not it exists
    pub fn lock_path(&self) -> PathBuf {
        self.project_dir().join(COMPOSER_LOCK)
    }
}

/// Locate composer.json, failing with `ManifestNotFound` if no candidate exists
pub fn find_composer_json(app_root: &Path, search: &SearchPath) -> ComposerResult<PathBuf> {
    let candidates = search.candidates(app_root);

    for candidate in &candidates {
        if candidate.is_file() {
            debug!("Found {}: {}", COMPOSER_JSON, candidate.display());
            return Ok(candidate.clone());
        }
        debug!("No {} at {}", COMPOSER_JSON, candidate.display());
    }

    // Report the most specific location searched
    let searched = candidates
        .last()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    Err(ComposerError::ManifestNotFound {
        file: COMPOSER_JSON,
        searched,
    })
}

/// Locate and parse composer.json and, if present, its sibling composer.lock
pub async fn read_manifests(app_root: &Path, search: &SearchPath) -> ComposerResult<ManifestSet> {
    let json_path = find_composer_json(app_root, search)?;
    let declarative = Manifest::read(&json_path, ManifestKind::Declarative).await?;

    let lock_path = json_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(COMPOSER_LOCK);

    let locked = if lock_path.is_file() {
        debug!("Found {}: {}", COMPOSER_LOCK, lock_path.display());
        Some(Manifest::read(&lock_path, ManifestKind::Locked).await?)
    } else {
        None
    };

    Ok(ManifestSet {
        declarative,
        locked,
    })
}

//! Composer manifest parsing
//!
//! Only the runtime requirement is interpreted; the rest of the document
//! is kept as raw bytes for fingerprinting.

use crate::error::{ComposerError, ComposerResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Declarative manifest file name
pub const COMPOSER_JSON: &str = "composer.json";

/// Locked manifest file name
pub const COMPOSER_LOCK: &str = "composer.lock";

/// Runtime key inside `require` / `platform`
pub const RUNTIME: &str = "php";

/// Which of the two manifests a document is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// composer.json, edited by the developer
    Declarative,
    /// composer.lock, generated by a previous resolution
    Locked,
}

impl ManifestKind {
    /// Conventional file name for this kind
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Declarative => COMPOSER_JSON,
            Self::Locked => COMPOSER_LOCK,
        }
    }

    /// Section that carries the runtime requirement
    fn section(&self) -> &'static str {
        match self {
            Self::Declarative => "require",
            Self::Locked => "platform",
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// `require` / `platform` section. PHP encodes an empty map as `[]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Section {
    Map(Map<String, Value>),
    List(Vec<Value>),
}

impl Section {
    fn constraint(&self, section: &str) -> Result<Option<String>, String> {
        match self {
            Self::Map(map) => match map.get(RUNTIME) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(other) => Err(format!(
                    "\"{}.{}\" must be a string, found {}",
                    section, RUNTIME, other
                )),
            },
            Self::List(items) if items.is_empty() => Ok(None),
            Self::List(_) => Err(format!("\"{}\" must be an object", section)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ComposerJson {
    #[serde(default)]
    require: Option<Section>,
}

#[derive(Debug, Deserialize)]
struct ComposerLock {
    #[serde(default)]
    platform: Option<Section>,
}

/// A parsed manifest, immutable once read
#[derive(Debug, Clone)]
pub struct Manifest {
    kind: ManifestKind,
    path: PathBuf,
    contents: Vec<u8>,
    runtime_constraint: Option<String>,
}

impl Manifest {
    /// Read and parse a manifest from disk
    pub async fn read(path: &Path, kind: ManifestKind) -> ComposerResult<Self> {
        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| ComposerError::io(format!("reading {}", path.display()), e))?;
        Self::parse(contents, path, kind)
    }

    /// Parse manifest bytes
    pub fn parse(contents: Vec<u8>, path: &Path, kind: ManifestKind) -> ComposerResult<Self> {
        let parse_error = |reason: String| ComposerError::ManifestParse {
            path: path.to_path_buf(),
            reason,
        };

        let section = match kind {
            ManifestKind::Declarative => {
                serde_json::from_slice::<ComposerJson>(&contents)
                    .map_err(|e| parse_error(e.to_string()))?
                    .require
            }
            ManifestKind::Locked => {
                serde_json::from_slice::<ComposerLock>(&contents)
                    .map_err(|e| parse_error(e.to_string()))?
                    .platform
            }
        };

        let runtime_constraint = match section {
            Some(section) => section.constraint(kind.section()).map_err(parse_error)?,
            None => None,
        };

        Ok(Self {
            kind,
            path: path.to_path_buf(),
            contents,
            runtime_constraint,
        })
    }

    /// Manifest kind
    pub fn kind(&self) -> ManifestKind {
        self.kind
    }

    /// Path the manifest was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw bytes of the manifest
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Declared runtime constraint; `None` when absent or empty
    pub fn runtime_constraint(&self) -> Option<&str> {
        self.runtime_constraint
            .as_deref()
            .filter(|constraint| !constraint.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declarative(json: &str) -> ComposerResult<Manifest> {
        Manifest::parse(
            json.as_bytes().to_vec(),
            Path::new("composer.json"),
            ManifestKind::Declarative,
        )
    }

    fn locked(json: &str) -> ComposerResult<Manifest> {
        Manifest::parse(
            json.as_bytes().to_vec(),
            Path::new("composer.lock"),
            ManifestKind::Locked,
        )
    }

    #[test]
    fn reads_require_php() {
        let manifest = declarative(r#"{"require": {"php": ">=5.6"}}"#).unwrap();
        assert_eq!(manifest.runtime_constraint(), Some(">=5.6"));
        assert_eq!(manifest.kind(), ManifestKind::Declarative);
    }

    #[test]
    fn reads_platform_php() {
        let manifest = locked(r#"{"platform": {"php": ">=7.0"}, "packages": []}"#).unwrap();
        assert_eq!(manifest.runtime_constraint(), Some(">=7.0"));
    }

    #[test]
    fn empty_array_section_is_empty() {
        let manifest = locked(r#"{"platform": []}"#).unwrap();
        assert_eq!(manifest.runtime_constraint(), None);
    }

    #[test]
    fn missing_or_empty_constraint_is_none() {
        assert_eq!(declarative(r#"{"require": {}}"#).unwrap().runtime_constraint(), None);
        assert_eq!(declarative(r#"{"name": "app"}"#).unwrap().runtime_constraint(), None);
        assert_eq!(
            declarative(r#"{"require": {"php": ""}}"#).unwrap().runtime_constraint(),
            None
        );
        assert_eq!(locked(r#"{"platform": null}"#).unwrap().runtime_constraint(), None);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = locked(r#"{"platform": {"php": "#).unwrap_err();
        assert!(matches!(err, ComposerError::ManifestParse { .. }));
    }

    #[test]
    fn non_empty_array_section_is_parse_error() {
        let err = locked(r#"{"platform": ["php"]}"#).unwrap_err();
        assert!(err.to_string().contains("must be an object"));
    }

    #[test]
    fn non_string_constraint_is_parse_error() {
        let err = declarative(r#"{"require": {"php": 7}}"#).unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn keeps_raw_contents() {
        let json = r#"{"require": {"php": "^8.1", "monolog/monolog": "^2.0"}}"#;
        let manifest = declarative(json).unwrap();
        assert_eq!(manifest.contents(), json.as_bytes());
    }
}

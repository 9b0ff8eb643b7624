//! PHP version resolution
//!
//! Precedence (first non-empty constraint wins):
//!
//! | Rank | Source | Field |
//! |------|--------|-------|
//! | 1 | composer.lock | `platform.php` |
//! | 2 | composer.json | `require.php` |
//! | 3 | unspecified | empty string, runtime default |

use crate::manifest::{Manifest, COMPOSER_LOCK};
use std::fmt;
use tracing::debug;

/// Advisory emitted when composer.json has no lock file next to it
pub const MISSING_LOCK_WARNING: &str = "Include a 'composer.lock' file with your application! \
This will make sure the exact same version of dependencies are used when you deploy. \
It will also enable caching of your dependency layer.";

/// Where the resolved version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// `platform.php` in composer.lock
    Locked,
    /// `require.php` in composer.json
    Declarative,
    /// Neither manifest constrains PHP
    Unspecified,
}

impl VersionSource {
    /// Provenance label recorded in the build plan, if any
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Locked => Some("composer.lock"),
            Self::Declarative => Some("composer.json"),
            Self::Unspecified => None,
        }
    }
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label().unwrap_or("unspecified"))
    }
}

/// The authoritative PHP constraint for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Constraint string; empty means "use the runtime default"
    pub version: String,
    /// Which manifest supplied it
    pub source: VersionSource,
}

impl ResolvedVersion {
    /// No constraint anywhere
    pub fn unspecified() -> Self {
        Self {
            version: String::new(),
            source: VersionSource::Unspecified,
        }
    }

    /// Whether a concrete constraint was found
    pub fn is_specified(&self) -> bool {
        self.source != VersionSource::Unspecified
    }
}

/// Resolution result plus operator-facing advisories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: ResolvedVersion,
    pub warnings: Vec<String>,
}

/// Inputs visible to a precedence rule
struct Inputs<'a> {
    locked: Option<&'a Manifest>,
    declarative: &'a Manifest,
}

type Rule = (VersionSource, fn(&Inputs<'_>) -> Option<String>);

fn locked_constraint(inputs: &Inputs<'_>) -> Option<String> {
    inputs
        .locked
        .and_then(Manifest::runtime_constraint)
        .map(str::to_string)
}

fn declared_constraint(inputs: &Inputs<'_>) -> Option<String> {
    inputs.declarative.runtime_constraint().map(str::to_string)
}

/// Ranked rules, highest precedence first
const PRECEDENCE: &[Rule] = &[
    (VersionSource::Locked, locked_constraint),
    (VersionSource::Declarative, declared_constraint),
];

/// Resolve the PHP constraint from the locked and declarative manifests.
///
/// Pure apart from logging: the same manifests always give the same answer.
pub fn resolve(locked: Option<&Manifest>, declarative: &Manifest) -> Resolution {
    let inputs = Inputs {
        locked,
        declarative,
    };

    let mut warnings = Vec::new();
    if locked.is_none() {
        debug!("No {} next to the manifest", COMPOSER_LOCK);
        warnings.push(MISSING_LOCK_WARNING.to_string());
    }

    let resolved = PRECEDENCE
        .iter()
        .find_map(|(source, rule)| {
            rule(&inputs).map(|version| ResolvedVersion {
                version,
                source: *source,
            })
        })
        .unwrap_or_else(ResolvedVersion::unspecified);

    if resolved.is_specified() {
        debug!("Resolved PHP {} from {}", resolved.version, resolved.source);
    } else {
        debug!(
            "No PHP constraint in {} or composer.json, using the runtime default",
            COMPOSER_LOCK
        );
    }

    Resolution { resolved, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestKind;
    use std::path::Path;

    fn declarative(json: &str) -> Manifest {
        Manifest::parse(
            json.as_bytes().to_vec(),
            Path::new("composer.json"),
            ManifestKind::Declarative,
        )
        .unwrap()
    }

    fn locked(json: &str) -> Manifest {
        Manifest::parse(
            json.as_bytes().to_vec(),
            Path::new("composer.lock"),
            ManifestKind::Locked,
        )
        .unwrap()
    }

    #[test]
    fn declarative_only_warns_about_missing_lock() {
        let json = declarative(r#"{"require": {"php": ">=5.6"}}"#);

        let resolution = resolve(None, &json);

        assert_eq!(resolution.resolved.version, ">=5.6");
        assert_eq!(resolution.resolved.source, VersionSource::Declarative);
        assert_eq!(resolution.warnings, vec![MISSING_LOCK_WARNING.to_string()]);
    }

    #[test]
    fn lock_outranks_declarative() {
        let json = declarative(r#"{"require": {"php": ">=5.6"}}"#);
        let lock = locked(r#"{"platform": {"php": ">=7.0"}}"#);

        let resolution = resolve(Some(&lock), &json);

        assert_eq!(resolution.resolved.version, ">=7.0");
        assert_eq!(resolution.resolved.source, VersionSource::Locked);
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn lock_wins_regardless_of_declarative_content() {
        let lock = locked(r#"{"platform": {"php": "8.1.2"}}"#);
        for json in [
            r#"{}"#,
            r#"{"require": {}}"#,
            r#"{"require": {"php": "^7.4"}}"#,
            r#"{"require": []}"#,
        ] {
            let resolution = resolve(Some(&lock), &declarative(json));
            assert_eq!(resolution.resolved.version, "8.1.2", "for {}", json);
        }
    }

    #[test]
    fn empty_lock_platform_falls_back_to_declarative() {
        let json = declarative(r#"{"require": {"php": "^8.0"}}"#);
        let lock = locked(r#"{"platform": []}"#);

        let resolution = resolve(Some(&lock), &json);

        assert_eq!(resolution.resolved.version, "^8.0");
        assert_eq!(resolution.resolved.source, VersionSource::Declarative);
    }

    #[test]
    fn neither_specifies_version() {
        let json = declarative(r#"{"require": {}}"#);
        let lock = locked(r#"{"platform": []}"#);

        let resolution = resolve(Some(&lock), &json);

        assert_eq!(resolution.resolved, ResolvedVersion::unspecified());
        assert_eq!(resolution.resolved.version, "");
        assert!(!resolution.resolved.is_specified());
    }

    #[test]
    fn source_labels() {
        assert_eq!(VersionSource::Locked.label(), Some("composer.lock"));
        assert_eq!(VersionSource::Declarative.label(), Some("composer.json"));
        assert_eq!(VersionSource::Unspecified.label(), None);
        assert_eq!(VersionSource::Unspecified.to_string(), "unspecified");
    }
}

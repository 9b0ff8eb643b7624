//! Reuse-or-rebuild decision for the dependency layer

use crate::layer::fingerprint::Fingerprint;
use crate::manifest::ManifestSet;
use std::fmt;

/// Whether the layer may be carried across builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Layer is restored across builds and may be reused
    Cached,
    /// Layer is build-local and always reinstalled
    Uncached,
}

impl CachePolicy {
    /// Only locked dependency sets are cached
    pub fn for_manifests(manifests: &ManifestSet) -> Self {
        if manifests.locked.is_some() {
            Self::Cached
        } else {
            Self::Uncached
        }
    }

    /// Value of the layer's `cache` flag
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached)
    }
}

/// Outcome of comparing fingerprints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerDecision {
    /// Installed dependencies are still valid
    Reuse,
    /// Dependencies must be installed from scratch
    Rebuild,
}

impl fmt::Display for LayerDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reuse => write!(f, "reuse"),
            Self::Rebuild => write!(f, "rebuild"),
        }
    }
}

/// Decide reuse vs. rebuild.
///
/// Uncached layers always rebuild. Cached layers are reused only when the
/// persisted fingerprint equals the current one exactly.
pub fn decide(current: &Fingerprint, persisted: Option<&str>, policy: CachePolicy) -> LayerDecision {
    if policy == CachePolicy::Uncached {
        return LayerDecision::Rebuild;
    }

    match persisted {
        Some(previous) if previous == current.as_str() => LayerDecision::Reuse,
        _ => LayerDecision::Rebuild,
    }
}

//! Composer manifest discovery and parsing
//!
//! Finds `composer.json` (and its optional `composer.lock` sibling) and
//! extracts the declared PHP requirement.

pub mod composer;
pub mod locate;

pub use composer::{Manifest, ManifestKind, COMPOSER_JSON, COMPOSER_LOCK};
pub use locate::{find_composer_json, read_manifests, ManifestSet, SearchPath};

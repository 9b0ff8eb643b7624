//! Content fingerprint of the inputs that shape a dependency install
//!
//! Same bytes in, same fingerprint out. File metadata (mtime, mode) never
//! participates, and an absent input hashes differently from an empty one.

use crate::error::{ComposerError, ComposerResult};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Hex-encoded SHA-256 over all fingerprinted inputs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hash labelled inputs in the order given
    pub fn compute<'a, I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a [u8]>)>,
    {
        let mut hasher = Sha256::new();

        for (label, contents) in inputs {
            hasher.update((label.len() as u64).to_le_bytes());
            hasher.update(label.as_bytes());
            match contents {
                Some(bytes) => {
                    hasher.update([1u8]);
                    hasher.update((bytes.len() as u64).to_le_bytes());
                    hasher.update(bytes);
                }
                None => hasher.update([0u8]),
            }
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// Hash files on disk; missing files count as absent inputs
    pub async fn of_files(files: &[(&str, &Path)]) -> ComposerResult<Self> {
        let mut contents = Vec::with_capacity(files.len());

        for (label, path) in files {
            let bytes = if path.is_file() {
                Some(tokio::fs::read(path).await.map_err(|e| {
                    ComposerError::io(format!("reading {} for fingerprint", path.display()), e)
                })?)
            } else {
                None
            };
            contents.push((*label, bytes));
        }

        let fingerprint = Self::compute(
            contents
                .iter()
                .map(|(label, bytes)| (*label, bytes.as_deref())),
        );
        debug!("Layer fingerprint: {}", fingerprint.short());
        Ok(fingerprint)
    }

    /// Full hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

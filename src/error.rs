//! Error types for the Composer buildpack
//!
//! All modules use `ComposerResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for buildpack operations
pub type ComposerResult<T> = Result<T, ComposerError>;

/// All errors that can occur while detecting or building
#[derive(Error, Debug)]
pub enum ComposerError {
    // Detection errors
    #[error("no \"{file}\" found at: {searched}")]
    ManifestNotFound { file: &'static str, searched: String },

    #[error("Failed to parse {path}: {reason}")]
    ManifestParse { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid buildpack configuration at {path}: {reason}")]
    OverrideConfig { path: PathBuf, reason: String },

    // Install errors
    #[error("Command failed: {command}, exit code: {code}")]
    InstallFailed { command: String, code: i32 },

    #[error("Command terminated by signal: {command}")]
    ProcessSignaled { command: String },

    #[error("Failed to update layer metadata {path}: {reason}")]
    LayerMetadata { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed to start: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ComposerError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Whether this error means "the app does not use Composer" rather than a fault
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::ManifestNotFound { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ManifestNotFound { .. } => {
                Some("Add a composer.json, or set COMPOSER_PATH to its directory under the web directory")
            }
            Self::ManifestParse { .. } => Some("Check that composer.json and composer.lock are valid JSON"),
            Self::OverrideConfig { .. } => Some("Check the 'composer' and 'php' sections of buildpack.yml"),
            Self::CommandFailed { .. } => Some("Make sure the PHP interpreter is on PATH or pass --php"),
            _ => None,
        }
    }
}

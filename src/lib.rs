//! composer-cnb - PHP Composer buildpack
//!
//! Detects Composer applications, resolves the PHP version they need,
//! contributes it to the build plan and installs dependencies into a layer
//! that is reused across builds while its inputs are unchanged.

pub mod atomic;
pub mod cli;
pub mod config;
pub mod error;
pub mod install;
pub mod layer;
pub mod manifest;
pub mod plan;
pub mod ui;
pub mod version;

pub use error::{ComposerError, ComposerResult};

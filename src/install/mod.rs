//! Composer invocation
//!
//! Turns a rebuild decision into Composer commands and runs them through a
//! pluggable `CommandRunner`.

pub mod composer;
pub mod invoker;
pub mod runner;

pub use composer::{Composer, COMPOSER_PHAR, GITHUB_OAUTH_KEY};
pub use invoker::{InstallPlan, Installer};
pub use runner::{CommandRunner, Invocation, ProcessRunner};

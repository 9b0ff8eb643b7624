//! Composer command lines

use crate::install::runner::Invocation;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Composer PHAR file name
pub const COMPOSER_PHAR: &str = "composer.phar";

/// Global config key for the GitHub OAuth token
pub const GITHUB_OAUTH_KEY: &str = "github-oauth.github.com";

/// Builds Composer invocations run through the PHP interpreter
#[derive(Debug, Clone)]
pub struct Composer {
    php: String,
    phar: PathBuf,
    working_dir: PathBuf,
    env: BTreeMap<String, String>,
}

impl Composer {
    /// Composer at `phar`, run by `php` from `working_dir`
    pub fn new(php: impl Into<String>, phar: PathBuf, working_dir: PathBuf) -> Self {
        Self {
            php: php.into(),
            phar,
            working_dir,
            env: BTreeMap::new(),
        }
    }

    /// Set an environment variable for every invocation
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    fn invocation(&self, args: Vec<String>) -> Invocation {
        let mut full = vec![self.phar.display().to_string()];
        full.extend(args);

        Invocation {
            executable: self.php.clone(),
            working_dir: self.working_dir.clone(),
            args: full,
            env: self.env.clone(),
            redact_last: false,
        }
    }

    /// `composer install --no-progress <options...>`
    pub fn install(&self, options: &[String]) -> Invocation {
        let mut args = vec!["install".to_string(), "--no-progress".to_string()];
        args.extend(options.iter().cloned());
        self.invocation(args)
    }

    /// `composer global require --no-progress <package>`
    pub fn global_require(&self, package: &str) -> Invocation {
        self.invocation(vec![
            "global".to_string(),
            "require".to_string(),
            "--no-progress".to_string(),
            package.to_string(),
        ])
    }

    /// `composer config [-g] <key> <value>`; the value is masked in logs
    pub fn config(&self, key: &str, value: &str, global: bool) -> Invocation {
        let mut args = vec!["config".to_string()];
        if global {
            args.push("-g".to_string());
        }
        args.push(key.to_string());
        args.push(value.to_string());

        let mut invocation = self.invocation(args);
        invocation.redact_last = true;
        invocation
    }
}

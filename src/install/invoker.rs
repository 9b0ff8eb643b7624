//! Install sequence for a rebuilt dependency layer
//!
//! Order: config writes, then the project install, then one global require
//! per package. The first failing invocation aborts the sequence; nothing is
//! retried and the layer fingerprint is only persisted after the last one
//! succeeds.

use crate::config::ComposerConfig;
use crate::error::{ComposerError, ComposerResult};
use crate::install::composer::{Composer, GITHUB_OAUTH_KEY};
use crate::install::runner::{CommandRunner, Invocation};
use crate::layer::{DependencyLayer, MetadataStore};
use tracing::{debug, info};

/// What to install, derived from buildpack.yml and the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    /// Global config key/value pairs written before any install
    pub config: Vec<(String, String)>,
    /// Extra flags for `composer install`
    pub install_options: Vec<String>,
    /// Packages for `composer global require`
    pub global_packages: Vec<String>,
}

impl InstallPlan {
    /// Build from configuration; `env_token` is used when buildpack.yml has no token
    pub fn from_config(config: &ComposerConfig, env_token: Option<&str>) -> Self {
        let token = Some(config.github_oauth_token.trim())
            .filter(|t| !t.is_empty())
            .or_else(|| env_token.map(str::trim).filter(|t| !t.is_empty()));

        let config_writes = token
            .map(|t| vec![(GITHUB_OAUTH_KEY.to_string(), t.to_string())])
            .unwrap_or_default();

        Self {
            config: config_writes,
            install_options: config.install_options.clone(),
            global_packages: config
                .install_global
                .iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }
}

/// Drives Composer through a `CommandRunner`
pub struct Installer<'a> {
    runner: &'a dyn CommandRunner,
    composer: Composer,
}

impl<'a> Installer<'a> {
    pub fn new(runner: &'a dyn CommandRunner, composer: Composer) -> Self {
        Self { runner, composer }
    }

    /// Invocations for `plan`, in execution order
    pub fn invocations(&self, plan: &InstallPlan) -> Vec<Invocation> {
        let mut invocations = Vec::new();

        for (key, value) in &plan.config {
            invocations.push(self.composer.config(key, value, true));
        }

        invocations.push(self.composer.install(&plan.install_options));

        for package in &plan.global_packages {
            invocations.push(self.composer.global_require(package));
        }

        invocations
    }

    /// Run every invocation, stopping at the first failure
    pub async fn run(&self, plan: &InstallPlan) -> ComposerResult<()> {
        let invocations = self.invocations(plan);
        debug!("Running {} Composer invocation(s)", invocations.len());

        for invocation in &invocations {
            let code = self.runner.run(invocation).await?;
            if code != 0 {
                return Err(ComposerError::InstallFailed {
                    command: invocation.display(),
                    code,
                });
            }
        }

        Ok(())
    }

    /// Install into a layer that was decided for rebuild.
    ///
    /// On success the new fingerprint is persisted; on failure the layer is
    /// marked failed and the error is returned unchanged.
    pub async fn install_into<S: MetadataStore>(
        &self,
        layer: &mut DependencyLayer<S>,
        plan: &InstallPlan,
    ) -> ComposerResult<()> {
        layer.begin_install()?;

        match self.run(plan).await {
            Ok(()) => {
                layer.complete_install().await?;
                info!("Installed dependencies into {}", layer.root().display());
                Ok(())
            }
            Err(e) => {
                layer.fail_install();
                Err(e)
            }
        }
    }
}

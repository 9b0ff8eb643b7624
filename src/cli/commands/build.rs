//! Build command - install Composer dependencies into the packages layer

use crate::cli::args::BuildArgs;
use crate::config::{ConfigManager, BUILDPACK_YML};
use crate::error::ComposerResult;
use crate::install::{Composer, InstallPlan, Installer, ProcessRunner, COMPOSER_PHAR};
use crate::layer::{
    link_into_app, seed_from_app, CachePolicy, DependencyLayer, FileMetadataStore, Fingerprint, LayerDecision,
    LayerFlags, PACKAGES_LAYER,
};
use crate::manifest::{read_manifests, SearchPath, COMPOSER_JSON, COMPOSER_LOCK};
use crate::plan::COMPOSER_DEPENDENCY;
use crate::ui;
use std::path::PathBuf;
use tracing::debug;

const BUILDPACK_TITLE: &str = "PHP Composer Buildpack";
const LAYER_LABEL: &str = "PHP Composer Packages";

/// Execute the build command
pub async fn execute(args: BuildArgs) -> ComposerResult<()> {
    ui::header(BUILDPACK_TITLE, env!("CARGO_PKG_VERSION"));

    let config_manager = ConfigManager::for_app(&args.app);
    let config = config_manager.load().await?;
    let search = SearchPath::from_config(&config, args.composer_path.as_deref());
    let manifests = read_manifests(&args.app, &search).await?;

    let policy = CachePolicy::for_manifests(&manifests);
    let lock_path = manifests.lock_path();
    let fingerprint = Fingerprint::of_files(&[
        (COMPOSER_JSON, manifests.declarative.path()),
        (COMPOSER_LOCK, &lock_path),
        (BUILDPACK_YML, config_manager.path()),
    ])
    .await?;

    let store = FileMetadataStore::for_layer(&args.layers, PACKAGES_LAYER);
    let mut layer = DependencyLayer::new(args.layers.join(PACKAGES_LAYER), store.clone());
    let vendor_directory = config.composer.vendor_directory();
    let layer_vendor = layer.root().join(vendor_directory);
    let app_vendor = manifests.project_dir().join(vendor_directory);

    match layer.decide(&fingerprint, policy).await? {
        LayerDecision::Reuse => {
            ui::step_ok(&format!("{}: Reusing cached layer", LAYER_LABEL));
        }
        LayerDecision::Rebuild => {
            ui::step_info(&format!("{}: Contributing to layer", LAYER_LABEL));

            if seed_from_app(&app_vendor, &layer_vendor).await? {
                ui::step_info(&format!(
                    "Reusing vendored dependencies from {}",
                    app_vendor.display()
                ));
            }

            let phar = args.composer_phar.clone().unwrap_or_else(|| default_phar(&args.layers));
            let composer = Composer::new(
                args.php.clone(),
                phar,
                manifests.project_dir().to_path_buf(),
            )
            .with_env("COMPOSER_HOME", layer.global_dir().display().to_string())
            .with_env("COMPOSER_VENDOR_DIR", layer_vendor.display().to_string());

            let plan = InstallPlan::from_config(&config.composer, args.github_token.as_deref());
            let runner = ProcessRunner::new();
            Installer::new(&runner, composer)
                .install_into(&mut layer, &plan)
                .await?;

            ui::step_ok(&format!("{}: Installed", LAYER_LABEL));
        }
    }

    let flags = LayerFlags {
        launch: true,
        build: true,
        cache: policy.is_cached(),
    };
    if store.flags().await? != Some(flags) {
        store.set_flags(flags).await?;
    }

    if layer_vendor.is_dir() {
        if link_into_app(&layer_vendor, &app_vendor).await? {
            ui::key_value("vendor", &app_vendor.display().to_string());
        }
    } else {
        debug!("No {} in layer, nothing to link", layer_vendor.display());
    }

    Ok(())
}

/// Composer PHAR as provided by the Composer layer
fn default_phar(layers: &std::path::Path) -> PathBuf {
    layers.join(COMPOSER_DEPENDENCY).join(COMPOSER_PHAR)
}

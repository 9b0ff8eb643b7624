//! Detect command - decide whether the app uses Composer and write the plan

use crate::cli::args::DetectArgs;
use crate::config::{BuildpackConfig, ConfigManager};
use crate::error::ComposerResult;
use crate::manifest::{find_composer_json, read_manifests, SearchPath};
use crate::plan::{self, BuildPlan, PHP_DEPENDENCY};
use crate::ui;
use crate::version;
use std::process::ExitCode;
use tracing::{debug, info};

/// Exit code the lifecycle reads as "this buildpack does not apply"
pub const DETECT_FAIL_CODE: u8 = 100;

/// Result of a detection run that did not error
#[derive(Debug)]
pub enum DetectOutcome {
    /// Plan written
    Pass(BuildPlan),
    /// No composer.json on the search path; nothing written
    Fail(String),
}

impl DetectOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Pass(_) => ExitCode::SUCCESS,
            Self::Fail(_) => ExitCode::from(DETECT_FAIL_CODE),
        }
    }
}

/// Execute the detect command
pub async fn execute(args: DetectArgs) -> ComposerResult<DetectOutcome> {
    let config = match ConfigManager::for_app(&args.app).load().await {
        Ok(config) => config,
        Err(e) => {
            // No manifest on the default search path outranks a broken buildpack.yml
            let fallback =
                SearchPath::from_config(&BuildpackConfig::default(), args.composer_path.as_deref());
            if let Err(missing) = find_composer_json(&args.app, &fallback) {
                if missing.is_not_applicable() {
                    debug!("Detection failed: {}", missing);
                    return Ok(DetectOutcome::Fail(missing.to_string()));
                }
            }
            return Err(e);
        }
    };
    let search = SearchPath::from_config(&config, args.composer_path.as_deref());

    let manifests = match read_manifests(&args.app, &search).await {
        Ok(manifests) => manifests,
        Err(e) if e.is_not_applicable() => {
            debug!("Detection failed: {}", e);
            return Ok(DetectOutcome::Fail(e.to_string()));
        }
        Err(e) => return Err(e),
    };

    let resolution = version::resolve(manifests.locked.as_ref(), &manifests.declarative);
    for warning in &resolution.warnings {
        ui::step_warn(warning);
    }

    let plan = plan::contribute(&resolution.resolved, &config)?;
    plan.write(&args.plan).await?;

    info!("Wrote build plan to {}", args.plan.display());
    match resolution.resolved.source.label() {
        Some(source) => ui::step_ok(&format!(
            "{} {} (from {})",
            PHP_DEPENDENCY, resolution.resolved.version, source
        )),
        None => ui::step_ok(&format!("{} (version unspecified)", PHP_DEPENDENCY)),
    }

    Ok(DetectOutcome::Pass(plan))
}

//! composer-cnb - PHP Composer buildpack
//!
//! CLI entry point that dispatches to the detect and build phases.

use clap::Parser;
use composer_cnb::cli::{commands, Cli, Commands};
use composer_cnb::error::ComposerResult;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ or BP_DEBUG = debug
    let filter = match (cli.verbose, cli.debug) {
        (_, true) => EnvFilter::new("composer_cnb=debug"),
        (0, _) => EnvFilter::new("composer_cnb=warn"),
        (1, _) => EnvFilter::new("composer_cnb=info"),
        _ => EnvFilter::new("composer_cnb=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> ComposerResult<ExitCode> {
    match command {
        Commands::Detect(args) => {
            let outcome = commands::detect(args).await?;
            if let commands::DetectOutcome::Fail(reason) = &outcome {
                eprintln!("{}", style(reason).dim());
            }
            Ok(outcome.exit_code())
        }
        Commands::Build(args) => {
            commands::build(args).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

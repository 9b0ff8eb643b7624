//! CLI argument definitions using clap derive

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// PHP Composer buildpack
///
/// Detects PHP applications managed by Composer, contributes build plan
/// entries for PHP and Composer, and installs dependencies into a cached layer.
#[derive(Parser, Debug)]
#[command(name = "composer-cnb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Enable debug logging
    #[arg(
        long,
        global = true,
        env = "BP_DEBUG",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect a Composer application and write the build plan
    Detect(DetectArgs),

    /// Install Composer dependencies into the packages layer
    Build(BuildArgs),
}

/// Arguments for the detect command
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Application root
    #[arg(long, default_value = ".")]
    pub app: PathBuf,

    /// Build plan file to write
    #[arg(long)]
    pub plan: PathBuf,

    /// composer.json directory relative to the web directory
    #[arg(long, env = "COMPOSER_PATH")]
    pub composer_path: Option<String>,
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Application root
    #[arg(long, default_value = ".")]
    pub app: PathBuf,

    /// Layers directory
    #[arg(long)]
    pub layers: PathBuf,

    /// PHP interpreter used to run Composer
    #[arg(long, default_value = "php")]
    pub php: String,

    /// Composer PHAR (defaults to <layers>/php-composer/composer.phar)
    #[arg(long)]
    pub composer_phar: Option<PathBuf>,

    /// composer.json directory relative to the web directory
    #[arg(long, env = "COMPOSER_PATH")]
    pub composer_path: Option<String>,

    /// GitHub OAuth token, used when buildpack.yml sets none
    #[arg(long, env = "COMPOSER_GITHUB_OAUTH_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_detect() {
        let cli = Cli::parse_from([
            "composer-cnb",
            "detect",
            "--app",
            "/workspace",
            "--plan",
            "/tmp/plan.toml",
            "--composer-path",
            "app",
        ]);
        match cli.command {
            Commands::Detect(args) => {
                assert_eq!(args.app, PathBuf::from("/workspace"));
                assert_eq!(args.plan, PathBuf::from("/tmp/plan.toml"));
                assert_eq!(args.composer_path.as_deref(), Some("app"));
            }
            _ => panic!("expected Detect command"),
        }
    }

    #[test]
    fn cli_parses_build() {
        let cli = Cli::parse_from([
            "composer-cnb",
            "-vv",
            "--debug",
            "build",
            "--layers",
            "/layers",
            "--php",
            "/usr/bin/php",
        ]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.debug);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.app, PathBuf::from("."));
                assert_eq!(args.layers, PathBuf::from("/layers"));
                assert_eq!(args.php, "/usr/bin/php");
                assert!(args.composer_phar.is_none());
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn build_requires_layers() {
        assert!(Cli::try_parse_from(["composer-cnb", "build"]).is_err());
    }
}

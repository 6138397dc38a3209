use std::path::PathBuf;

use clap::Parser;
use emoji_mover_client::DEFAULT_API_BASE;
use emoji_mover_core::config::{DEFAULT_EXCLUSIONS_FILE, DEFAULT_SETTINGS_FILE};
use emoji_mover_core::{PacingConfig, ScanMode};

/// Default location of the append-only run log.
pub const DEFAULT_LOG_FILE: &str = "./emoji.log";

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "emoji-mover")]
#[command(
    author,
    version,
    about = "Copy custom emoji from one Slack workspace to another"
)]
#[command(after_help = "The settings file holds, one per line (# comments allowed):
  destination workspace URL, email, password, source API token

Examples:
  emoji-mover
  emoji-mover --dry-run
  emoji-mover --config ~/team/emoji_conf.txt --download-dir ~/team/emoji")]
pub struct Config {
    /// Settings file: workspace URL, email, password and API token
    #[arg(long, env = "EMOJI_MOVER_CONFIG", default_value = DEFAULT_SETTINGS_FILE)]
    pub config: PathBuf,

    /// File listing default emoji names that are never migrated
    #[arg(long, env = "EMOJI_MOVER_EXCLUSIONS", default_value = DEFAULT_EXCLUSIONS_FILE)]
    pub exclusions: PathBuf,

    /// Append-only log file
    #[arg(long, env = "EMOJI_MOVER_LOG", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Directory downloaded images are kept in (reused across runs)
    #[arg(long, default_value = ".")]
    pub download_dir: PathBuf,

    /// Emoji listing API endpoint of the source workspace
    #[arg(long, env = "EMOJI_MOVER_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Only treat table cells that are exactly `:name:` as existing emoji
    #[arg(long)]
    pub strict_names: bool,

    /// Stop after computing the work set, without downloading or uploading
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the pauses between downloads and uploads
    #[arg(long)]
    pub no_delay: bool,
}

impl Config {
    pub fn scan_mode(&self) -> ScanMode {
        if self.strict_names {
            ScanMode::Strict
        } else {
            ScanMode::Permissive
        }
    }

    pub fn pacing(&self) -> PacingConfig {
        if self.no_delay {
            PacingConfig::none()
        } else {
            PacingConfig::default()
        }
    }
}

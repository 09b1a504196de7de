//! nomad-release-sync - GitHub release mirror for NomadNet nodes
//!
//! Meant to run periodically (cron or a systemd timer); each run is
//! independent and idempotent.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use release_sync::config::SyncConfig;
use release_sync::github::GhCli;
use release_sync::logging::{init_logger, log_error};
use release_sync::paths::{Layout, DEFAULT_NOMADNET_PATH};
use release_sync::sync;

#[derive(Parser, Debug)]
#[command(
    name = "nomad-release-sync",
    version,
    about = "Sync GitHub releases into a NomadNet node's served files"
)]
struct Cli {
    /// Config file path (overrides NOMADNET_RELEASES_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logger(Some(&DEFAULT_NOMADNET_PATH.join("logs")));

    let config_path = SyncConfig::resolve_path(cli.config.as_deref());
    let config = match SyncConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            log_error(&e);
            return ExitCode::FAILURE;
        }
    };

    // Bundled pages and ASCII art live next to the config file.
    let asset_root = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let layout = Layout::default();
    match sync::run(&GhCli, &config, &layout, &asset_root) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log_error(&e);
            ExitCode::FAILURE
        }
    }
}

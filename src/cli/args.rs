//! Command line argument parsing.
//!
//! The pipeline is driven by prompts; flags only choose where configuration
//! comes from and how chatty the output is.

use clap::Parser;
use std::path::PathBuf;

/// Dotenv file read when `--env-file` is not given
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Export, package and upload a Godot project to Steam
#[derive(Parser, Debug)]
#[command(
    name = "godot_steam_release",
    version,
    about = "Export, package and upload a Godot project to Steam",
    long_about = "Bump the project version, export Windows/macOS/Linux builds headlessly,
zip each build, render steamcmd build scripts and upload the depots.

Configuration is read from the environment and from a .env file in the
current directory (GODOT_PATH, STEAMCMD_PATH, STEAM_USERNAME, PROJECT_PATH,
PROJECT_NAME, APPID and the *_DEPOT_ID variables are required)."
)]
pub struct Args {
    /// Dotenv file to load configuration from (must exist when given)
    #[arg(long, value_name = "PATH", env = "GODOT_STEAM_RELEASE_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Show detailed progress output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Env file to load and whether it has to exist
    pub fn env_file(&self) -> (PathBuf, bool) {
        match &self.env_file {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_ENV_FILE), false),
        }
    }
}

//! CLI argument parsing module for go-change-detector

use crate::config::DEFAULT_BASE_REVISION;
use crate::toolchain::DEFAULT_GO;
use crate::vcs::DEFAULT_GIT;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// List Go packages affected by changes since a base revision
#[derive(Parser, Debug, Clone)]
#[command(
    name = "go-change-detector",
    version,
    about = "List Go packages affected by changes since a base revision"
)]
pub struct CliArgs {
    /// Base revision to compare the working tree against
    #[arg(default_value = DEFAULT_BASE_REVISION)]
    pub base: String,

    /// Any directory inside the repository (default: current directory)
    #[arg(short = 'C', long, default_value = ".")]
    pub path: PathBuf,

    /// Go module directory to inspect (can be specified multiple times)
    #[arg(short, long = "module", action = ArgAction::Append)]
    pub modules: Vec<PathBuf>,

    // Output options
    /// Print package directories instead of import paths
    #[arg(long)]
    pub dirs: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - errors only
    #[arg(short, long)]
    pub quiet: bool,

    // Tool overrides
    /// git executable to use
    #[arg(long, value_name = "PATH", default_value = DEFAULT_GIT)]
    pub git: String,

    /// go executable to use
    #[arg(long, value_name = "PATH", default_value = DEFAULT_GO)]
    pub go: String,
}

impl CliArgs {
    /// Log filter directive implied by --verbose / --quiet
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "go_change_detector=debug"
        } else if self.quiet {
            "go_change_detector=error"
        } else {
            "go_change_detector=warn"
        }
    }
}

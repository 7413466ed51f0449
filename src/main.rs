//! go-change-detector - list Go packages affected by changes since a revision
//!
//! Prints one package per line (or a JSON document with `--json`) so the
//! output can drive selective builds and tests.

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use go_change_detector::cli::CliArgs;
use go_change_detector::config::DetectorConfig;
use go_change_detector::detect::detect_changed_packages;
use go_change_detector::output::{create_formatter, OutputConfig};
use go_change_detector::progress::Progress;
use go_change_detector::toolchain::GoList;
use go_change_detector::vcs::{GitCli, Vcs};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Set up logging; RUST_LOG takes precedence over the CLI flags
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<()> {
    let git = GitCli::discover(args.git.as_str(), &args.path)
        .await
        .with_context(|| format!("{} is not inside a git repository", args.path.display()))?;
    tracing::info!(root = %git.root().display(), base = %args.base, "starting detection");

    let config = DetectorConfig::new(git.root())?
        .with_base_revision(args.base.as_str())
        .with_module_paths(&args.modules)?;

    let mut progress = Progress::new(!args.quiet && !args.json);
    progress.spinner(&format!("Detecting packages changed since {}", args.base));
    let result = detect_changed_packages(
        &config,
        Arc::new(git),
        Arc::new(GoList::new(args.go.as_str())),
    )
    .await;
    progress.finish_and_clear();
    let detection = result?;

    let formatter = create_formatter(OutputConfig::from_cli(args.json, args.dirs));
    let mut stdout = io::stdout().lock();
    formatter.format(&detection, &mut stdout)?;
    stdout.flush()?;

    Ok(())
}

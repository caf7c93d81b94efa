use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod args;
mod batch;
mod config;
mod validator;

use args::Args;
use batch::Summary;
use config::{FileConfig, OutputMode, Settings};

/// Exit status for bad flags, unusable allow-lists or an unreadable directory
const USAGE_ERROR: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(summary) => summary.exit_code(),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(USAGE_ERROR)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(args: &Args) -> Result<Summary> {
    let file_config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(args, file_config)?;

    let files = batch::discover(&settings.directory)?;
    if files.is_empty() {
        warn!(directory = %settings.directory.display(), "no .svg files found");
    }

    if let OutputMode::Directory(dir) = &settings.output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }

    info!(
        files = files.len(),
        jobs = settings.jobs,
        validator = ?settings.validator.as_ref().map(validator::Validator::command_line),
        "purifying"
    );
    let reports = batch::run(&settings, &files)?;
    for report in &reports {
        println!("{report}");
    }

    let summary = Summary::from_reports(&reports);
    println!("{summary}");
    Ok(summary)
}

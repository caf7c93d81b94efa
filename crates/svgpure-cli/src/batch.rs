//! Directory batch processing
//!
//! Each document is read, purified, written and optionally validated on its
//! own; a failure in one never affects another.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use rayon::prelude::*;
use svgpure::Stats;
use tracing::{error, info, warn};

use crate::config::Settings;

/// What happened to one document
#[derive(Debug)]
pub enum Outcome {
    Sanitized { stats: Stats },
    /// Written, but the validator complained
    Warned { stats: Stats, warning: String },
    /// Nothing written
    Failed { error: String },
}

#[derive(Debug)]
pub struct Report {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub outcome: Outcome,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input = self.input.display();
        match (&self.outcome, &self.output) {
            (Outcome::Sanitized { stats }, Some(output)) => write!(
                f,
                "sanitized {input} -> {} ({})",
                output.display(),
                Removed(stats)
            ),
            (Outcome::Warned { stats, warning }, Some(output)) => write!(
                f,
                "warning   {input} -> {} ({}): {warning}",
                output.display(),
                Removed(stats)
            ),
            (Outcome::Failed { error }, _) => write!(f, "failed    {input}: {error}"),
            (_, None) => write!(f, "sanitized {input}"),
        }
    }
}

struct Removed<'a>(&'a Stats);

impl fmt::Display for Removed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "removed {} elements, {} attributes, {} other nodes",
            self.0.elements_removed, self.0.attributes_removed, self.0.other_nodes_removed
        )
    }
}

/// Counts across a batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub sanitized: usize,
    pub warned: usize,
    pub failed: usize,
    /// Removals across every written document
    pub removed: Stats,
}

impl Summary {
    /// Tally outcomes and removal counts
    pub fn from_reports(reports: &[Report]) -> Self {
        reports
            .iter()
            .fold(Self::default(), |mut summary, report| {
                match &report.outcome {
                    Outcome::Sanitized { stats } => {
                        summary.sanitized += 1;
                        summary.removed += *stats;
                    }
                    Outcome::Warned { stats, .. } => {
                        summary.warned += 1;
                        summary.removed += *stats;
                    }
                    Outcome::Failed { .. } => summary.failed += 1,
                }
                summary
            })
    }

    /// Warnings don't count as failure
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sanitized, {} with warnings, {} failed; {}",
            self.sanitized,
            self.warned,
            self.failed,
            Removed(&self.removed)
        )
    }
}

/// Regular files directly inside `dir` with an `.svg` extension, sorted by name.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() && is_svg(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// Process `files` in parallel, returning reports in input order
pub fn run(settings: &Settings, files: &[PathBuf]) -> Result<Vec<Report>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.jobs)
        .build()
        .context("failed to start worker threads")?;

    Ok(pool.install(|| {
        files
            .par_iter()
            .map(|path| process(settings, path))
            .collect()
    }))
}

/// Read, purify, write and validate one document
pub fn process(settings: &Settings, input: &Path) -> Report {
    match purify_to_disk(settings, input) {
        Ok((output, stats)) => {
            let outcome = match settings.validator.as_ref().map(|v| v.run(&output)) {
                Some(Err(err)) => {
                    warn!(file = %output.display(), "validator failed: {err:#}");
                    Outcome::Warned {
                        stats,
                        warning: format!("{err:#}"),
                    }
                }
                _ => {
                    info!(file = %input.display(), output = %output.display(), "sanitized");
                    Outcome::Sanitized { stats }
                }
            };
            Report {
                input: input.to_path_buf(),
                output: Some(output),
                outcome,
            }
        }
        Err(err) => {
            error!(file = %input.display(), "{err:#}");
            Report {
                input: input.to_path_buf(),
                output: None,
                outcome: Outcome::Failed {
                    error: format!("{err:#}"),
                },
            }
        }
    }
}

fn purify_to_disk(settings: &Settings, input: &Path) -> Result<(PathBuf, Stats)> {
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let purified = settings.purifier.purify(&bytes)?;

    let output = settings
        .output
        .target_for(input)
        .with_context(|| format!("no file name in {}", input.display()))?;
    fs::write(&output, purified.output.as_bytes())
        .with_context(|| format!("failed to write {}", output.display()))?;

    Ok((output, purified.stats))
}

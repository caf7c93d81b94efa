//! External validator/repair step run on every written file

use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Program plus fixed arguments; the file path is appended last.
/// Invoked directly, never through a shell.
#[derive(Clone, Debug)]
pub struct Validator {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl Validator {
    /// Create a validator without a timeout
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Kill the validator once `timeout` elapses
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Program followed by its fixed arguments
    pub fn command_line(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// Run against `file`. Any failure is returned as an error for the
    /// caller to record; the file itself is left as the validator left it.
    pub fn run(&self, file: &Path) -> Result<()> {
        let target = path_argument(file);
        debug!(
            program = %self.program,
            file = %target.display(),
            timeout = ?self.timeout(),
            "running validator"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(&target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("could not start validator `{}`", self.program))?;

        let stderr = child.stderr.take();
        let reader = thread::spawn(move || {
            let mut text = String::new();
            if let Some(mut stderr) = stderr {
                // a validator that writes garbage still gets reported by exit status
                let _ = stderr.read_to_string(&mut text);
            }
            text
        });

        let status = match self.timeout {
            Some(limit) => wait_with_timeout(&mut child, limit, &self.program)?,
            None => child
                .wait()
                .with_context(|| format!("failed waiting for `{}`", self.program))?,
        };
        let stderr = reader.join().unwrap_or_default();

        if !status.success() {
            let detail = stderr.trim();
            if detail.is_empty() {
                bail!("`{}` exited with {status}", self.program);
            }
            bail!("`{}` exited with {status}: {detail}", self.program);
        }
        Ok(())
    }
}

fn wait_with_timeout(child: &mut Child, limit: Duration, program: &str) -> Result<ExitStatus> {
    let started = Instant::now();
    loop {
        if let Some(status) = child
            .try_wait()
            .with_context(|| format!("failed waiting for `{program}`"))?
        {
            return Ok(status);
        }
        if started.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            bail!("`{program}` timed out after {}s", limit.as_secs_f32());
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Keep a relative path whose first component starts with `-` from being
/// read as an option by the validator.
fn path_argument(file: &Path) -> PathBuf {
    match file.components().next() {
        Some(Component::Normal(first)) if first.to_string_lossy().starts_with('-') => {
            Path::new(".").join(file)
        }
        _ => file.to_path_buf(),
    }
}

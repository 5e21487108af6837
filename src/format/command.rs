//! Formatter Invocation
//!
//! The formatter always receives an explicit argument vector, whether it was
//! configured by path or found on `PATH`. Nothing goes through a shell.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use super::error::FormatError;
use super::settings::SettingsSource;

/// Executable looked up on `PATH` when no path is configured
pub const DEFAULT_FORMATTER: &str = "verilog-format";

/// `-f <staged file> [-s <settings file>]`
pub fn build_args(staged: &Path, settings: Option<&SettingsSource>) -> Vec<OsString> {
    let mut args = vec![OsString::from("-f"), staged.as_os_str().to_owned()];
    if let Some(settings) = settings {
        args.push(OsString::from("-s"));
        args.push(settings.path().as_os_str().to_owned());
    }
    args
}

/// The configured executable, or `verilog-format` from `PATH`.
///
/// A configured path is taken as-is; if it is wrong the spawn fails and the
/// error is reported from there.
pub fn resolve_executable(configured: Option<&Path>) -> Result<PathBuf, FormatError> {
    match configured {
        Some(path) => Ok(path.to_path_buf()),
        None => locate(DEFAULT_FORMATTER),
    }
}

fn locate(name: &str) -> Result<PathBuf, FormatError> {
    which::which(name).map_err(|e| {
        FormatError::Invocation(format!(
            "{} not found on PATH ({}); set verilog-format.path",
            name, e
        ))
    })
}

/// A ready-to-run formatter process
#[derive(Debug, Clone)]
pub struct FormatterCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl FormatterCommand {
    pub fn new(program: PathBuf, args: Vec<OsString>) -> Self {
        Self { program, args }
    }

    /// Command line for log output only; it is never handed to a shell
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Run the formatter to completion.
    ///
    /// Succeeds only on exit status 0. Stdout is discarded; stderr is kept
    /// for the error message.
    pub async fn run(&self) -> Result<(), FormatError> {
        log::info!("Executing command: \"{}\"", self.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                FormatError::Invocation(format!(
                    "Failed to run {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let mut message = format!("Command failed: {} ({})", self.display(), output.status);
        if !stderr.is_empty() {
            message.push_str(": ");
            message.push_str(stderr);
        }
        Err(FormatError::Invocation(message))
    }
}

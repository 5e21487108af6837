//! Format Engine
//!
//! One request is one linear pipeline: stage the text, resolve settings, run
//! the formatter, read the staged file back. Nothing is shared between
//! requests.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempPath};
use tower_lsp::lsp_types::TextEdit;

use super::command::{FormatterCommand, build_args, resolve_executable};
use super::error::FormatError;
use super::settings::resolve_settings_file;
use crate::config::FormatterSettings;
use crate::core::whole_document_range;

const TEMP_PREFIX: &str = "verilog-format-";
const TEMP_SUFFIX: &str = ".v";

/// Runs verilog-format for a single request
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    settings: FormatterSettings,
    temp_dir: Option<PathBuf>,
}

impl Formatter {
    pub fn new(settings: FormatterSettings) -> Self {
        Self {
            settings,
            temp_dir: None,
        }
    }

    /// Stage files in `dir` instead of the system temp directory
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Format `text` and return the formatter's output verbatim.
    ///
    /// `document_path` is the source file on disk, used to find a local
    /// settings file. The staged copy is removed on success and kept for
    /// inspection when the formatter fails. Nothing is staged when the
    /// executable cannot be found.
    pub async fn format(
        &self,
        text: &str,
        document_path: Option<&Path>,
    ) -> Result<String, FormatError> {
        let program = resolve_executable(self.settings.path.as_deref())?;
        let staged = self.stage(text)?;

        let settings = resolve_settings_file(document_path, self.settings.settings.as_deref());
        let command = FormatterCommand::new(program, build_args(&staged, settings.as_ref()));

        if let Err(e) = command.run().await {
            keep_for_inspection(staged);
            return Err(e);
        }

        let bytes = tokio::fs::read(&staged).await.map_err(FormatError::Output)?;
        Ok(decode_output(bytes))
    }

    /// Format `text` into a single edit replacing the whole document
    pub async fn format_edits(
        &self,
        text: &str,
        document_path: Option<&Path>,
    ) -> Result<Vec<TextEdit>, FormatError> {
        let formatted = self.format(text, document_path).await?;
        Ok(vec![TextEdit {
            range: whole_document_range(text),
            new_text: formatted,
        }])
    }

    /// Write `text` to a fresh temp file and close it so the formatter can
    /// rewrite it in place.
    fn stage(&self, text: &str) -> Result<TempPath, FormatError> {
        let mut builder = Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX);

        let mut file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(FormatError::Staging)?;

        file.write_all(text.as_bytes())
            .and_then(|()| file.flush())
            .map_err(FormatError::Staging)?;

        let staged = file.into_temp_path();
        log::debug!("Staged document at {}", staged.display());
        Ok(staged)
    }
}

/// Formatter output as text; invalid UTF-8 is replaced rather than rejected
fn decode_output(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| {
        log::warn!("Formatter output is not valid UTF-8: {}", e.utf8_error());
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    })
}

fn keep_for_inspection(staged: TempPath) {
    match staged.keep() {
        Ok(path) => log::warn!("Formatter failed; staged input kept at {}", path.display()),
        Err(e) => log::warn!("Failed to keep staged input: {}", e),
    }
}

//! Formatting Through verilog-format
//!
//! Stages the document, picks a settings file, runs the external formatter
//! and turns its output into a whole-document edit.

pub mod command;
pub mod engine;
pub mod error;
pub mod settings;

pub use command::{DEFAULT_FORMATTER, FormatterCommand};
pub use engine::Formatter;
pub use error::FormatError;
pub use settings::{LOCAL_SETTINGS_FILE, SettingsSource, resolve_settings_file};

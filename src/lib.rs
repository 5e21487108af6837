//! Verilog Format Language Server
//!
//! A Language Server Protocol front end for the external `verilog-format`
//! tool.
//!
//! This library provides:
//! - Settings-file resolution (`.verilog-format.properties` or a global file)
//! - Staging, invocation and read-back of the external formatter
//! - LSP protocol implementation (`textDocument/formatting`)
//! - Configuration management

pub mod config;
pub mod core;
pub mod format;
pub mod lsp;

// Re-exports for clean public API
pub use config::{Config, FormatterSettings};
pub use format::{FormatError, Formatter, SettingsSource, resolve_settings_file};
